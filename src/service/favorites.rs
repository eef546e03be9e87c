use super::{TidalService, projection};
use crate::{
    error::{EntityKind, ToolError},
    models::{AlbumList, ArtistList, FavoriteResult, TrackList},
    utils::{clamp_limit, parse_id},
};

pub const MAX_FAVORITES_LIMIT: u32 = 100;

impl TidalService {
    pub async fn get_favorite_tracks(&self, limit: i64) -> Result<TrackList, ToolError> {
        let auth = self.sessions.ensure().await?;
        let limit = clamp_limit(limit, MAX_FAVORITES_LIMIT);

        let tracks = Self::remote(
            "Failed to get favorites",
            self.api.favorite_tracks(&auth, limit),
        )
        .await?;
        Ok(TrackList::new(None, projection::tracks(tracks, None)))
    }

    pub async fn get_favorite_albums(&self, limit: i64) -> Result<AlbumList, ToolError> {
        let auth = self.sessions.ensure().await?;
        let limit = clamp_limit(limit, MAX_FAVORITES_LIMIT);

        let albums = Self::remote(
            "Failed to get favorite albums",
            self.api.favorite_albums(&auth, limit),
        )
        .await?;
        Ok(AlbumList::new(None, projection::albums(albums, None)))
    }

    pub async fn get_favorite_artists(&self, limit: i64) -> Result<ArtistList, ToolError> {
        let auth = self.sessions.ensure().await?;
        let limit = clamp_limit(limit, MAX_FAVORITES_LIMIT);

        let artists = Self::remote(
            "Failed to get favorite artists",
            self.api.favorite_artists(&auth, limit),
        )
        .await?;
        Ok(ArtistList::new(None, projection::artists(artists)))
    }

    pub async fn add_track_to_favorites(&self, track_id: &str) -> Result<FavoriteResult, ToolError> {
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Track, track_id)?;

        Self::remote(
            "Failed to add track to favorites",
            self.api.add_favorite_track(&auth, id),
        )
        .await?;
        Ok(FavoriteResult::new(
            track_id,
            EntityKind::Track.as_str(),
            format!("Track {track_id} added to favorites"),
        ))
    }

    pub async fn remove_track_from_favorites(
        &self,
        track_id: &str,
    ) -> Result<FavoriteResult, ToolError> {
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Track, track_id)?;

        Self::remote(
            "Failed to remove track from favorites",
            self.api.remove_favorite_track(&auth, id),
        )
        .await?;
        Ok(FavoriteResult::new(
            track_id,
            EntityKind::Track.as_str(),
            format!("Track {track_id} removed from favorites"),
        ))
    }

    pub async fn remove_album_from_favorites(
        &self,
        album_id: &str,
    ) -> Result<FavoriteResult, ToolError> {
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Album, album_id)?;

        Self::remote(
            "Failed to remove album from favorites",
            self.api.remove_favorite_album(&auth, id),
        )
        .await?;
        Ok(FavoriteResult::new(
            album_id,
            EntityKind::Album.as_str(),
            format!("Album {album_id} removed from favorites"),
        ))
    }
}
