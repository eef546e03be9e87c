use super::{TidalService, projection};
use crate::{
    error::{EntityKind, ToolError},
    models::{
        AlbumDetails, AlbumList, AlbumTracks, ArtistDetails, ArtistList, RadioTracks, TrackList,
        status_success,
    },
    utils::{clamp_limit, parse_id},
};

pub const MAX_SIMILAR_LIMIT: u32 = 50;
pub const MAX_ARTIST_ALBUMS_LIMIT: u32 = 50;
pub const MAX_TOP_TRACKS_LIMIT: u32 = 50;
pub const MAX_RADIO_LIMIT: u32 = 100;

impl TidalService {
    pub async fn get_album(&self, album_id: &str) -> Result<AlbumDetails, ToolError> {
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Album, album_id)?;

        let album = Self::lookup(
            EntityKind::Album,
            album_id,
            "Failed to get album",
            self.api.album(&auth, id),
        )
        .await?;
        Ok(AlbumDetails {
            status: status_success(),
            album: projection::album(album, None),
        })
    }

    pub async fn get_album_tracks(&self, album_id: &str) -> Result<AlbumTracks, ToolError> {
        const CONTEXT: &str = "Failed to get album tracks";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Album, album_id)?;

        let album = Self::lookup(EntityKind::Album, album_id, CONTEXT, self.api.album(&auth, id))
            .await?;
        let tracks = Self::lookup(
            EntityKind::Album,
            album_id,
            CONTEXT,
            self.api.album_tracks(&auth, id),
        )
        .await?;

        let album = projection::album(album, None);
        // Album tracks carry the album they were listed under.
        let tracks: Vec<_> = projection::tracks(tracks, Some(&album.artist))
            .into_iter()
            .map(|mut t| {
                t.album = album.title.clone();
                t
            })
            .collect();

        Ok(AlbumTracks {
            status: status_success(),
            album_title: album.title,
            album_id: album_id.to_string(),
            artist: album.artist,
            count: tracks.len(),
            tracks,
        })
    }

    pub async fn get_similar_albums(
        &self,
        album_id: &str,
        limit: i64,
    ) -> Result<AlbumList, ToolError> {
        const CONTEXT: &str = "Failed to get similar albums";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Album, album_id)?;
        let limit = clamp_limit(limit, MAX_SIMILAR_LIMIT) as usize;

        Self::lookup(EntityKind::Album, album_id, CONTEXT, self.api.album(&auth, id)).await?;
        let mut similar = Self::lookup(
            EntityKind::Album,
            album_id,
            CONTEXT,
            self.api.similar_albums(&auth, id),
        )
        .await?;
        similar.truncate(limit);

        Ok(AlbumList::new(None, projection::albums(similar, None)))
    }

    pub async fn get_artist(&self, artist_id: &str) -> Result<ArtistDetails, ToolError> {
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Artist, artist_id)?;

        let artist = Self::lookup(
            EntityKind::Artist,
            artist_id,
            "Failed to get artist",
            self.api.artist(&auth, id),
        )
        .await?;

        // Not every artist has a biography.
        let bio = match self.api.artist_bio(&auth, id).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(artist_id = id, error = %e, "Artist biography unavailable");
                None
            }
        };

        Ok(ArtistDetails {
            status: status_success(),
            artist: projection::artist(artist),
            bio,
        })
    }

    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: i64,
    ) -> Result<AlbumList, ToolError> {
        const CONTEXT: &str = "Failed to get artist albums";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Artist, artist_id)?;
        let limit = clamp_limit(limit, MAX_ARTIST_ALBUMS_LIMIT);

        let artist =
            Self::lookup(EntityKind::Artist, artist_id, CONTEXT, self.api.artist(&auth, id))
                .await?;
        let albums = Self::lookup(
            EntityKind::Artist,
            artist_id,
            CONTEXT,
            self.api.artist_albums(&auth, id, limit),
        )
        .await?;

        Ok(AlbumList::new(
            None,
            projection::albums(albums, Some(&artist.name)),
        ))
    }

    pub async fn get_artist_top_tracks(
        &self,
        artist_id: &str,
        limit: i64,
    ) -> Result<TrackList, ToolError> {
        const CONTEXT: &str = "Failed to get artist top tracks";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Artist, artist_id)?;
        let limit = clamp_limit(limit, MAX_TOP_TRACKS_LIMIT);

        let artist =
            Self::lookup(EntityKind::Artist, artist_id, CONTEXT, self.api.artist(&auth, id))
                .await?;
        let tracks = Self::lookup(
            EntityKind::Artist,
            artist_id,
            CONTEXT,
            self.api.artist_top_tracks(&auth, id, limit),
        )
        .await?;

        Ok(TrackList::new(
            None,
            projection::tracks(tracks, Some(&artist.name)),
        ))
    }

    pub async fn get_similar_artists(
        &self,
        artist_id: &str,
        limit: i64,
    ) -> Result<ArtistList, ToolError> {
        const CONTEXT: &str = "Failed to get similar artists";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Artist, artist_id)?;
        let limit = clamp_limit(limit, MAX_SIMILAR_LIMIT) as usize;

        Self::lookup(EntityKind::Artist, artist_id, CONTEXT, self.api.artist(&auth, id)).await?;
        let mut similar = Self::lookup(
            EntityKind::Artist,
            artist_id,
            CONTEXT,
            self.api.similar_artists(&auth, id),
        )
        .await?;
        similar.truncate(limit);

        Ok(ArtistList::new(None, projection::artists(similar)))
    }

    pub async fn get_track_radio(
        &self,
        track_id: &str,
        limit: i64,
    ) -> Result<RadioTracks, ToolError> {
        const CONTEXT: &str = "Failed to get track radio";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Track, track_id)?;
        let limit = clamp_limit(limit, MAX_RADIO_LIMIT);

        let seed = Self::lookup(EntityKind::Track, track_id, CONTEXT, self.api.track(&auth, id))
            .await?;
        let radio = Self::lookup(
            EntityKind::Track,
            track_id,
            CONTEXT,
            self.api.track_radio(&auth, id, limit),
        )
        .await?;

        let seed = projection::track(seed, None);
        let tracks = projection::tracks(radio, None);
        Ok(RadioTracks {
            status: status_success(),
            seed_id: track_id.to_string(),
            seed_type: EntityKind::Track.as_str().to_string(),
            seed_name: format!("{} by {}", seed.title, seed.artist),
            count: tracks.len(),
            tracks,
        })
    }

    pub async fn get_artist_radio(
        &self,
        artist_id: &str,
        limit: i64,
    ) -> Result<RadioTracks, ToolError> {
        const CONTEXT: &str = "Failed to get artist radio";
        let auth = self.sessions.ensure().await?;
        let id = parse_id(EntityKind::Artist, artist_id)?;
        let limit = clamp_limit(limit, MAX_RADIO_LIMIT);

        let seed =
            Self::lookup(EntityKind::Artist, artist_id, CONTEXT, self.api.artist(&auth, id))
                .await?;
        let radio = Self::lookup(
            EntityKind::Artist,
            artist_id,
            CONTEXT,
            self.api.artist_radio(&auth, id, limit),
        )
        .await?;

        let tracks = projection::tracks(radio, None);
        Ok(RadioTracks {
            status: status_success(),
            seed_id: artist_id.to_string(),
            seed_type: EntityKind::Artist.as_str().to_string(),
            seed_name: seed.name,
            count: tracks.len(),
            tracks,
        })
    }
}
