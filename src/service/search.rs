use super::{TidalService, projection};
use crate::{
    error::ToolError,
    models::{AlbumList, ArtistList, PlaylistList, TrackList},
    types::{SearchKind, SearchResults},
    utils::clamp_limit,
};

pub const MAX_SEARCH_LIMIT: u32 = 50;

fn require_query(query: &str) -> Result<&str, ToolError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ToolError::bad_request("Search query must not be empty"));
    }
    Ok(query)
}

impl TidalService {
    async fn search(
        &self,
        query: &str,
        limit: i64,
        kind: SearchKind,
        context: &str,
    ) -> Result<(String, SearchResults), ToolError> {
        let auth = self.sessions.ensure().await?;
        let query = require_query(query)?;
        let limit = clamp_limit(limit, MAX_SEARCH_LIMIT);

        let results = Self::remote(context, self.api.search(&auth, query, kind, limit)).await?;
        Ok((query.to_string(), results))
    }

    pub async fn search_tracks(&self, query: &str, limit: i64) -> Result<TrackList, ToolError> {
        let (query, results) = self
            .search(query, limit, SearchKind::Tracks, "Track search failed")
            .await?;
        let tracks = results.tracks.map(|p| p.items).unwrap_or_default();
        Ok(TrackList::new(Some(query), projection::tracks(tracks, None)))
    }

    pub async fn search_albums(&self, query: &str, limit: i64) -> Result<AlbumList, ToolError> {
        let (query, results) = self
            .search(query, limit, SearchKind::Albums, "Album search failed")
            .await?;
        let albums = results.albums.map(|p| p.items).unwrap_or_default();
        Ok(AlbumList::new(Some(query), projection::albums(albums, None)))
    }

    pub async fn search_artists(&self, query: &str, limit: i64) -> Result<ArtistList, ToolError> {
        let (query, results) = self
            .search(query, limit, SearchKind::Artists, "Artist search failed")
            .await?;
        let artists = results.artists.map(|p| p.items).unwrap_or_default();
        Ok(ArtistList::new(Some(query), projection::artists(artists)))
    }

    pub async fn search_playlists(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<PlaylistList, ToolError> {
        let (query, results) = self
            .search(query, limit, SearchKind::Playlists, "Playlist search failed")
            .await?;
        let playlists = results.playlists.map(|p| p.items).unwrap_or_default();
        Ok(PlaylistList::new(
            Some(query),
            projection::playlists(playlists, true),
        ))
    }
}
