//! Tool parameter types.

use schemars::JsonSchema;
use serde::Deserialize;

fn default_search_limit() -> i64 {
    10
}

fn default_collection_limit() -> i64 {
    50
}

fn default_playlist_tracks_limit() -> i64 {
    100
}

fn default_similar_limit() -> i64 {
    10
}

fn default_artist_albums_limit() -> i64 {
    20
}

fn default_top_tracks_limit() -> i64 {
    10
}

fn default_radio_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search query, e.g. artist name, title or a combination.
    pub query: String,
    /// Maximum results (1-50, default: 10).
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

/// Paging for the user's favorites and playlists.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionParams {
    /// Maximum items to return (1-100, default: 50).
    #[serde(default = "default_collection_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrackIdParams {
    /// ID of the track.
    pub track_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AlbumIdParams {
    /// ID of the album.
    pub album_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ArtistIdParams {
    /// ID of the artist.
    pub artist_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlaylistIdParams {
    /// ID of the playlist.
    pub playlist_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlaylistTracksParams {
    /// ID of the playlist.
    pub playlist_id: String,
    /// Maximum tracks to return (1-1000, default: 100).
    #[serde(default = "default_playlist_tracks_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePlaylistParams {
    /// Name for the playlist.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTracksParams {
    /// ID of the playlist.
    pub playlist_id: String,
    /// Track IDs to append, in order.
    pub track_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveTracksParams {
    /// ID of the playlist.
    pub playlist_id: String,
    /// Track IDs to remove. Provide either this or `indices`, not both.
    #[serde(default)]
    pub track_ids: Option<Vec<String>>,
    /// 0-based positions to remove. Provide either this or `track_ids`, not both.
    #[serde(default)]
    pub indices: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdatePlaylistParams {
    /// ID of the playlist to update.
    pub playlist_id: String,
    /// New name for the playlist.
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimilarAlbumsParams {
    /// ID of the seed album.
    pub album_id: String,
    /// Maximum albums to return (1-50, default: 10).
    #[serde(default = "default_similar_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ArtistAlbumsParams {
    /// ID of the artist.
    pub artist_id: String,
    /// Maximum albums to return (1-50, default: 20).
    #[serde(default = "default_artist_albums_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopTracksParams {
    /// ID of the artist.
    pub artist_id: String,
    /// Maximum tracks to return (1-50, default: 10).
    #[serde(default = "default_top_tracks_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimilarArtistsParams {
    /// ID of the seed artist.
    pub artist_id: String,
    /// Maximum artists to return (1-50, default: 10).
    #[serde(default = "default_similar_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TrackRadioParams {
    /// ID of the seed track.
    pub track_id: String,
    /// Maximum tracks to return (1-100, default: 20).
    #[serde(default = "default_radio_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ArtistRadioParams {
    /// ID of the seed artist.
    pub artist_id: String,
    /// Maximum tracks to return (1-100, default: 20).
    #[serde(default = "default_radio_limit")]
    pub limit: i64,
}
