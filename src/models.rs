//! Structured output shapes returned by every tool.
//!
//! These are plain data carriers: the facade fills them in from upstream
//! entities (see [`crate::service::projection`]) and the server serializes
//! them as the tool's structured result.

use serde::{Deserialize, Serialize};

/// Value of the `status` field on every successful result.
pub const STATUS_SUCCESS: &str = "success";

pub(crate) fn status_success() -> String {
    STATUS_SUCCESS.to_string()
}

// Core entities

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_seconds: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub release_date: Option<String>,
    pub num_tracks: u32,
    pub duration_seconds: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub track_count: u32,
    pub creator: Option<String>,
    pub url: String,
}

// List responses

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackList {
    pub status: String,
    pub query: Option<String>,
    pub count: usize,
    pub tracks: Vec<Track>,
}

impl TrackList {
    pub fn new(query: Option<String>, tracks: Vec<Track>) -> Self {
        Self {
            status: status_success(),
            query,
            count: tracks.len(),
            tracks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumList {
    pub status: String,
    pub query: Option<String>,
    pub count: usize,
    pub albums: Vec<Album>,
}

impl AlbumList {
    pub fn new(query: Option<String>, albums: Vec<Album>) -> Self {
        Self {
            status: status_success(),
            query,
            count: albums.len(),
            albums,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistList {
    pub status: String,
    pub query: Option<String>,
    pub count: usize,
    pub artists: Vec<Artist>,
}

impl ArtistList {
    pub fn new(query: Option<String>, artists: Vec<Artist>) -> Self {
        Self {
            status: status_success(),
            query,
            count: artists.len(),
            artists,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistList {
    pub status: String,
    pub query: Option<String>,
    pub count: usize,
    pub playlists: Vec<Playlist>,
}

impl PlaylistList {
    pub fn new(query: Option<String>, playlists: Vec<Playlist>) -> Self {
        Self {
            status: status_success(),
            query,
            count: playlists.len(),
            playlists,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTracks {
    pub status: String,
    pub playlist_name: String,
    pub playlist_id: String,
    pub count: usize,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumTracks {
    pub status: String,
    pub album_title: String,
    pub album_id: String,
    pub artist: String,
    pub count: usize,
    pub tracks: Vec<Track>,
}

// Detail responses

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDetails {
    pub status: String,
    pub artist: Artist,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDetails {
    pub status: String,
    pub album: Album,
}

/// Recommendations seeded by a track or an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioTracks {
    pub status: String,
    pub seed_id: String,
    pub seed_type: String,
    pub seed_name: String,
    pub count: usize,
    pub tracks: Vec<Track>,
}

// Operation results

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub status: String,
    pub message: String,
    pub authenticated: bool,
}

impl AuthResult {
    pub fn authenticated(message: impl Into<String>) -> Self {
        Self {
            status: status_success(),
            message: message.into(),
            authenticated: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaylistResult {
    pub status: String,
    pub playlist: Option<Playlist>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTracksResult {
    pub status: String,
    pub playlist_id: String,
    pub playlist_name: String,
    pub tracks_added: usize,
    pub playlist_url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTracksResult {
    pub status: String,
    pub playlist_id: String,
    pub playlist_name: String,
    pub tracks_removed: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlaylistResult {
    pub status: String,
    pub playlist: Option<Playlist>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePlaylistResult {
    pub status: String,
    pub playlist_id: String,
    pub message: String,
}

/// Result of adding or removing a favorite; `item_type` is `track`, `album` or `artist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteResult {
    pub status: String,
    pub item_id: String,
    pub item_type: String,
    pub message: String,
}

impl FavoriteResult {
    pub fn new(item_id: &str, item_type: &str, message: String) -> Self {
        Self {
            status: status_success(),
            item_id: item_id.to_string(),
            item_type: item_type.to_string(),
            message,
        }
    }
}
