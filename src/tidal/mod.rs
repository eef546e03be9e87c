//! # TIDAL Integration Module
//!
//! This module is the integration layer between the server and TIDAL's v1
//! REST API. Everything above it talks to the [`TidalApi`] trait; the
//! concrete [`TidalClient`] implements it over `reqwest`.
//!
//! ## Architecture
//!
//! ```text
//! MCP tools (server)
//!          ↓
//! Authenticated facade (service) ── session lifecycle (management)
//!          ↓
//! TidalApi trait
//!     ├── Authentication (device flow, PKCE exchange, refresh, session check)
//!     ├── Catalog (search, tracks, albums, artists, radio)
//!     └── Library (favorites, playlists)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! TIDAL API
//! ```
//!
//! ## API Coverage
//!
//! ### Authentication
//! - `POST /oauth2/device_authorization` - Start the device flow
//! - `POST /oauth2/token` - Poll the device flow, exchange PKCE codes, refresh
//! - `GET /sessions` - Login check for the current token
//!
//! ### Catalog
//! - `GET /search` - Search by entity kind
//! - `GET /tracks/{id}`, `GET /tracks/{id}/radio`
//! - `GET /albums/{id}`, `GET /albums/{id}/tracks`, `GET /albums/{id}/similar`
//! - `GET /artists/{id}` plus `/albums`, `/toptracks`, `/similar`, `/radio`, `/bio`
//!
//! ### Library
//! - `GET|POST|DELETE /users/{user_id}/favorites/{tracks|albums|artists}`
//! - `GET|POST /users/{user_id}/playlists`
//! - `GET|POST|DELETE /playlists/{uuid}`, `/playlists/{uuid}/tracks`, `/playlists/{uuid}/items`
//!
//! Every catalog request carries the session's `countryCode`. Playlist
//! mutations send the playlist's current `ETag` in `If-None-Match`.
//!
//! ## Error Types
//!
//! All operations return [`ApiError`]; a `404` becomes [`ApiError::NotFound`]
//! so callers can tell an absent entity apart from any other failure.

mod auth;
mod client;

pub use auth::PKCE_REDIRECT_URI;
pub use client::TidalClient;

use async_trait::async_trait;

use crate::{
    error::ApiError,
    types::{
        Authorized, CredentialBundle, DeviceAuthorization, SearchKind, SearchResults,
        SessionInfo, TidalAlbum, TidalArtist, TidalPlaylist, TidalTrack, TokenResponse,
    },
};

/// The remote catalog and library service.
#[async_trait]
pub trait TidalApi: Send + Sync {
    /// Login check: succeeds only while the bundle is accepted by TIDAL.
    async fn check_session(&self, bundle: &CredentialBundle) -> Result<SessionInfo, ApiError>;

    async fn refresh(&self, bundle: &CredentialBundle) -> Result<TokenResponse, ApiError>;

    async fn device_authorization(&self) -> Result<DeviceAuthorization, ApiError>;

    /// Fails with [`ApiError::AuthorizationPending`] until the user completes the link.
    async fn poll_device_token(&self, device_code: &str) -> Result<TokenResponse, ApiError>;

    async fn search(
        &self,
        auth: &Authorized,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResults, ApiError>;

    async fn track(&self, auth: &Authorized, track_id: u64) -> Result<TidalTrack, ApiError>;

    async fn track_radio(
        &self,
        auth: &Authorized,
        track_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn album(&self, auth: &Authorized, album_id: u64) -> Result<TidalAlbum, ApiError>;

    async fn album_tracks(
        &self,
        auth: &Authorized,
        album_id: u64,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn similar_albums(
        &self,
        auth: &Authorized,
        album_id: u64,
    ) -> Result<Vec<TidalAlbum>, ApiError>;

    async fn artist(&self, auth: &Authorized, artist_id: u64) -> Result<TidalArtist, ApiError>;

    async fn artist_bio(&self, auth: &Authorized, artist_id: u64) -> Result<String, ApiError>;

    async fn artist_albums(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError>;

    async fn artist_top_tracks(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn similar_artists(
        &self,
        auth: &Authorized,
        artist_id: u64,
    ) -> Result<Vec<TidalArtist>, ApiError>;

    async fn artist_radio(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn favorite_tracks(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn favorite_albums(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError>;

    async fn favorite_artists(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalArtist>, ApiError>;

    async fn add_favorite_track(&self, auth: &Authorized, track_id: u64) -> Result<(), ApiError>;

    async fn remove_favorite_track(&self, auth: &Authorized, track_id: u64)
    -> Result<(), ApiError>;

    async fn remove_favorite_album(&self, auth: &Authorized, album_id: u64)
    -> Result<(), ApiError>;

    async fn user_playlists(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalPlaylist>, ApiError>;

    async fn playlist(&self, auth: &Authorized, playlist_id: &str)
    -> Result<TidalPlaylist, ApiError>;

    /// Tracks in playlist order, at most `limit` of them.
    async fn playlist_tracks(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError>;

    async fn create_playlist(
        &self,
        auth: &Authorized,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, ApiError>;

    /// Appends tracks in the given order.
    async fn add_playlist_tracks(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<(), ApiError>;

    /// Removes the items at the given 0-based positions.
    async fn remove_playlist_items(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        indices: &[usize],
    ) -> Result<(), ApiError>;

    async fn edit_playlist(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError>;

    async fn delete_playlist(&self, auth: &Authorized, playlist_id: &str) -> Result<(), ApiError>;
}
