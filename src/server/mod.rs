//! # MCP Server
//!
//! Exposes [`TidalService`] as Model Context Protocol tools over stdio.
//!
//! Every tool is a thin adapter: it unpacks its parameters, calls the facade
//! and hands the result to [`response::respond`], which turns successes into
//! structured content and [`crate::error::ToolError`]s into `isError`
//! results. stdout belongs to the transport, so logging goes to stderr.

mod params;
mod response;

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use self::{params::*, response::respond};
use crate::{
    Res,
    config::Config,
    management::{DeviceLink, LinkPresenter},
    service::TidalService,
    utils,
};

const INSTRUCTIONS: &str = "MCP server for the TIDAL music streaming service.

## Authentication
- Use the 'login' tool first to authenticate via the OAuth device flow
- The session is persisted and reused across restarts
- Alternatively run `tidal-mcp auth` in a terminal

## Search
- search_tracks, search_albums, search_artists, search_playlists

## Favorites
- get_favorite_tracks, get_favorite_albums, get_favorite_artists
- add_track_to_favorites, remove_track_from_favorites, remove_album_from_favorites

## Playlist Management
- get_user_playlists, get_playlist_tracks, create_playlist, add_tracks_to_playlist
- remove_tracks_from_playlist (by track_ids or by 0-based indices, not both)
- update_playlist, delete_playlist

## Albums and Artists
- get_album, get_album_tracks, get_similar_albums
- get_artist, get_artist_albums, get_artist_top_tracks, get_similar_artists

## Recommendations
- get_track_radio, get_artist_radio";

/// Publishes the verification link through the log and optionally a browser.
pub struct ServerLinkPresenter {
    open_browser: bool,
}

impl ServerLinkPresenter {
    pub fn new(open_browser: bool) -> Self {
        ServerLinkPresenter { open_browser }
    }
}

#[async_trait]
impl LinkPresenter for ServerLinkPresenter {
    async fn present(&self, link: &DeviceLink) {
        tracing::warn!(
            url = %link.url,
            expires_in = link.expires_in,
            "Open this URL to authenticate with TIDAL"
        );

        if !self.open_browser {
            return;
        }
        let url = link.url.clone();
        match utils::run_blocking(move || webbrowser::open(&url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Cannot open browser"),
            Err(e) => tracing::warn!(error = %e, "Browser launch task failed"),
        }
    }
}

#[derive(Clone)]
pub struct TidalMcpServer {
    service: Arc<TidalService>,
    presenter: Arc<dyn LinkPresenter>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TidalMcpServer {
    pub fn new(service: Arc<TidalService>, presenter: Arc<dyn LinkPresenter>) -> Self {
        Self {
            service,
            presenter,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Authenticate with TIDAL using the OAuth device flow. Opens the login page in a browser; the session is persisted for future use."
    )]
    async fn login(&self) -> Result<CallToolResult, McpError> {
        respond("login", self.service.login(self.presenter.as_ref()).await)
    }

    // Search

    #[tool(description = "Search for tracks on TIDAL by artist name, song title, or both.")]
    async fn search_tracks(
        &self,
        Parameters(p): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "search_tracks",
            self.service.search_tracks(&p.query, p.limit).await,
        )
    }

    #[tool(description = "Search for albums on TIDAL by album name, artist name, or both.")]
    async fn search_albums(
        &self,
        Parameters(p): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "search_albums",
            self.service.search_albums(&p.query, p.limit).await,
        )
    }

    #[tool(description = "Search for artists on TIDAL by name.")]
    async fn search_artists(
        &self,
        Parameters(p): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "search_artists",
            self.service.search_artists(&p.query, p.limit).await,
        )
    }

    #[tool(description = "Search for public playlists on TIDAL by name or theme.")]
    async fn search_playlists(
        &self,
        Parameters(p): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "search_playlists",
            self.service.search_playlists(&p.query, p.limit).await,
        )
    }

    // Favorites

    #[tool(description = "Get the user's favorite (liked) tracks.")]
    async fn get_favorite_tracks(
        &self,
        Parameters(p): Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_favorite_tracks",
            self.service.get_favorite_tracks(p.limit).await,
        )
    }

    #[tool(description = "Get the user's favorite (saved) albums.")]
    async fn get_favorite_albums(
        &self,
        Parameters(p): Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_favorite_albums",
            self.service.get_favorite_albums(p.limit).await,
        )
    }

    #[tool(description = "Get the user's favorite (followed) artists.")]
    async fn get_favorite_artists(
        &self,
        Parameters(p): Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_favorite_artists",
            self.service.get_favorite_artists(p.limit).await,
        )
    }

    #[tool(description = "Add a track to the user's favorites (like a track).")]
    async fn add_track_to_favorites(
        &self,
        Parameters(p): Parameters<TrackIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "add_track_to_favorites",
            self.service.add_track_to_favorites(&p.track_id).await,
        )
    }

    #[tool(description = "Remove a track from the user's favorites (unlike a track).")]
    async fn remove_track_from_favorites(
        &self,
        Parameters(p): Parameters<TrackIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "remove_track_from_favorites",
            self.service.remove_track_from_favorites(&p.track_id).await,
        )
    }

    #[tool(description = "Remove an album from the user's favorites.")]
    async fn remove_album_from_favorites(
        &self,
        Parameters(p): Parameters<AlbumIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "remove_album_from_favorites",
            self.service.remove_album_from_favorites(&p.album_id).await,
        )
    }

    // Playlists

    #[tool(description = "List the user's own playlists.")]
    async fn get_user_playlists(
        &self,
        Parameters(p): Parameters<CollectionParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_user_playlists",
            self.service.get_user_playlists(p.limit).await,
        )
    }

    #[tool(description = "Get the tracks of a playlist in playlist order.")]
    async fn get_playlist_tracks(
        &self,
        Parameters(p): Parameters<PlaylistTracksParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_playlist_tracks",
            self.service
                .get_playlist_tracks(&p.playlist_id, p.limit)
                .await,
        )
    }

    #[tool(description = "Create a new playlist in the user's account.")]
    async fn create_playlist(
        &self,
        Parameters(p): Parameters<CreatePlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "create_playlist",
            self.service.create_playlist(&p.name, &p.description).await,
        )
    }

    #[tool(description = "Append tracks to an existing playlist.")]
    async fn add_tracks_to_playlist(
        &self,
        Parameters(p): Parameters<AddTracksParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "add_tracks_to_playlist",
            self.service
                .add_tracks_to_playlist(&p.playlist_id, &p.track_ids)
                .await,
        )
    }

    #[tool(
        description = "Remove tracks from a playlist by track ID or by 0-based position. Provide either track_ids or indices, not both."
    )]
    async fn remove_tracks_from_playlist(
        &self,
        Parameters(p): Parameters<RemoveTracksParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "remove_tracks_from_playlist",
            self.service
                .remove_tracks_from_playlist(&p.playlist_id, p.track_ids, p.indices)
                .await,
        )
    }

    #[tool(description = "Update a playlist's name and/or description.")]
    async fn update_playlist(
        &self,
        Parameters(p): Parameters<UpdatePlaylistParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "update_playlist",
            self.service
                .update_playlist(&p.playlist_id, p.name, p.description)
                .await,
        )
    }

    #[tool(description = "Delete a playlist from the user's account.")]
    async fn delete_playlist(
        &self,
        Parameters(p): Parameters<PlaylistIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "delete_playlist",
            self.service.delete_playlist(&p.playlist_id).await,
        )
    }

    // Albums

    #[tool(description = "Get all tracks of an album together with the album's metadata.")]
    async fn get_album_tracks(
        &self,
        Parameters(p): Parameters<AlbumIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_album_tracks",
            self.service.get_album_tracks(&p.album_id).await,
        )
    }

    #[tool(description = "Get album details: title, artist, release date and track count.")]
    async fn get_album(
        &self,
        Parameters(p): Parameters<AlbumIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("get_album", self.service.get_album(&p.album_id).await)
    }

    #[tool(description = "Find albums similar to a given album.")]
    async fn get_similar_albums(
        &self,
        Parameters(p): Parameters<SimilarAlbumsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_similar_albums",
            self.service.get_similar_albums(&p.album_id, p.limit).await,
        )
    }

    // Artists

    #[tool(description = "Get artist details including the biography when available.")]
    async fn get_artist(
        &self,
        Parameters(p): Parameters<ArtistIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("get_artist", self.service.get_artist(&p.artist_id).await)
    }

    #[tool(description = "Get an artist's albums (discography).")]
    async fn get_artist_albums(
        &self,
        Parameters(p): Parameters<ArtistAlbumsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_artist_albums",
            self.service.get_artist_albums(&p.artist_id, p.limit).await,
        )
    }

    #[tool(description = "Get an artist's most popular tracks.")]
    async fn get_artist_top_tracks(
        &self,
        Parameters(p): Parameters<TopTracksParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_artist_top_tracks",
            self.service
                .get_artist_top_tracks(&p.artist_id, p.limit)
                .await,
        )
    }

    #[tool(description = "Find artists similar to a given artist.")]
    async fn get_similar_artists(
        &self,
        Parameters(p): Parameters<SimilarArtistsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_similar_artists",
            self.service.get_similar_artists(&p.artist_id, p.limit).await,
        )
    }

    // Recommendations

    #[tool(description = "Get TIDAL's track radio: tracks similar to a seed track.")]
    async fn get_track_radio(
        &self,
        Parameters(p): Parameters<TrackRadioParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_track_radio",
            self.service.get_track_radio(&p.track_id, p.limit).await,
        )
    }

    #[tool(description = "Get TIDAL's artist radio: tracks in the style of a seed artist.")]
    async fn get_artist_radio(
        &self,
        Parameters(p): Parameters<ArtistRadioParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_artist_radio",
            self.service.get_artist_radio(&p.artist_id, p.limit).await,
        )
    }
}

#[tool_handler]
impl ServerHandler for TidalMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Runs the MCP server on stdin/stdout until the client disconnects.
pub async fn serve_stdio(config: &Config) -> Res<()> {
    let service = Arc::new(TidalService::from_config(config)?);
    let presenter = Arc::new(ServerLinkPresenter::new(config.open_browser));
    let server = TidalMcpServer::new(service, presenter);

    let running = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!(
        session_file = %config.session_file.display(),
        "MCP server running on stdio"
    );
    let _quit_reason = running.waiting().await?;
    Ok(())
}
