use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;

use super::TidalApi;
use crate::{
    config::{Config, ConfigError},
    error::ApiError,
    types::{
        ArtistBio, Authorized, CredentialBundle, DeviceAuthorization, FavoriteItem, Page,
        SearchKind, SearchResults, SessionInfo, TidalAlbum, TidalArtist, TidalPlaylist,
        TidalTrack, TokenResponse,
    },
};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest page TIDAL serves for list endpoints.
const PAGE_SIZE: u32 = 100;

/// API client for TIDAL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct TidalClient {
    pub(super) http: Client,
    api_url: String,
    pub(super) auth_url: String,
    pub(super) login_url: String,
    pub(super) client_id: String,
    pub(super) client_secret: Option<String>,
    pub(super) pkce_client_id: Option<String>,
}

impl TidalClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            login_url: config.login_url.trim_end_matches('/').to_string(),
            client_id: config.client_id()?.to_string(),
            client_secret: config.client_secret.clone(),
            pkce_client_id: config.pkce_client_id.clone(),
        })
    }

    /// Builds `<api_url>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::Config(format!("TIDAL_API_URL is invalid: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config("TIDAL_API_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        auth: &Authorized,
        segments: &[&str],
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .http
            .request(method, self.endpoint(segments)?)
            .header(header::AUTHORIZATION, &auth.authorization)
            .query(&[("countryCode", auth.country_code.as_str())]))
    }

    pub(super) async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    pub(super) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        auth: &Authorized,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, auth, segments)?.query(params);
        Self::decode(Self::send(request).await?).await
    }

    /// Single page of a list endpoint.
    async fn list<T: DeserializeOwned>(
        &self,
        auth: &Authorized,
        segments: &[&str],
        limit: Option<u32>,
    ) -> Result<Vec<T>, ApiError> {
        let params: Vec<(&str, String)> = limit
            .map(|l| vec![("limit", l.to_string())])
            .unwrap_or_default();
        let page: Page<T> = self.get(auth, segments, &params).await?;
        Ok(page.items)
    }

    /// Walks a list endpoint page by page until `limit` items are collected
    /// or the listing is exhausted.
    async fn list_all<T: DeserializeOwned>(
        &self,
        auth: &Authorized,
        segments: &[&str],
        limit: u32,
    ) -> Result<Vec<T>, ApiError> {
        let mut items: Vec<T> = Vec::new();
        let mut offset: u32 = 0;

        while (items.len() as u32) < limit {
            let page_size = PAGE_SIZE.min(limit - items.len() as u32);
            let page: Page<T> = self
                .get(
                    auth,
                    segments,
                    &[
                        ("limit", page_size.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let received = page.items.len() as u32;
            items.extend(page.items);
            offset += received;

            let exhausted = page
                .total_number_of_items
                .is_some_and(|total| offset >= total);
            if received < page_size || exhausted {
                break;
            }
        }

        Ok(items)
    }

    async fn favorites<T: DeserializeOwned>(
        &self,
        auth: &Authorized,
        kind: &str,
        limit: u32,
    ) -> Result<Vec<T>, ApiError> {
        let user_id = auth.user_id.to_string();
        let items: Vec<FavoriteItem<T>> = self
            .list_all(auth, &["users", &user_id, "favorites", kind], limit)
            .await?;
        Ok(items.into_iter().map(|f| f.item).collect())
    }

    async fn playlist_etag(&self, auth: &Authorized, playlist_id: &str) -> Result<String, ApiError> {
        let request = self.request(Method::GET, auth, &["playlists", playlist_id])?;
        let response = Self::send(request).await?;

        response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("playlist response carries no ETag".to_string()))
    }

    /// Sends a playlist mutation guarded by the playlist's current ETag.
    async fn mutate_playlist(
        &self,
        method: Method,
        auth: &Authorized,
        segments: &[&str],
        playlist_id: &str,
        form: &[(&str, String)],
    ) -> Result<(), ApiError> {
        let etag = self.playlist_etag(auth, playlist_id).await?;
        let mut request = self
            .request(method, auth, segments)?
            .header(header::IF_NONE_MATCH, etag);
        if !form.is_empty() {
            request = request.form(form);
        }

        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TidalApi for TidalClient {
    async fn check_session(&self, bundle: &CredentialBundle) -> Result<SessionInfo, ApiError> {
        let request = self
            .http
            .get(self.endpoint(&["sessions"])?)
            .header(header::AUTHORIZATION, bundle.authorization());
        Self::decode(Self::send(request).await?).await
    }

    async fn refresh(&self, bundle: &CredentialBundle) -> Result<TokenResponse, ApiError> {
        self.refresh_token(bundle).await
    }

    async fn device_authorization(&self) -> Result<DeviceAuthorization, ApiError> {
        self.start_device_authorization().await
    }

    async fn poll_device_token(&self, device_code: &str) -> Result<TokenResponse, ApiError> {
        self.device_token(device_code).await
    }

    async fn search(
        &self,
        auth: &Authorized,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResults, ApiError> {
        self.get(
            auth,
            &["search"],
            &[
                ("query", query.to_string()),
                ("limit", limit.to_string()),
                ("offset", "0".to_string()),
                ("types", kind.as_param().to_string()),
            ],
        )
        .await
    }

    async fn track(&self, auth: &Authorized, track_id: u64) -> Result<TidalTrack, ApiError> {
        self.get(auth, &["tracks", &track_id.to_string()], &[]).await
    }

    async fn track_radio(
        &self,
        auth: &Authorized,
        track_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.list(auth, &["tracks", &track_id.to_string(), "radio"], Some(limit))
            .await
    }

    async fn album(&self, auth: &Authorized, album_id: u64) -> Result<TidalAlbum, ApiError> {
        self.get(auth, &["albums", &album_id.to_string()], &[]).await
    }

    async fn album_tracks(
        &self,
        auth: &Authorized,
        album_id: u64,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.list_all(auth, &["albums", &album_id.to_string(), "tracks"], 10 * PAGE_SIZE)
            .await
    }

    async fn similar_albums(
        &self,
        auth: &Authorized,
        album_id: u64,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.list(auth, &["albums", &album_id.to_string(), "similar"], None)
            .await
    }

    async fn artist(&self, auth: &Authorized, artist_id: u64) -> Result<TidalArtist, ApiError> {
        self.get(auth, &["artists", &artist_id.to_string()], &[]).await
    }

    async fn artist_bio(&self, auth: &Authorized, artist_id: u64) -> Result<String, ApiError> {
        let bio: ArtistBio = self
            .get(auth, &["artists", &artist_id.to_string(), "bio"], &[])
            .await?;
        bio.text
            .ok_or_else(|| ApiError::Decode("artist bio carries no text".to_string()))
    }

    async fn artist_albums(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.list(auth, &["artists", &artist_id.to_string(), "albums"], Some(limit))
            .await
    }

    async fn artist_top_tracks(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.list(
            auth,
            &["artists", &artist_id.to_string(), "toptracks"],
            Some(limit),
        )
        .await
    }

    async fn similar_artists(
        &self,
        auth: &Authorized,
        artist_id: u64,
    ) -> Result<Vec<TidalArtist>, ApiError> {
        self.list(auth, &["artists", &artist_id.to_string(), "similar"], None)
            .await
    }

    async fn artist_radio(
        &self,
        auth: &Authorized,
        artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.list(auth, &["artists", &artist_id.to_string(), "radio"], Some(limit))
            .await
    }

    async fn favorite_tracks(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.favorites(auth, "tracks", limit).await
    }

    async fn favorite_albums(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.favorites(auth, "albums", limit).await
    }

    async fn favorite_artists(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalArtist>, ApiError> {
        self.favorites(auth, "artists", limit).await
    }

    async fn add_favorite_track(&self, auth: &Authorized, track_id: u64) -> Result<(), ApiError> {
        let user_id = auth.user_id.to_string();
        let request = self
            .request(Method::POST, auth, &["users", &user_id, "favorites", "tracks"])?
            .form(&[("trackIds", track_id.to_string())]);
        Self::send(request).await?;
        Ok(())
    }

    async fn remove_favorite_track(
        &self,
        auth: &Authorized,
        track_id: u64,
    ) -> Result<(), ApiError> {
        let user_id = auth.user_id.to_string();
        let request = self.request(
            Method::DELETE,
            auth,
            &["users", &user_id, "favorites", "tracks", &track_id.to_string()],
        )?;
        Self::send(request).await?;
        Ok(())
    }

    async fn remove_favorite_album(
        &self,
        auth: &Authorized,
        album_id: u64,
    ) -> Result<(), ApiError> {
        let user_id = auth.user_id.to_string();
        let request = self.request(
            Method::DELETE,
            auth,
            &["users", &user_id, "favorites", "albums", &album_id.to_string()],
        )?;
        Self::send(request).await?;
        Ok(())
    }

    async fn user_playlists(
        &self,
        auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalPlaylist>, ApiError> {
        let user_id = auth.user_id.to_string();
        self.list_all(auth, &["users", &user_id, "playlists"], limit)
            .await
    }

    async fn playlist(
        &self,
        auth: &Authorized,
        playlist_id: &str,
    ) -> Result<TidalPlaylist, ApiError> {
        self.get(auth, &["playlists", playlist_id], &[]).await
    }

    async fn playlist_tracks(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.list_all(auth, &["playlists", playlist_id, "tracks"], limit)
            .await
    }

    async fn create_playlist(
        &self,
        auth: &Authorized,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, ApiError> {
        let user_id = auth.user_id.to_string();
        let request = self
            .request(Method::POST, auth, &["users", &user_id, "playlists"])?
            .form(&[("title", title), ("description", description)]);
        Self::decode(Self::send(request).await?).await
    }

    async fn add_playlist_tracks(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<(), ApiError> {
        let ids = track_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        self.mutate_playlist(
            Method::POST,
            auth,
            &["playlists", playlist_id, "items"],
            playlist_id,
            &[
                ("trackIds", ids),
                ("onArtifactNotFound", "FAIL".to_string()),
                ("onDupes", "ADD".to_string()),
            ],
        )
        .await
    }

    async fn remove_playlist_items(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        indices: &[usize],
    ) -> Result<(), ApiError> {
        let positions = indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");

        self.mutate_playlist(
            Method::DELETE,
            auth,
            &["playlists", playlist_id, "items", &positions],
            playlist_id,
            &[],
        )
        .await
    }

    async fn edit_playlist(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.mutate_playlist(
            Method::POST,
            auth,
            &["playlists", playlist_id],
            playlist_id,
            &[
                ("title", title.to_string()),
                ("description", description.to_string()),
            ],
        )
        .await
    }

    async fn delete_playlist(&self, auth: &Authorized, playlist_id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, auth, &["playlists", playlist_id])?;
        Self::send(request).await?;
        Ok(())
    }
}
