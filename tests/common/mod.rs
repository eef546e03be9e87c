#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tempfile::TempDir;
use tidal_mcp::{
    error::ApiError,
    management::{DeviceLink, LinkPresenter, SessionManager, SessionStore},
    service::TidalService,
    tidal::TidalApi,
    types::{
        AlbumRef, ArtistRef, Authorized, CredentialBundle, DeviceAuthorization, Page,
        SearchKind, SearchResults, SessionInfo, TidalAlbum, TidalArtist, TidalPlaylist,
        TidalTrack, TokenResponse,
    },
};

pub const VALID_TOKEN: &str = "valid-access-token";
pub const DEVICE_TOKEN: &str = "device-access-token";
pub const USER_ID: u64 = 4242;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOutcome {
    Grant,
    Expire,
}

#[derive(Default)]
struct State {
    valid_tokens: HashSet<String>,
    refresh_grant: Option<String>,
    device_outcome: Option<DeviceOutcome>,
    device_authorizations: usize,
    calls: Vec<String>,
    limits: Vec<(String, u32)>,
    tracks: HashMap<u64, TidalTrack>,
    albums: HashMap<u64, TidalAlbum>,
    album_tracks: HashMap<u64, Vec<u64>>,
    artists: HashMap<u64, TidalArtist>,
    bios: HashMap<u64, String>,
    playlists: Vec<TidalPlaylist>,
    playlist_items: HashMap<String, Vec<u64>>,
    favorite_tracks: Vec<u64>,
    next_playlist: u32,
}

/// In-memory stand-in for the TIDAL API that records every call it receives.
#[derive(Default)]
pub struct FakeTidal {
    state: Mutex<State>,
}

impl FakeTidal {
    pub fn new() -> Self {
        let fake = FakeTidal::default();
        fake.accept_token(VALID_TOKEN);
        fake
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn record(&self, call: &str) {
        self.with(|s| s.calls.push(call.to_string()));
    }

    fn record_limit(&self, call: &str, limit: u32) {
        self.with(|s| {
            s.calls.push(call.to_string());
            s.limits.push((call.to_string(), limit));
        });
    }

    pub fn accept_token(&self, token: &str) {
        self.with(|s| s.valid_tokens.insert(token.to_string()));
    }

    pub fn revoke_token(&self, token: &str) {
        self.with(|s| s.valid_tokens.remove(token));
    }

    pub fn grant_refresh(&self, new_token: &str) {
        self.with(|s| s.refresh_grant = Some(new_token.to_string()));
    }

    pub fn set_device_outcome(&self, outcome: DeviceOutcome) {
        self.with(|s| s.device_outcome = Some(outcome));
    }

    pub fn device_authorizations(&self) -> usize {
        self.with(|s| s.device_authorizations)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    /// Calls other than session checks, i.e. actual catalog or library access.
    pub fn data_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c != "check_session")
            .collect()
    }

    pub fn limit_for(&self, call: &str) -> Option<u32> {
        self.with(|s| {
            s.limits
                .iter()
                .rev()
                .find(|(c, _)| c == call)
                .map(|(_, l)| *l)
        })
    }

    pub fn add_track(&self, track: TidalTrack) {
        self.with(|s| s.tracks.insert(track.id, track));
    }

    pub fn add_album(&self, album: TidalAlbum, track_ids: Vec<u64>) {
        self.with(|s| {
            s.album_tracks.insert(album.id, track_ids);
            s.albums.insert(album.id, album);
        });
    }

    pub fn add_artist(&self, artist: TidalArtist, bio: Option<&str>) {
        self.with(|s| {
            if let Some(bio) = bio {
                s.bios.insert(artist.id, bio.to_string());
            }
            s.artists.insert(artist.id, artist);
        });
    }

    pub fn playlist_items(&self, playlist_id: &str) -> Vec<u64> {
        self.with(|s| {
            s.playlist_items
                .get(playlist_id)
                .cloned()
                .unwrap_or_default()
        })
    }

    fn track_or_stub(state: &State, id: u64) -> TidalTrack {
        state.tracks.get(&id).cloned().unwrap_or_else(|| TidalTrack {
            id,
            title: format!("Track {id}"),
            ..Default::default()
        })
    }

    fn catalog_tracks(&self, limit: u32) -> Vec<TidalTrack> {
        self.with(|s| {
            let mut tracks: Vec<_> = s.tracks.values().cloned().collect();
            tracks.sort_by_key(|t| t.id);
            tracks.truncate(limit as usize);
            tracks
        })
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::NotFound(format!("{what} not found"))
    }
}

pub fn track(id: u64, title: &str, artist: Option<&str>, album: Option<&str>) -> TidalTrack {
    TidalTrack {
        id,
        title: title.to_string(),
        duration: Some(180),
        artist: artist.map(|name| ArtistRef {
            id: Some(1),
            name: Some(name.to_string()),
        }),
        artists: Vec::new(),
        album: album.map(|title| AlbumRef {
            id: Some(1),
            title: Some(title.to_string()),
        }),
    }
}

pub fn album(id: u64, title: &str, artist: Option<&str>) -> TidalAlbum {
    TidalAlbum {
        id,
        title: title.to_string(),
        artist: artist.map(|name| ArtistRef {
            id: Some(1),
            name: Some(name.to_string()),
        }),
        release_date: Some("2021-05-07".to_string()),
        number_of_tracks: Some(2),
        duration: Some(360),
        ..Default::default()
    }
}

pub fn artist(id: u64, name: &str) -> TidalArtist {
    TidalArtist {
        id,
        name: name.to_string(),
    }
}

#[async_trait]
impl TidalApi for FakeTidal {
    async fn check_session(&self, bundle: &CredentialBundle) -> Result<SessionInfo, ApiError> {
        self.record("check_session");
        let valid = self.with(|s| s.valid_tokens.contains(&bundle.access_token));
        if !valid {
            return Err(ApiError::Unauthorized);
        }
        Ok(SessionInfo {
            session_id: Some("session-1".to_string()),
            user_id: USER_ID,
            country_code: "US".to_string(),
        })
    }

    async fn refresh(&self, _bundle: &CredentialBundle) -> Result<TokenResponse, ApiError> {
        self.record("refresh");
        let grant = self.with(|s| s.refresh_grant.clone());
        let token = grant.ok_or(ApiError::Unauthorized)?;
        self.accept_token(&token);
        Ok(TokenResponse {
            access_token: token,
            token_type: Some("Bearer".to_string()),
            ..Default::default()
        })
    }

    async fn device_authorization(&self) -> Result<DeviceAuthorization, ApiError> {
        self.record("device_authorization");
        self.with(|s| s.device_authorizations += 1);
        Ok(DeviceAuthorization {
            device_code: "device-code".to_string(),
            user_code: "ABCDE".to_string(),
            verification_uri: "link.tidal.com".to_string(),
            verification_uri_complete: Some("link.tidal.com/ABCDE".to_string()),
            expires_in: 300,
            interval: 0,
        })
    }

    async fn poll_device_token(&self, _device_code: &str) -> Result<TokenResponse, ApiError> {
        self.record("poll_device_token");
        match self.with(|s| s.device_outcome) {
            Some(DeviceOutcome::Grant) => {
                self.accept_token(DEVICE_TOKEN);
                Ok(TokenResponse {
                    access_token: DEVICE_TOKEN.to_string(),
                    refresh_token: Some("device-refresh-token".to_string()),
                    token_type: Some("Bearer".to_string()),
                    expires_in: Some(3600),
                    user_id: Some(USER_ID),
                })
            }
            Some(DeviceOutcome::Expire) => Err(ApiError::ExpiredLink),
            None => Err(ApiError::AuthorizationPending),
        }
    }

    async fn search(
        &self,
        _auth: &Authorized,
        _query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<SearchResults, ApiError> {
        self.record_limit("search", limit);
        let mut results = SearchResults::default();
        match kind {
            SearchKind::Tracks => {
                results.tracks = Some(Page {
                    items: self.catalog_tracks(limit),
                    total_number_of_items: None,
                })
            }
            SearchKind::Albums => {
                let albums = self.with(|s| s.albums.values().cloned().collect());
                results.albums = Some(Page {
                    items: albums,
                    total_number_of_items: None,
                })
            }
            SearchKind::Artists => {
                let artists = self.with(|s| s.artists.values().cloned().collect());
                results.artists = Some(Page {
                    items: artists,
                    total_number_of_items: None,
                })
            }
            SearchKind::Playlists => {
                let playlists = self.with(|s| s.playlists.clone());
                results.playlists = Some(Page {
                    items: playlists,
                    total_number_of_items: None,
                })
            }
        }
        Ok(results)
    }

    async fn track(&self, _auth: &Authorized, track_id: u64) -> Result<TidalTrack, ApiError> {
        self.record("track");
        self.with(|s| s.tracks.get(&track_id).cloned())
            .ok_or_else(|| Self::not_found("track"))
    }

    async fn track_radio(
        &self,
        _auth: &Authorized,
        _track_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record_limit("track_radio", limit);
        Ok(self.catalog_tracks(limit))
    }

    async fn album(&self, _auth: &Authorized, album_id: u64) -> Result<TidalAlbum, ApiError> {
        self.record("album");
        self.with(|s| s.albums.get(&album_id).cloned())
            .ok_or_else(|| Self::not_found("album"))
    }

    async fn album_tracks(
        &self,
        _auth: &Authorized,
        album_id: u64,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record("album_tracks");
        self.with(|s| {
            s.album_tracks.get(&album_id).map(|ids| {
                ids.iter()
                    .map(|id| Self::track_or_stub(s, *id))
                    .collect::<Vec<_>>()
            })
        })
        .ok_or_else(|| Self::not_found("album"))
    }

    async fn similar_albums(
        &self,
        _auth: &Authorized,
        _album_id: u64,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.record("similar_albums");
        Ok((0..80).map(|i| album(9000 + i, "Similar", None)).collect())
    }

    async fn artist(&self, _auth: &Authorized, artist_id: u64) -> Result<TidalArtist, ApiError> {
        self.record("artist");
        self.with(|s| s.artists.get(&artist_id).cloned())
            .ok_or_else(|| Self::not_found("artist"))
    }

    async fn artist_bio(&self, _auth: &Authorized, artist_id: u64) -> Result<String, ApiError> {
        self.record("artist_bio");
        self.with(|s| s.bios.get(&artist_id).cloned())
            .ok_or_else(|| Self::not_found("bio"))
    }

    async fn artist_albums(
        &self,
        _auth: &Authorized,
        _artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.record_limit("artist_albums", limit);
        Ok(vec![album(7001, "Debut", None)])
    }

    async fn artist_top_tracks(
        &self,
        _auth: &Authorized,
        _artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record_limit("artist_top_tracks", limit);
        Ok(vec![track(7101, "Hit", None, None)])
    }

    async fn similar_artists(
        &self,
        _auth: &Authorized,
        _artist_id: u64,
    ) -> Result<Vec<TidalArtist>, ApiError> {
        self.record("similar_artists");
        Ok((0..5).map(|i| artist(8000 + i, "Similar Artist")).collect())
    }

    async fn artist_radio(
        &self,
        _auth: &Authorized,
        _artist_id: u64,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record_limit("artist_radio", limit);
        Ok(self.catalog_tracks(limit))
    }

    async fn favorite_tracks(
        &self,
        _auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record_limit("favorite_tracks", limit);
        Ok(self.with(|s| {
            s.favorite_tracks
                .iter()
                .take(limit as usize)
                .map(|id| Self::track_or_stub(s, *id))
                .collect()
        }))
    }

    async fn favorite_albums(
        &self,
        _auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalAlbum>, ApiError> {
        self.record_limit("favorite_albums", limit);
        Ok(Vec::new())
    }

    async fn favorite_artists(
        &self,
        _auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalArtist>, ApiError> {
        self.record_limit("favorite_artists", limit);
        Ok(Vec::new())
    }

    async fn add_favorite_track(&self, _auth: &Authorized, track_id: u64) -> Result<(), ApiError> {
        self.record("add_favorite_track");
        self.with(|s| s.favorite_tracks.push(track_id));
        Ok(())
    }

    async fn remove_favorite_track(
        &self,
        _auth: &Authorized,
        track_id: u64,
    ) -> Result<(), ApiError> {
        self.record("remove_favorite_track");
        self.with(|s| s.favorite_tracks.retain(|id| *id != track_id));
        Ok(())
    }

    async fn remove_favorite_album(
        &self,
        _auth: &Authorized,
        _album_id: u64,
    ) -> Result<(), ApiError> {
        self.record("remove_favorite_album");
        Ok(())
    }

    async fn user_playlists(
        &self,
        _auth: &Authorized,
        limit: u32,
    ) -> Result<Vec<TidalPlaylist>, ApiError> {
        self.record_limit("user_playlists", limit);
        Ok(self.with(|s| s.playlists.iter().take(limit as usize).cloned().collect()))
    }

    async fn playlist(
        &self,
        _auth: &Authorized,
        playlist_id: &str,
    ) -> Result<TidalPlaylist, ApiError> {
        self.record("playlist");
        self.with(|s| s.playlists.iter().find(|p| p.uuid == playlist_id).cloned())
            .ok_or_else(|| Self::not_found("playlist"))
    }

    async fn playlist_tracks(
        &self,
        _auth: &Authorized,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, ApiError> {
        self.record_limit("playlist_tracks", limit);
        self.with(|s| {
            s.playlist_items.get(playlist_id).map(|ids| {
                ids.iter()
                    .take(limit as usize)
                    .map(|id| Self::track_or_stub(s, *id))
                    .collect::<Vec<_>>()
            })
        })
        .ok_or_else(|| Self::not_found("playlist"))
    }

    async fn create_playlist(
        &self,
        _auth: &Authorized,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, ApiError> {
        self.record("create_playlist");
        Ok(self.with(|s| {
            s.next_playlist += 1;
            let playlist = TidalPlaylist {
                uuid: format!("playlist-{}", s.next_playlist),
                title: title.to_string(),
                description: Some(description.to_string()),
                number_of_tracks: Some(0),
                creator: None,
            };
            s.playlist_items.insert(playlist.uuid.clone(), Vec::new());
            s.playlists.push(playlist.clone());
            playlist
        }))
    }

    async fn add_playlist_tracks(
        &self,
        _auth: &Authorized,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<(), ApiError> {
        self.record("add_playlist_tracks");
        self.with(|s| {
            let items = s.playlist_items.entry(playlist_id.to_string()).or_default();
            items.extend_from_slice(track_ids);
            let count = items.len() as u32;
            if let Some(p) = s.playlists.iter_mut().find(|p| p.uuid == playlist_id) {
                p.number_of_tracks = Some(count);
            }
        });
        Ok(())
    }

    async fn remove_playlist_items(
        &self,
        _auth: &Authorized,
        playlist_id: &str,
        indices: &[usize],
    ) -> Result<(), ApiError> {
        self.record("remove_playlist_items");
        self.with(|s| {
            if let Some(items) = s.playlist_items.get_mut(playlist_id) {
                let mut sorted = indices.to_vec();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                for index in sorted {
                    if index < items.len() {
                        items.remove(index);
                    }
                }
            }
        });
        Ok(())
    }

    async fn edit_playlist(
        &self,
        _auth: &Authorized,
        playlist_id: &str,
        title: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.record("edit_playlist");
        self.with(|s| {
            if let Some(p) = s.playlists.iter_mut().find(|p| p.uuid == playlist_id) {
                p.title = title.to_string();
                p.description = Some(description.to_string());
            }
        });
        Ok(())
    }

    async fn delete_playlist(&self, _auth: &Authorized, playlist_id: &str) -> Result<(), ApiError> {
        self.record("delete_playlist");
        self.with(|s| {
            s.playlists.retain(|p| p.uuid != playlist_id);
            s.playlist_items.remove(playlist_id);
        });
        Ok(())
    }
}

/// Collects every link it is asked to present.
#[derive(Default)]
pub struct RecordingPresenter {
    links: Mutex<Vec<DeviceLink>>,
}

impl RecordingPresenter {
    pub fn links(&self) -> Vec<DeviceLink> {
        self.links.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkPresenter for RecordingPresenter {
    async fn present(&self, link: &DeviceLink) {
        self.links.lock().unwrap().push(link.clone());
    }
}

pub fn bundle(access_token: &str, refresh_token: Option<&str>) -> CredentialBundle {
    CredentialBundle {
        token_type: "Bearer".to_string(),
        session_id: "session-1".to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        is_pkce: false,
    }
}

pub struct Harness {
    pub fake: Arc<FakeTidal>,
    pub sessions: Arc<SessionManager>,
    pub service: TidalService,
    pub store: SessionStore,
    _dir: TempDir,
}

/// A facade over the fake with an empty session directory.
pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("sessions").join("session.json"));
    let fake = Arc::new(FakeTidal::new());
    let api: Arc<dyn TidalApi> = fake.clone();
    let sessions = Arc::new(SessionManager::new(api.clone(), store.clone()));
    let service = TidalService::new(api, sessions.clone());

    Harness {
        fake,
        sessions,
        service,
        store,
        _dir: dir,
    }
}

/// Like [`harness`], with a valid session already on disk.
pub async fn logged_in() -> Harness {
    let h = harness();
    h.store
        .save(&bundle(VALID_TOKEN, Some("refresh-token")))
        .await
        .unwrap();
    h
}
