use serde::{Deserialize, Serialize};

/// Single value wrapped as `{"data": <value>}` in the persisted session file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> From<T> for Data<T> {
    fn from(data: T) -> Self {
        Data { data }
    }
}

/// The persisted OAuth token set needed to act on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredBundle", into = "StoredBundle")]
pub struct CredentialBundle {
    pub token_type: String,
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub is_pkce: bool,
}

impl CredentialBundle {
    pub fn from_token(token: TokenResponse, is_pkce: bool) -> Self {
        Self {
            token_type: token
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            session_id: String::new(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            is_pkce,
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredBundle {
    token_type: Data<String>,
    #[serde(default)]
    session_id: Data<String>,
    access_token: Data<String>,
    #[serde(default)]
    refresh_token: Data<Option<String>>,
    #[serde(default)]
    is_pkce: Data<bool>,
}

impl From<StoredBundle> for CredentialBundle {
    fn from(stored: StoredBundle) -> Self {
        Self {
            token_type: stored.token_type.data,
            session_id: stored.session_id.data,
            access_token: stored.access_token.data,
            refresh_token: stored.refresh_token.data,
            is_pkce: stored.is_pkce.data,
        }
    }
}

impl From<CredentialBundle> for StoredBundle {
    fn from(bundle: CredentialBundle) -> Self {
        Self {
            token_type: bundle.token_type.into(),
            session_id: bundle.session_id.into(),
            access_token: bundle.access_token.into(),
            refresh_token: bundle.refresh_token.into(),
            is_pkce: bundle.is_pkce.into(),
        }
    }
}

/// What the login-check endpoint reports for a live session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub session_id: Option<String>,
    pub user_id: u64,
    pub country_code: String,
}

/// Credentials scoping a single authenticated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    pub authorization: String,
    pub user_id: u64,
    pub country_code: String,
}

impl Authorized {
    pub fn new(bundle: &CredentialBundle, info: &SessionInfo) -> Self {
        Self {
            authorization: bundle.authorization(),
            user_id: info.user_id,
            country_code: info.country_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default)]
    pub verification_uri_complete: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Tracks,
    Albums,
    Artists,
    Playlists,
}

impl SearchKind {
    pub fn as_param(&self) -> &'static str {
        match self {
            SearchKind::Tracks => "TRACKS",
            SearchKind::Albums => "ALBUMS",
            SearchKind::Artists => "ARTISTS",
            SearchKind::Playlists => "PLAYLISTS",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_number_of_items: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteItem<T> {
    #[serde(default)]
    pub created: Option<String>,
    pub item: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub tracks: Option<Page<TidalTrack>>,
    #[serde(default)]
    pub albums: Option<Page<TidalAlbum>>,
    #[serde(default)]
    pub artists: Option<Page<TidalArtist>>,
    #[serde(default)]
    pub playlists: Option<Page<TidalPlaylist>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TidalTrack {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalAlbum {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
    #[serde(default)]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TidalArtist {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaylistCreator {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPlaylist {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
    #[serde(default)]
    pub creator: Option<PlaylistCreator>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistBio {
    #[serde(default)]
    pub text: Option<String>,
}

/// Minimal shape of an OAuth error body, e.g. `{"error": "authorization_pending"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
