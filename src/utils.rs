use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::NaiveDate;
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::error::{EntityKind, ToolError};

const WEB_BASE_URL: &str = "https://tidal.com/browse";

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random 16-digit hex key identifying this client instance to the PKCE login.
pub fn generate_client_unique_key() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}

/// Clamps a caller-supplied limit into `1..=max`.
pub fn clamp_limit(limit: i64, max: u32) -> u32 {
    limit.clamp(1, i64::from(max)) as u32
}

/// Parses a numeric TIDAL id, reporting the entity kind on failure.
pub fn parse_id(kind: EntityKind, id: &str) -> Result<u64, ToolError> {
    id.trim()
        .parse::<u64>()
        .map_err(|_| ToolError::InvalidIdentifier {
            kind,
            id: id.to_string(),
        })
}

/// Public web link for an entity, e.g. `https://tidal.com/browse/track/123`.
pub fn web_url(kind: EntityKind, id: impl std::fmt::Display) -> String {
    format!("{}/{}/{}", WEB_BASE_URL, kind.as_str(), id)
}

/// Prefixes `https://` to links that arrive without a scheme.
pub fn ensure_https(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Normalizes TIDAL's release dates (`2021-05-07` or `2021-05-07T00:00:00.000+0000`)
/// to `YYYY-MM-DD`. Anything unparseable is passed through untouched.
pub fn normalize_release_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn extract_query_param(url: &str, key: &str) -> Option<String> {
    let url = Url::parse(url.trim()).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Runs blocking work (browser launch, terminal input) on tokio's blocking pool.
pub async fn run_blocking<F, T>(work: F) -> Result<T, tokio::task::JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await
}
