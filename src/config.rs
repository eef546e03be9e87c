//! Configuration management for the TIDAL MCP server.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files. The resulting [`Config`] value is built once at start-up
//! and handed to every component that needs it.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use thiserror::Error;

/// Directory name used under the platform's local data directory.
pub const APP_DIR: &str = "tidal-mcp";

const DEFAULT_API_URL: &str = "https://api.tidal.com/v1";
const DEFAULT_AUTH_URL: &str = "https://auth.tidal.com/v1/oauth2";
const DEFAULT_LOGIN_URL: &str = "https://login.tidal.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Cannot create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist. A missing `.env` file
/// is not an error: every variable can also come from the process environment.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/tidal-mcp/.env`
/// - macOS: `~/Library/Application Support/tidal-mcp/.env`
/// - Windows: `%LOCALAPPDATA%/tidal-mcp/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        // Variables already present in the environment win over the file.
        dotenv::from_path(&path).ok();
    }
    Ok(())
}

/// Runtime configuration shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub pkce_client_id: Option<String>,
    pub api_url: String,
    pub auth_url: String,
    pub login_url: String,
    pub session_file: PathBuf,
    pub open_browser: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            client_id: non_empty("TIDAL_CLIENT_ID"),
            client_secret: non_empty("TIDAL_CLIENT_SECRET"),
            pkce_client_id: non_empty("TIDAL_PKCE_CLIENT_ID"),
            api_url: non_empty("TIDAL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_url: non_empty("TIDAL_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            login_url: non_empty("TIDAL_LOGIN_URL")
                .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
            session_file: non_empty("TIDAL_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
            open_browser: non_empty("TIDAL_OPEN_BROWSER")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    /// Returns the TIDAL API client id used for the device flow.
    pub fn client_id(&self) -> Result<&str, ConfigError> {
        self.client_id
            .as_deref()
            .ok_or(ConfigError::Missing("TIDAL_CLIENT_ID"))
    }
}

/// Returns the application's local data directory, e.g. `~/.local/share/tidal-mcp`.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// The well-known location of the persisted session.
pub fn default_session_file() -> PathBuf {
    data_dir().join("session.json")
}

pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
