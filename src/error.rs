use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Kind of id-addressed TIDAL entity, used to label identifier and lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Track,
    Album,
    Artist,
    Playlist,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Album => "album",
            EntityKind::Artist => "artist",
            EntityKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Track => "Track",
            EntityKind::Album => "Album",
            EntityKind::Artist => "Artist",
            EntityKind::Playlist => "Playlist",
        };
        f.write_str(label)
    }
}

/// Errors surfaced by every tool operation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Not authenticated. Please run the 'login' tool first.")]
    AuthenticationRequired,

    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid {} ID format: {id}", .kind.as_str())]
    InvalidIdentifier { kind: EntityKind, id: String },

    #[error("{kind} with ID '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{context}: {message}")]
    OperationFailed { context: String, message: String },
}

impl ToolError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ToolError::BadRequest(message.into())
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        ToolError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn failed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        ToolError::OperationFailed {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Faults reported by the remote TIDAL API or the transport underneath it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired or revoked")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authorization pending")]
    AuthorizationPending,

    #[error("Authorization link expired")]
    ExpiredLink,

    #[error("Status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Missing configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }

        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(truncated),
            _ => ApiError::Status {
                status,
                body: truncated,
            },
        }
    }

    /// Wraps the fault into the catch-all operation failure.
    pub fn into_tool_error(self, context: &str) -> ToolError {
        ToolError::failed(context, self)
    }

    /// Like [`ApiError::into_tool_error`], but a remote "not found" becomes a
    /// [`ToolError::NotFound`] carrying the requested id.
    pub fn for_entity(self, kind: EntityKind, id: &str, context: &str) -> ToolError {
        match self {
            ApiError::NotFound(_) => ToolError::not_found(kind, id),
            other => other.into_tool_error(context),
        }
    }
}
