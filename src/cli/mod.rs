//! # CLI Module
//!
//! Interactive entry points next to the MCP server. They share the session
//! file and its schema with the server, so a login performed here is picked
//! up by every tool on its next call.
//!
//! ## Commands
//!
//! - [`auth`] - Load, validate and, if needed, acquire and save a session.
//!   Uses the OAuth device flow by default, or PKCE with `--pkce`.
//! - [`status`] - Table of the session file, its validity, user and country.
//! - [`logout`] - Delete the session file.
//!
//! ## Usage
//!
//! ```bash
//! tidal-mcp auth            # Authenticate via the device flow
//! tidal-mcp auth --pkce     # Authenticate via PKCE, pasting the redirect URL
//! tidal-mcp status          # Inspect the stored session
//! tidal-mcp logout          # Forget the stored session
//! ```
//!
//! Output uses the crate's status macros; fatal problems end the process
//! through [`crate::error!`].

mod auth;
mod logout;
mod status;

pub use auth::auth;
pub use logout::logout;
pub use status::status;
