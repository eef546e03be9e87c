//! # Authenticated Client Facade
//!
//! [`TidalService`] wraps every catalog and library operation behind the same
//! contract:
//!
//! 1. **Precondition** - [`SessionManager::ensure`] must produce a validated
//!    session; otherwise the call fails with
//!    [`ToolError::AuthenticationRequired`] before any remote request.
//! 2. **Input validation** - limits are clamped, numeric ids parsed and
//!    contradictory parameters rejected, still before any remote request.
//! 3. **Remote call** - delegated to the [`TidalApi`] implementation. Faults
//!    are translated into [`ToolError::NotFound`] for id-addressed lookups and
//!    [`ToolError::OperationFailed`] otherwise.
//! 4. **Projection** - upstream entities are mapped into the output shapes in
//!    [`crate::models`] by the [`projection`] module.
//!
//! The operations themselves live in feature submodules: [`search`],
//! [`favorites`], [`playlists`] and [`browse`].

mod browse;
mod favorites;
mod playlists;
pub mod projection;
mod search;

use std::{future::Future, sync::Arc};

use crate::{
    config::{Config, ConfigError},
    error::{ApiError, EntityKind, ToolError},
    management::{LinkPresenter, SessionManager, SessionStore},
    models::AuthResult,
    tidal::{TidalApi, TidalClient},
};

pub struct TidalService {
    api: Arc<dyn TidalApi>,
    sessions: Arc<SessionManager>,
}

impl TidalService {
    pub fn new(api: Arc<dyn TidalApi>, sessions: Arc<SessionManager>) -> Self {
        TidalService { api, sessions }
    }

    /// Wires the facade to the live TIDAL API and the configured session file.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api: Arc<dyn TidalApi> = Arc::new(TidalClient::new(config)?);
        let store = SessionStore::new(&config.session_file);
        let sessions = Arc::new(SessionManager::new(Arc::clone(&api), store));
        Ok(Self::new(api, sessions))
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Authenticates through the OAuth device flow unless a valid session exists.
    pub async fn login(&self, presenter: &dyn LinkPresenter) -> Result<AuthResult, ToolError> {
        let outcome = self.sessions.login(presenter).await?;
        Ok(AuthResult::authenticated(outcome.message()))
    }

    /// Awaits a remote call, wrapping any fault as an operation failure.
    async fn remote<T, F>(context: &str, call: F) -> Result<T, ToolError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        call.await.map_err(|e| e.into_tool_error(context))
    }

    /// Awaits a remote lookup of one entity; a remote "not found" becomes
    /// [`ToolError::NotFound`] carrying `id`.
    async fn lookup<T, F>(kind: EntityKind, id: &str, context: &str, call: F) -> Result<T, ToolError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        call.await.map_err(|e| e.for_entity(kind, id, context))
    }
}
