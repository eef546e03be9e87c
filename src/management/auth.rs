use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SessionStore;
use crate::{
    error::{ApiError, ToolError},
    tidal::TidalApi,
    types::{Authorized, CredentialBundle, SessionInfo},
    utils,
};

/// Verification link of a pending device authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLink {
    pub url: String,
    pub user_code: String,
    pub expires_in: u64,
}

/// Shows the verification link to whoever has to complete the login.
#[async_trait]
pub trait LinkPresenter: Send + Sync {
    async fn present(&self, link: &DeviceLink);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    AlreadyAuthenticated,
    Authenticated,
}

impl LoginOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LoginOutcome::AlreadyAuthenticated => "Already authenticated with TIDAL",
            LoginOutcome::Authenticated => "Successfully authenticated with TIDAL",
        }
    }
}

const TIMED_OUT_MESSAGE: &str = "Authentication timed out. Please authenticate using the helper command:\n\n  tidal-mcp auth\n\nAfter authenticating, all MCP tools will work automatically.";

/// Owns the process-wide credential bundle.
///
/// Every authenticated operation goes through [`SessionManager::ensure`],
/// which revalidates the bundle against TIDAL on each call. OAuth acquisition
/// is single-flight: concurrent logins queue on `acquire_guard` and the later
/// ones pick up the session the first one obtained.
pub struct SessionManager {
    api: Arc<dyn TidalApi>,
    store: SessionStore,
    current: Mutex<Option<CredentialBundle>>,
    acquire_guard: Mutex<()>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn TidalApi>, store: SessionStore) -> Self {
        SessionManager {
            api,
            store,
            current: Mutex::new(None),
            acquire_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Returns credentials for one operation, or
    /// [`ToolError::AuthenticationRequired`] without touching the remote
    /// service when no bundle exists.
    ///
    /// A rejected bundle is first compared with the session file, which the
    /// `auth` command may have rewritten meanwhile. Failing that it gets one
    /// refresh attempt; if that fails too the bundle is dropped from memory
    /// and, unless the file holds a different one, from disk.
    pub async fn ensure(&self) -> Result<Authorized, ToolError> {
        let bundle = self
            .current_bundle()
            .await
            .ok_or(ToolError::AuthenticationRequired)?;

        if let Some(info) = self.check(&bundle).await {
            return Ok(Authorized::new(&bundle, &info));
        }

        if let Some((stored, info)) = self.reload(&bundle).await {
            tracing::info!("Picked up TIDAL session from the session file");
            let authorized = Authorized::new(&stored, &info);
            self.replace(&bundle, Some(stored)).await;
            return Ok(authorized);
        }

        if let Some((fresh, info)) = self.refresh(&bundle).await {
            tracing::info!("TIDAL session refreshed");
            let authorized = Authorized::new(&fresh, &info);
            self.replace(&bundle, Some(fresh)).await;
            return Ok(authorized);
        }

        tracing::warn!(
            path = %self.store.path().display(),
            "TIDAL session is no longer valid, clearing it"
        );
        self.replace(&bundle, None).await;
        Err(ToolError::AuthenticationRequired)
    }

    /// Asks TIDAL whether the bundle is still accepted. Any failure counts as invalid.
    pub async fn validate(&self, bundle: &CredentialBundle) -> bool {
        self.check(bundle).await.is_some()
    }

    /// Session details of the held bundle without invalidating anything.
    pub async fn inspect(&self) -> Option<SessionInfo> {
        let bundle = self.current_bundle().await?;
        self.check(&bundle).await
    }

    /// Makes sure a valid session exists, running the device flow if needed.
    pub async fn login(&self, presenter: &dyn LinkPresenter) -> Result<LoginOutcome, ToolError> {
        if self.ensure().await.is_ok() {
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        let _guard = self.acquire_guard.lock().await;
        // Someone else may have finished a login while we waited.
        if self.ensure().await.is_ok() {
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        let bundle = self.acquire_via_oauth(presenter).await?;
        self.establish(bundle).await?;
        tracing::info!("Authenticated with TIDAL");
        Ok(LoginOutcome::Authenticated)
    }

    /// Runs the OAuth device flow until the user completes the link or it expires.
    pub async fn acquire_via_oauth(
        &self,
        presenter: &dyn LinkPresenter,
    ) -> Result<CredentialBundle, ToolError> {
        let device = self
            .api
            .device_authorization()
            .await
            .map_err(login_error)?;

        let url = device
            .verification_uri_complete
            .as_deref()
            .unwrap_or(&device.verification_uri);
        presenter
            .present(&DeviceLink {
                url: utils::ensure_https(url),
                user_code: device.user_code.clone(),
                expires_in: device.expires_in,
            })
            .await;

        let interval = Duration::from_secs(device.interval.max(1));
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);

        loop {
            match self.api.poll_device_token(&device.device_code).await {
                Ok(token) => return Ok(CredentialBundle::from_token(token, false)),
                Err(ApiError::AuthorizationPending) => {}
                Err(e) => return Err(login_error(e)),
            }

            if Instant::now() + interval >= deadline {
                return Err(ToolError::AuthenticationFailed(TIMED_OUT_MESSAGE.to_string()));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Confirms a freshly obtained bundle, persists it and makes it current.
    pub async fn establish(&self, mut bundle: CredentialBundle) -> Result<Authorized, ToolError> {
        let info = self.check(&bundle).await.ok_or_else(|| {
            ToolError::AuthenticationFailed("Authentication failed - please try again".to_string())
        })?;

        if let Some(session_id) = info.session_id.as_ref().filter(|s| !s.is_empty()) {
            bundle.session_id = session_id.clone();
        }

        self.store
            .save(&bundle)
            .await
            .map_err(|e| ToolError::failed("Failed to save session", e))?;
        tracing::debug!(path = %self.store.path().display(), "Session saved");

        let authorized = Authorized::new(&bundle, &info);
        *self.current.lock().await = Some(bundle);
        Ok(authorized)
    }

    async fn current_bundle(&self) -> Option<CredentialBundle> {
        let mut current = self.current.lock().await;
        if current.is_none() {
            *current = self.store.load().await;
        }
        current.clone()
    }

    async fn check(&self, bundle: &CredentialBundle) -> Option<SessionInfo> {
        match self.api.check_session(bundle).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(error = %e, "Session check failed");
                None
            }
        }
    }

    /// A valid bundle from the session file that differs from `stale`.
    async fn reload(&self, stale: &CredentialBundle) -> Option<(CredentialBundle, SessionInfo)> {
        let stored = self.store.load().await.filter(|b| b != stale)?;
        let info = self.check(&stored).await?;
        Some((stored, info))
    }

    async fn refresh(&self, stale: &CredentialBundle) -> Option<(CredentialBundle, SessionInfo)> {
        stale.refresh_token.as_ref().filter(|t| !t.is_empty())?;

        let token = match self.api.refresh(stale).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return None;
            }
        };

        let mut fresh = CredentialBundle::from_token(token, stale.is_pkce);
        let info = self.check(&fresh).await?;
        fresh.session_id = info
            .session_id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| stale.session_id.clone());
        Some((fresh, info))
    }

    /// Swaps the held bundle, unless another task already replaced `stale`.
    ///
    /// A replacement is written to the session file. Replacing with `None`
    /// deletes the file, but only while it still holds `stale` (or nothing
    /// readable); a bundle written there by someone else is left alone.
    async fn replace(&self, stale: &CredentialBundle, next: Option<CredentialBundle>) {
        let mut current = self.current.lock().await;
        if current.as_ref() != Some(stale) {
            return;
        }

        match &next {
            Some(bundle) => {
                if let Err(e) = self.store.save(bundle).await {
                    tracing::warn!(error = %e, "Cannot persist session");
                }
            }
            None => match self.store.load().await {
                Some(stored) if &stored != stale => {
                    tracing::debug!("Session file changed meanwhile, keeping it");
                }
                _ => self.store.clear().await,
            },
        }
        *current = next;
    }
}

fn login_error(e: ApiError) -> ToolError {
    match e {
        ApiError::ExpiredLink => ToolError::AuthenticationFailed(TIMED_OUT_MESSAGE.to_string()),
        other => ToolError::AuthenticationFailed(format!("Authentication error: {other}")),
    }
}
