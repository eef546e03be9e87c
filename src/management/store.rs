use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use crate::types::CredentialBundle;

/// Durable home of the single credential bundle.
///
/// The file holds one JSON object whose values are each wrapped as
/// `{"data": <value>}`; the same path and schema are shared by the server and
/// the `auth` command.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted bundle without side effects.
    ///
    /// A missing file yields `Ok(None)`; a malformed one an
    /// [`ErrorKind::InvalidData`] error.
    pub async fn read(&self) -> io::Result<Option<CredentialBundle>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        serde_json::from_str::<CredentialBundle>(&content)
            .map(Some)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }

    /// Reads the persisted bundle.
    ///
    /// A missing file yields `None`. An unreadable or malformed file is
    /// treated the same way and deleted so the next run starts clean.
    pub async fn load(&self) -> Option<CredentialBundle> {
        match self.read().await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Session file is unreadable, discarding it"
                );
                self.clear().await;
                None
            }
        }
    }

    /// Overwrites the session file, creating parent directories as needed.
    pub async fn save(&self, bundle: &CredentialBundle) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(bundle).map_err(io::Error::other)?;
        async_fs::write(&self.path, json).await
    }

    /// Deletes the session file. Absence is not an error.
    pub async fn clear(&self) {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Session file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot remove session file")
            }
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
