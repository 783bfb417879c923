//! Auth token storage and the sign-in redirect collaborator.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Owner of the persisted bearer token.
///
/// The screen borrows the token for one request and never keeps it.
#[async_trait]
pub trait TokenProvider: Send + Sync + Debug {
    /// Look up the stored token. `None` when no usable token is stored.
    async fn get_token(&self) -> Option<String>;

    /// Invalidate the stored token.
    async fn clear_token(&self);
}

/// Receives the request to leave the screen for the sign-in flow.
pub trait Navigator: Send + Sync + Debug {
    fn redirect_to_sign_in(&self);
}

/// A token persisted as a single-line file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store in the platform data directory (e.g. `~/.local/share/device-monitor/token`).
    pub fn in_data_dir() -> Option<Self> {
        directories::ProjectDirs::from("", "", "device-monitor")
            .map(|dirs| Self::new(dirs.data_dir().join("token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `token`, creating parent directories as needed.
    pub async fn set_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&self.path, token.trim())
            .await
            .with_context(|| format!("Failed to write token to {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl TokenProvider for FileTokenStore {
    async fn get_token(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error retrieving token");
                None
            }
        }
    }

    async fn clear_token(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Cleared stored token"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to clear token"),
        }
    }
}

/// An in-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Peek at the stored token without the async lookup.
    pub fn current(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

#[async_trait]
impl TokenProvider for MemoryTokenStore {
    async fn get_token(&self) -> Option<String> {
        self.token
            .lock()
            .clone()
            .filter(|token| !token.trim().is_empty())
    }

    async fn clear_token(&self) {
        *self.token.lock() = None;
    }
}
