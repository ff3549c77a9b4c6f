use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Application name used for the session file path
const APP_NAME: &str = "dify-console";

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Access and refresh token pair issued by the console.
///
/// The two tokens are rotated together on refresh and must never be stored
/// or exposed as a mismatched pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// On-disk session format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    api_host: String,
    credentials: Option<CredentialPair>,
    saved_at: DateTime<Utc>,
}

#[derive(Debug)]
struct SessionState {
    api_host: String,
    credentials: Option<CredentialPair>,
}

/// Shared store for the credential pair and API host.
///
/// Every request re-reads the credential pair immediately before use rather
/// than caching it, since a concurrent refresh may have replaced it. Writers
/// are the refresh cycle and the login flow; both replace the pair whole.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    /// Where to persist the session, if anywhere
    session_path: Option<PathBuf>,
}

impl SessionStore {
    /// Create an in-memory store with no persistence. Used by tests and
    /// embedders that manage persistence themselves.
    pub fn in_memory(api_host: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                api_host: api_host.into(),
                credentials: None,
            }),
            session_path: None,
        }
    }

    /// Create a disk-backed store, loading any previously saved session.
    ///
    /// The session file lives under the user cache directory. A saved host
    /// overrides `default_host`; saved credentials are restored as-is.
    pub fn persistent(default_host: impl Into<String>) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        let path = cache_dir.join(APP_NAME).join(SESSION_FILE);
        Ok(Self::at_path(default_host, path))
    }

    /// Create a disk-backed store with an explicit session file path
    pub fn at_path(default_host: impl Into<String>, path: PathBuf) -> Self {
        let mut state = SessionState {
            api_host: default_host.into(),
            credentials: None,
        };

        match Self::load_file(&path) {
            Ok(Some(file)) => {
                debug!(saved_at = %file.saved_at, "Loaded saved session");
                if !file.api_host.is_empty() {
                    state.api_host = file.api_host;
                }
                state.credentials = file.credentials;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load session file, starting fresh"),
        }

        Self {
            state: RwLock::new(state),
            session_path: Some(path),
        }
    }

    fn load_file(path: &PathBuf) -> Result<Option<SessionFile>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(path).context("Failed to read session file")?;
        let file: SessionFile =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(file))
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the stored credential pair, if any
    pub fn credential_pair(&self) -> Option<CredentialPair> {
        self.read().credentials.clone()
    }

    /// Get the configured API host
    pub fn api_host(&self) -> String {
        self.read().api_host.clone()
    }

    /// Replace the API host
    pub fn set_api_host(&self, host: impl Into<String>) {
        {
            let mut state = self.write();
            state.api_host = host.into();
        }
        self.persist();
    }

    /// Replace the credential pair atomically. Both tokens are swapped in a
    /// single write; partial (access-only or refresh-only) updates are not
    /// representable.
    pub fn save_credential_pair(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        {
            let mut state = self.write();
            state.credentials = Some(CredentialPair {
                access_token: access_token.into(),
                refresh_token: refresh_token.into(),
            });
        }
        self.persist();
    }

    /// Remove the stored credential pair, keeping the API host
    pub fn clear_credential_pair(&self) {
        {
            let mut state = self.write();
            state.credentials = None;
        }
        self.persist();
    }

    /// Whether a credential pair is currently stored
    pub fn is_authenticated(&self) -> bool {
        self.read().credentials.is_some()
    }

    /// Write the current state to disk, if this store is disk-backed.
    /// Persistence failures are logged, not propagated; the in-memory state
    /// is already updated and callers must not fail on a disk error.
    fn persist(&self) {
        let Some(ref path) = self.session_path else {
            return;
        };
        let file = {
            let state = self.read();
            SessionFile {
                api_host: state.api_host.clone(),
                credentials: state.credentials.clone(),
                saved_at: Utc::now(),
            }
        };
        if let Err(e) = Self::write_file(path, &file) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    fn write_file(path: &PathBuf, file: &SessionFile) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(file)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }
}
