use crate::models::{Identity, SessionTokens};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Everything that survives a client restart: the token pair and the last
/// known identity, stored as a single JSON document so the pair is always
/// written as a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(flatten)]
    pub tokens: SessionTokens,
    #[serde(rename = "user")]
    pub identity: Option<Identity>,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.tokens.provider_token.is_none()
            && self.tokens.backend_token.is_none()
            && self.identity.is_none()
    }
}

/// Durable local session storage backed by a JSON file.
///
/// Reads never fail the caller: a missing or corrupt file degrades to an
/// empty session, since everything in it is re-derivable by signing in again.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted session; empty when nothing is stored
    pub fn load(&self) -> PersistedSession {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return PersistedSession::default();
            }
            Err(e) => {
                warn!("Could not read session file {}: {}", self.path.display(), e);
                return PersistedSession::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!("Invalid session file {}, ignoring: {}", self.path.display(), e);
                PersistedSession::default()
            }
        }
    }

    /// Current token pair; used by the request authorizer on every call
    pub fn tokens(&self) -> SessionTokens {
        self.load().tokens
    }

    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create session directory")?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json).context("Failed to write session file")?;
        debug!("Session persisted to {}", self.path.display());
        Ok(())
    }

    /// Load, apply a mutation, and write back as one unit
    pub fn update(&self, f: impl FnOnce(&mut PersistedSession)) -> Result<PersistedSession> {
        let mut session = self.load();
        f(&mut session);
        self.save(&session)?;
        Ok(session)
    }

    /// Drop all persisted state: tokens and identity together
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to clear session file"),
        }
    }
}
