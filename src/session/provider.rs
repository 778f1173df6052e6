use crate::models::ProviderIdentity;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// Errors surfaced by the external identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("no user is signed in with the identity provider")]
    NotSignedIn,
    #[error("identity provider token fetch failed: {0}")]
    Token(String),
}

/// Seam for the external identity provider's credential API.
/// The provider's sign-in/sign-out surface is out of scope here; the session
/// manager only ever needs a token for the currently signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain a short-lived provider token for the current user.
    /// `force_refresh` bypasses any provider-side token cache.
    async fn fetch_token(&self, force_refresh: bool) -> Result<String, ProviderError>;
}

/// A sign-in state change from the provider: `Some` on sign-in, `None` on sign-out
pub type IdentityEvent = Option<ProviderIdentity>;

/// Publisher half of the identity-change stream. Dropping it closes the
/// channel, which is how a subscriber's `run` loop gets torn down.
pub struct IdentityEvents {
    tx: mpsc::Sender<IdentityEvent>,
}

impl IdentityEvents {
    pub async fn publish(&self, event: IdentityEvent) {
        if self.tx.send(event).await.is_err() {
            warn!("Identity event dropped: no subscriber is listening");
        }
    }
}

/// Explicit publisher/subscriber pair for identity-state changes
pub fn identity_events(capacity: usize) -> (IdentityEvents, mpsc::Receiver<IdentityEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (IdentityEvents { tx }, rx)
}

/// Provider backed by a pre-issued token from the environment, for running
/// the client outside a browser context
pub struct EnvTokenProvider {
    token: String,
}

impl EnvTokenProvider {
    /// Build from `OPENHOUSE_ID_TOKEN` / `OPENHOUSE_EMAIL`, plus optional
    /// `OPENHOUSE_UID`, `OPENHOUSE_DISPLAY_NAME` and `OPENHOUSE_PHOTO_URL`.
    /// Returns `None` when the required variables are absent.
    pub fn from_env() -> Option<(Self, ProviderIdentity)> {
        let token = env_non_empty("OPENHOUSE_ID_TOKEN")?;
        let email = env_non_empty("OPENHOUSE_EMAIL")?;
        let identity = ProviderIdentity {
            provider_id: env_non_empty("OPENHOUSE_UID").unwrap_or_else(|| email.clone()),
            email,
            display_name: env_non_empty("OPENHOUSE_DISPLAY_NAME"),
            photo_url: env_non_empty("OPENHOUSE_PHOTO_URL"),
        };
        Some((Self { token }, identity))
    }
}

#[async_trait]
impl IdentityProvider for EnvTokenProvider {
    async fn fetch_token(&self, _force_refresh: bool) -> Result<String, ProviderError> {
        // A pre-issued token is all this provider has; refresh cannot mint a new one
        Ok(self.token.clone())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
