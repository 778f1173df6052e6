use crate::api::ApiClient;
use crate::models::Identity;
use crate::session::provider::{IdentityEvent, IdentityProvider};
use crate::session::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How long the initial backend reconciliation may run before sign-in
/// proceeds without it
pub const RECONCILE_TIMEOUT: Duration = Duration::from_secs(3);

/// Trust level of a signed-in identity: optimistic identities carry
/// provider-only data and the default buyer role; reconciled ones carry the
/// backend's authoritative role and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Optimistic,
    Reconciled,
}

/// The session's authoritative state. Optimistic is a valid resting state:
/// a backend that never answers leaves the session usable at provider-only
/// trust.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    SignedIn {
        identity: Identity,
        phase: SessionPhase,
    },
}

/// Owns the authenticated-identity lifecycle: reacts to provider sign-in
/// state changes, exchanges provider tokens for backend session tokens, and
/// keeps the durable session store in step.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    api: ApiClient,
    store: Arc<SessionStore>,
    state: SessionState,
    reconcile_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        api: ApiClient,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            provider,
            api,
            store,
            state: SessionState::SignedOut,
            reconcile_timeout: RECONCILE_TIMEOUT,
        }
    }

    /// Override the reconciliation bound; mainly for tests
    pub fn with_reconcile_timeout(mut self, timeout: Duration) -> Self {
        self.reconcile_timeout = timeout;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::SignedIn { identity, .. } => Some(identity),
            SessionState::SignedOut => None,
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(
            self.state,
            SessionState::SignedIn {
                phase: SessionPhase::Reconciled,
                ..
            }
        )
    }

    /// Drive the manager from the provider's identity-change stream until
    /// the publisher is dropped
    pub async fn run(&mut self, mut events: mpsc::Receiver<IdentityEvent>) {
        while let Some(event) = events.recv().await {
            self.on_identity_changed(event).await;
        }
        debug!("Identity event stream closed");
    }

    /// Sole entry point for provider sign-in state changes
    pub async fn on_identity_changed(&mut self, event: IdentityEvent) {
        let Some(provider_identity) = event else {
            if let Err(e) = self.store.clear() {
                warn!("Failed to clear session storage on sign-out: {e:#}");
            }
            self.state = SessionState::SignedOut;
            info!("Signed out; local session cleared");
            return;
        };

        let token = match self.provider.fetch_token(false).await {
            Ok(token) => token,
            Err(e) => {
                // Degrade to provider-supplied fields only; not an error for the caller
                warn!("Provider token fetch failed, using provider data without a token: {e}");
                let fallback = Identity::provisional(&provider_identity);
                self.persist(|s| s.identity = Some(fallback.clone()));
                self.state = SessionState::SignedIn {
                    identity: fallback,
                    phase: SessionPhase::Optimistic,
                };
                return;
            }
        };
        self.persist(|s| s.tokens.provider_token = Some(token.clone()));

        // Prefer a previously persisted identity so a reload shows the same
        // user immediately; otherwise show the provisional one right away
        // rather than waiting on the backend.
        let provisional = Identity::provisional(&provider_identity);
        let identity = match self.store.load().identity {
            Some(stored) => {
                debug!("Restored identity for {} from session storage", stored.email);
                stored
            }
            None => {
                self.persist(|s| s.identity = Some(provisional.clone()));
                provisional
            }
        };
        info!("Signed in as {} (awaiting backend reconciliation)", identity.email);
        self.state = SessionState::SignedIn {
            identity: identity.clone(),
            phase: SessionPhase::Optimistic,
        };

        match tokio::time::timeout(self.reconcile_timeout, self.api.login(&token)).await {
            Ok(Ok(login)) => {
                let merged = identity.merged(login.user);
                self.persist(|s| {
                    s.identity = Some(merged.clone());
                    if let Some(backend_token) = login.token.clone() {
                        s.tokens.backend_token = Some(backend_token);
                    }
                });
                info!(
                    "Session reconciled with backend: {} ({})",
                    merged.email,
                    merged.role.as_str()
                );
                self.state = SessionState::SignedIn {
                    identity: merged,
                    phase: SessionPhase::Reconciled,
                };
            }
            Ok(Err(e)) => {
                warn!("Backend reconciliation failed, continuing with provider identity: {e}");
            }
            Err(_) => {
                warn!(
                    "Backend reconciliation timed out after {:?}, continuing with provider identity",
                    self.reconcile_timeout
                );
            }
        }
    }

    /// Force-refresh the provider token and reconcile again, unbounded this
    /// time since it is a deliberate user action. Returns the merged identity,
    /// or the previous one unchanged if reconciliation fails.
    pub async fn refresh(&mut self) -> Option<Identity> {
        let SessionState::SignedIn { identity, .. } = self.state.clone() else {
            debug!("Refresh requested while signed out");
            return None;
        };

        let token = match self.provider.fetch_token(true).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Provider token refresh failed: {e}");
                return Some(identity);
            }
        };
        self.persist(|s| s.tokens.provider_token = Some(token.clone()));

        match self.api.login(&token).await {
            Ok(login) => {
                let merged = identity.merged(login.user);
                self.persist(|s| {
                    s.identity = Some(merged.clone());
                    if let Some(backend_token) = login.token.clone() {
                        s.tokens.backend_token = Some(backend_token);
                    }
                });
                info!("Identity refreshed from backend: {}", merged.email);
                self.state = SessionState::SignedIn {
                    identity: merged.clone(),
                    phase: SessionPhase::Reconciled,
                };
                Some(merged)
            }
            Err(e) => {
                warn!("Identity refresh failed, keeping previous identity: {e}");
                Some(identity)
            }
        }
    }

    fn persist(&self, f: impl FnOnce(&mut crate::session::store::PersistedSession)) {
        if let Err(e) = self.store.update(f) {
            warn!("Failed to persist session state: {e:#}");
        }
    }
}
