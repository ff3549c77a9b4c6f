//! Single-flight coordination of token refresh.
//!
//! At most one refresh cycle runs at a time. The first caller to observe a
//! rejected access token becomes the cycle leader and performs the network
//! call; callers that arrive while the cycle is in flight enqueue a waiter
//! and share the leader's outcome. Cycles are strictly serialized: waiters
//! queued during cycle N are resolved by cycle N, never by a later one.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::auth::SessionStore;
use crate::models::AuthResponse;

/// Default timeout for the refresh network call.
/// A stuck refresh starves every queued waiter, so it gets a bound of its
/// own, tighter than the general request timeout.
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;

/// Outcome of a refresh cycle: the new access token, or a failure signal.
/// Endpoint-returned errors and transport failures collapse to the same
/// signal; callers map it to `ApiError::SessionExpired`.
type RefreshOutcome = Option<String>;

enum RefreshState {
    Idle,
    Refreshing(Vec<oneshot::Sender<RefreshOutcome>>),
}

/// Per-gateway refresh state machine.
///
/// Owned by the gateway instance rather than living in a module-level
/// global, so independent gateways (and tests) never share a cycle.
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    /// Bound on the refresh network call
    timeout: Duration,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS))
    }

    pub(crate) fn with_timeout(timeout: Duration) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            timeout,
        }
    }

    /// Obtain a fresh access token, joining an in-flight cycle if one exists.
    ///
    /// Exactly one network call to the refresh endpoint happens per cycle
    /// regardless of how many callers are waiting on it.
    pub(crate) async fn refresh(
        &self,
        http: &Client,
        session: &SessionStore,
    ) -> RefreshOutcome {
        // Check-and-set must happen in one synchronous step: no await between
        // observing Idle and claiming the cycle.
        let waiter = {
            let mut state = self.lock();
            match &mut *state {
                RefreshState::Refreshing(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            debug!("Joining in-flight token refresh");
            // A dropped sender means the leader panicked; treat as failure.
            return rx.await.unwrap_or(None);
        }

        let outcome = self.run_cycle(http, session).await;

        // Resolve everyone who queued up during this cycle, in FIFO order,
        // and return the coordinator to idle before handing back the outcome.
        let waiters = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing(waiters) => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        debug!(waiters = waiters.len(), "Token refresh cycle resolved");
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }

        outcome
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Perform the actual refresh call. Host and refresh token are captured
    /// once at cycle start; every retry in this cycle uses that host.
    async fn run_cycle(&self, http: &Client, session: &SessionStore) -> RefreshOutcome {
        let Some(pair) = session.credential_pair() else {
            warn!("Cannot refresh token: no stored credential pair");
            return None;
        };
        let host = session.api_host();
        let url = format!("{}/console/api/refresh-token", host);

        debug!("Refreshing access token");

        let request = http
            .post(&url)
            .json(&serde_json::json!({ "refresh_token": pair.refresh_token }))
            .send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Token refresh timed out");
                return None;
            }
        };

        let body: AuthResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to parse refresh response");
                return None;
            }
        };

        match body.tokens() {
            Some(tokens) => {
                // Both tokens are persisted together before anyone is woken.
                session.save_credential_pair(&tokens.access_token, &tokens.refresh_token);
                info!("Access token refreshed");
                Some(tokens.access_token.clone())
            }
            None => {
                warn!(
                    result = %body.result,
                    message = body.message.as_deref().unwrap_or(""),
                    "Token refresh rejected by server"
                );
                None
            }
        }
    }
}
