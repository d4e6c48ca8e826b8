use std::sync::Arc;

use common::models::SessionState;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    handle::SessionHandle,
    identity::{AuthUser, IdentityConfig, IdentityError, IdentityProvider},
};

/// Establishes the client session once per process and owns `SessionState`.
///
/// `ready` goes from `false` to `true` exactly once. Invalid or missing identity
/// configuration still ends in a ready (but anonymous, id-less) session so that
/// read-only signal requests keep working.
pub struct SessionBootstrapper {
    state_tx: Arc<watch::Sender<SessionState>>,
    listener: Option<JoinHandle<()>>,
    sign_in: Option<JoinHandle<()>>,
}

impl SessionBootstrapper {
    /// Starts bootstrapping in the background. Must be called inside a tokio runtime.
    pub fn start<F>(identity_config: Option<&str>, initial_token: Option<String>, connect: F) -> Self
    where
        F: FnOnce(&IdentityConfig) -> Result<Arc<dyn IdentityProvider>, IdentityError>,
    {
        let (state_tx, _) = watch::channel(SessionState::default());
        let mut boot = Self {
            state_tx: Arc::new(state_tx),
            listener: None,
            sign_in: None,
        };

        let config = match identity_config.map(IdentityConfig::parse) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                error!("{}. Continuing without a session.", e);
                boot.mark_ready_without_session();
                return boot;
            }
            None => {
                warn!("No identity configuration. Continuing without a session.");
                boot.mark_ready_without_session();
                return boot;
            }
        };

        let provider = match connect(&config) {
            Ok(provider) => provider,
            Err(e) => {
                error!("Identity provider unavailable: {}. Continuing without a session.", e);
                boot.mark_ready_without_session();
                return boot;
            }
        };

        // Subscribe before signing in so the sign-in notification cannot be missed.
        let notifications = provider.subscribe();
        boot.listener = Some(tokio::spawn(Self::listen(
            boot.state_tx.clone(),
            notifications,
        )));
        boot.sign_in = Some(tokio::spawn(Self::sign_in(
            boot.state_tx.clone(),
            provider,
            initial_token,
        )));

        boot
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.state_tx.subscribe())
    }

    /// Releases the session-change listener and stops any pending sign-in.
    pub async fn shutdown(&mut self) {
        for handle in [self.listener.take(), self.sign_in.take()].into_iter().flatten() {
            handle.abort();
            let _ = handle.await;
        }
        debug!("Session bootstrapper stopped");
    }

    fn mark_ready_without_session(&self) {
        self.state_tx.send_modify(|state| {
            *state = SessionState::ready_without_session();
        });
        info!("Session ready (unauthenticated)");
    }

    async fn listen(
        state_tx: Arc<watch::Sender<SessionState>>,
        mut notifications: broadcast::Receiver<Option<AuthUser>>,
    ) {
        loop {
            match notifications.recv().await {
                Ok(user) => apply_notification(&state_tx, user),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Session listener lagged: missed {} notifications", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Session notification channel closed");
                    break;
                }
            }
        }
    }

    async fn sign_in(
        state_tx: Arc<watch::Sender<SessionState>>,
        provider: Arc<dyn IdentityProvider>,
        initial_token: Option<String>,
    ) {
        let first_attempt = match initial_token.as_deref() {
            Some(token) => {
                debug!("Signing in with initial token");
                provider.sign_in_with_custom_token(token).await
            }
            None => {
                debug!("Signing in anonymously");
                provider.sign_in_anonymously().await
            }
        };

        let Err(e) = first_attempt else {
            return;
        };
        warn!("Sign-in failed: {}. Falling back to anonymous sign-in.", e);

        if let Err(e) = provider.sign_in_anonymously().await {
            error!("Anonymous sign-in failed: {}. Using a local session id.", e);
            state_tx.send_modify(|state| {
                if state.session_id.is_none() {
                    state.session_id = Some(local_session_id());
                }
                state.ready = true;
            });
        }
    }
}

impl Drop for SessionBootstrapper {
    fn drop(&mut self) {
        for handle in [self.listener.take(), self.sign_in.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

fn apply_notification(state_tx: &watch::Sender<SessionState>, user: Option<AuthUser>) {
    let session_id = match user {
        Some(user) => user.uid,
        None => {
            debug!("Session notification without a user, using a local id");
            local_session_id()
        }
    };

    state_tx.send_modify(|state| {
        if !state.ready {
            info!("Session ready");
        }
        state.session_id = Some(session_id);
        state.ready = true;
    });
}

fn local_session_id() -> String {
    Uuid::new_v4().to_string()
}
