use common::models::SessionState;
use tokio::sync::watch;

/// Read-only view of the session published by the bootstrapper.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub(crate) fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    /// A handle that never changes. Useful when no identity layer is wired in.
    pub fn fixed(state: SessionState) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx }
    }

    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.rx.borrow().ready
    }

    /// Suspends until the session is ready.
    ///
    /// Returns the latest snapshot even if the bootstrapper went away first.
    pub async fn wait_ready(&self) -> SessionState {
        let mut rx = self.rx.clone();
        if let Ok(state) = rx.wait_for(|state| state.ready).await {
            return state.clone();
        }
        rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_handle_reports_its_state() {
        let handle = SessionHandle::fixed(SessionState {
            ready: true,
            session_id: Some("uid-1".into()),
        });
        assert!(handle.is_ready());
        assert_eq!(handle.snapshot().session_id.as_deref(), Some("uid-1"));
        assert!(handle.wait_ready().await.ready);
    }

    #[tokio::test]
    async fn test_wait_ready_returns_when_sender_is_gone() {
        let handle = SessionHandle::fixed(SessionState::default());
        let state = handle.wait_ready().await;
        assert!(!state.ready);
    }

    #[tokio::test]
    async fn test_wait_ready_wakes_on_transition() {
        let (tx, rx) = watch::channel(SessionState::default());
        let handle = SessionHandle::new(rx);

        let waiter = tokio::spawn({
            let handle = handle.clone();
            async move { handle.wait_ready().await }
        });

        tx.send_modify(|s| {
            s.ready = true;
            s.session_id = Some("abc".into());
        });

        let state = waiter.await.unwrap();
        assert_eq!(state.session_id.as_deref(), Some("abc"));
    }
}
