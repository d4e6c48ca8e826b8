/// Snapshot of the client session as published by the bootstrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub ready: bool,
    pub session_id: Option<String>,
}

impl SessionState {
    pub fn ready_without_session() -> Self {
        Self {
            ready: true,
            session_id: None,
        }
    }
}
