use crate::{error::SignalError, models::CanonicalSignal};

/// Lifecycle of the dashboard's signal request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(CanonicalSignal),
    Failed(SignalError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}
