use thiserror::Error;

/// Everything that can end a signal request.
///
/// The `Display` text of each variant is what the dashboard shows the operator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("Session is not ready yet. Please wait.")]
    NotReady,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A signal request is already in flight.")]
    Busy,

    #[error("Unknown error calling the API. Make sure the backend is running. ({0})")]
    NetworkFailure(String),

    #[error("{message}")]
    HttpError { status: u16, message: String },

    #[error("Failed to parse the prediction response: {0}")]
    MalformedResponse(String),
}

impl SignalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::InvalidInput(_) => "invalid_input",
            Self::Busy => "busy",
            Self::NetworkFailure(_) => "network_failure",
            Self::HttpError { .. } => "http_error",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}
