use async_trait::async_trait;
use common::{
    SignalError,
    models::{CanonicalSignal, SignalRequest},
};
use thiserror::Error;
use tracing::warn;

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP status.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<TransportError> for SignalError {
    fn from(err: TransportError) -> Self {
        SignalError::NetworkFailure(err.to_string())
    }
}

/// The prediction backend as seen by the orchestrator.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Posts the request to the endpoint matching its mode.
    async fn post_signal(&self, request: &SignalRequest) -> Result<RawReply, TransportError>;
}

/// A decoded wire response that can be turned into the display model.
pub trait RemoteResponse {
    fn to_canonical(&self) -> Result<CanonicalSignal, SignalError>;

    fn checked_probability(&self, proba: f64) -> Result<f64, SignalError> {
        if !proba.is_finite() {
            return Err(SignalError::MalformedResponse(format!(
                "probability {} is not a finite number",
                proba
            )));
        }
        let clamped = proba.clamp(0.0, 1.0);
        if clamped != proba {
            warn!("Probability {} out of range, clamped to {}", proba, clamped);
        }
        Ok(clamped)
    }
}
