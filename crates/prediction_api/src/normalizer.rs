use common::{
    SignalError,
    models::{CanonicalSignal, RequestMode},
};

use crate::{
    remote::{LiveSignalResponse, SimpleSignalResponse},
    traits::RemoteResponse,
};

/// Timestamp recorded for simple-mode results, which come from no trained model.
/// Carries no `|` so every derived timestamp field reads as not available.
pub const SIMPLE_MODE_TIMESTAMP: &str = "simple mode (demo)";

/// A 2xx body decoded according to the mode that requested it.
#[derive(Debug)]
pub enum PredictionResponse {
    Live(LiveSignalResponse),
    Simple(SimpleSignalResponse),
}

impl PredictionResponse {
    pub fn parse(mode: RequestMode, raw_body: &str) -> Result<Self, SignalError> {
        let parsed = match mode {
            RequestMode::Live => serde_json::from_str(raw_body).map(PredictionResponse::Live),
            RequestMode::Simple => serde_json::from_str(raw_body).map(PredictionResponse::Simple),
        };
        parsed.map_err(|e| SignalError::MalformedResponse(e.to_string()))
    }
}

impl RemoteResponse for PredictionResponse {
    fn to_canonical(&self) -> Result<CanonicalSignal, SignalError> {
        match self {
            PredictionResponse::Live(resp) => resp.to_canonical(),
            PredictionResponse::Simple(resp) => resp.to_canonical(),
        }
    }
}

pub fn normalize(mode: RequestMode, raw_body: &str) -> Result<CanonicalSignal, SignalError> {
    PredictionResponse::parse(mode, raw_body)?.to_canonical()
}
