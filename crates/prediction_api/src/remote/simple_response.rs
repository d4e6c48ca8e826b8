use common::{
    SignalError,
    models::{CanonicalSignal, FeatureSnapshot, NOT_AVAILABLE, SignalKind},
};
use serde::Deserialize;

use crate::{normalizer::SIMPLE_MODE_TIMESTAMP, traits::RemoteResponse};

#[derive(Debug, Deserialize)]
pub struct SimpleSignalResponse {
    pub ticker: String,
    pub proba: f64,
    pub signal: SignalFlag,
}

/// The backend's buy flag: `0`/`1`, or a JSON boolean.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum SignalFlag {
    Bool(bool),
    Number(f64),
}

impl SignalFlag {
    pub fn to_kind(self) -> Result<SignalKind, SignalError> {
        match self {
            SignalFlag::Bool(true) => Ok(SignalKind::Buy),
            SignalFlag::Bool(false) => Ok(SignalKind::SellOrNeutral),
            SignalFlag::Number(n) if n == 1.0 => Ok(SignalKind::from_flag(1)),
            SignalFlag::Number(n) if n == 0.0 => Ok(SignalKind::from_flag(0)),
            SignalFlag::Number(n) => Err(SignalError::MalformedResponse(format!(
                "signal must be 0 or 1, got {}",
                n
            ))),
        }
    }
}

impl RemoteResponse for SimpleSignalResponse {
    fn to_canonical(&self) -> Result<CanonicalSignal, SignalError> {
        Ok(CanonicalSignal {
            ticker: self.ticker.clone(),
            probability: self.checked_probability(self.proba)?,
            signal: self.signal.to_kind()?,
            features: FeatureSnapshot::placeholder(),
            model_timestamp: SIMPLE_MODE_TIMESTAMP.to_string(),
            threshold_label: NOT_AVAILABLE.to_string(),
        })
    }
}
