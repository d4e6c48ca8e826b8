use common::{
    SignalError,
    models::{CanonicalSignal, FeatureSnapshot, ModelStamp},
};
use serde::Deserialize;

use crate::traits::RemoteResponse;

use super::simple_response::SignalFlag;

#[derive(Debug, Deserialize)]
pub struct LiveSignalResponse {
    pub ticker: String,
    pub proba: f64,
    pub signal: SignalFlag,
    pub calculated_features: CalculatedFeatures,
    pub model_timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct CalculatedFeatures {
    pub sma_10: f64,
    pub rsi: f64,
    pub vol_20: f64,
    pub sentiment: f64,
    pub sentiment_ma: f64,
}

impl From<&CalculatedFeatures> for FeatureSnapshot {
    fn from(f: &CalculatedFeatures) -> Self {
        FeatureSnapshot {
            sma10: f.sma_10,
            rsi: f.rsi,
            vol20: f.vol_20,
            sentiment: f.sentiment,
            sentiment_ma: f.sentiment_ma,
        }
    }
}

impl RemoteResponse for LiveSignalResponse {
    fn to_canonical(&self) -> Result<CanonicalSignal, SignalError> {
        Ok(CanonicalSignal {
            ticker: self.ticker.clone(),
            probability: self.checked_probability(self.proba)?,
            signal: self.signal.to_kind()?,
            features: FeatureSnapshot::from(&self.calculated_features),
            model_timestamp: self.model_timestamp.clone(),
            threshold_label: ModelStamp::parse(&self.model_timestamp).threshold_label(),
        })
    }
}
