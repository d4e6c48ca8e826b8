use common::models::{RequestMode, SignalRequest};
use serde::Serialize;

/// JSON body posted to the prediction backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionPayload {
    Live {
        ticker: String,
    },
    Simple {
        ticker: String,
        price_change: f64,
        sentiment_score: f64,
    },
}

impl PredictionPayload {
    pub fn endpoint_path(mode: RequestMode) -> &'static str {
        match mode {
            RequestMode::Live => "predict/live",
            RequestMode::Simple => "predict/simple",
        }
    }
}

impl From<&SignalRequest> for PredictionPayload {
    fn from(request: &SignalRequest) -> Self {
        let ticker = request.ticker().to_string();
        match (request.mode(), request.simple_inputs()) {
            (RequestMode::Simple, Some(inputs)) => PredictionPayload::Simple {
                ticker,
                price_change: inputs.price_change,
                sentiment_score: inputs.sentiment_score,
            },
            // SignalRequest guarantees simple mode always has inputs.
            _ => PredictionPayload::Live { ticker },
        }
    }
}
