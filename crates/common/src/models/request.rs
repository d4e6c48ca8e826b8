use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

const MAX_TICKER_LEN: usize = 10;

/// Which backend endpoint (and payload shape) a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    #[default]
    Live,
    Simple,
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::Live => write!(f, "live"),
            RequestMode::Simple => write!(f, "simple"),
        }
    }
}

/// Operator-supplied inputs for the simple (demo) endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleInputs {
    pub price_change: f64,
    pub sentiment_score: f64,
}

/// A validated signal request. The ticker is always trimmed and uppercase.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRequest {
    ticker: String,
    mode: RequestMode,
    simple_inputs: Option<SimpleInputs>,
}

impl SignalRequest {
    pub fn new(
        ticker: &str,
        mode: RequestMode,
        simple_inputs: Option<SimpleInputs>,
    ) -> Result<Self, SignalError> {
        let ticker = normalize_ticker(ticker)?;

        let simple_inputs = match mode {
            // Live requests never carry simple inputs, even if the caller passed some.
            RequestMode::Live => None,
            RequestMode::Simple => {
                let inputs = simple_inputs.ok_or_else(|| {
                    SignalError::InvalidInput("simple mode requires price change and sentiment score".into())
                })?;
                if !inputs.price_change.is_finite() || !inputs.sentiment_score.is_finite() {
                    return Err(SignalError::InvalidInput(
                        "simple inputs must be finite numbers".into(),
                    ));
                }
                Some(inputs)
            }
        };

        Ok(Self {
            ticker,
            mode,
            simple_inputs,
        })
    }

    pub fn live(ticker: &str) -> Result<Self, SignalError> {
        Self::new(ticker, RequestMode::Live, None)
    }

    pub fn simple(ticker: &str, price_change: f64, sentiment_score: f64) -> Result<Self, SignalError> {
        Self::new(
            ticker,
            RequestMode::Simple,
            Some(SimpleInputs {
                price_change,
                sentiment_score,
            }),
        )
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn simple_inputs(&self) -> Option<SimpleInputs> {
        self.simple_inputs
    }
}

fn normalize_ticker(raw: &str) -> Result<String, SignalError> {
    let ticker = raw.trim().to_uppercase();

    if ticker.is_empty() {
        return Err(SignalError::InvalidInput("ticker must not be empty".into()));
    }
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(SignalError::InvalidInput(format!(
            "ticker {:?} is longer than {} characters",
            ticker, MAX_TICKER_LEN
        )));
    }
    if let Some(bad) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(SignalError::InvalidInput(format!(
            "ticker {:?} contains unsupported character {:?}",
            ticker, bad
        )));
    }

    Ok(ticker)
}
