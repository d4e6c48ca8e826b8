use serde::{Deserialize, Serialize};

/// Shown wherever a derived value could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub sma10: f64,
    pub rsi: f64,
    pub vol20: f64,
    pub sentiment: f64,
    pub sentiment_ma: f64,
}

impl FeatureSnapshot {
    /// Stand-in for responses that carry no feature snapshot (simple mode).
    pub const fn placeholder() -> Self {
        Self {
            sma10: 0.0,
            rsi: 0.0,
            vol20: 0.0,
            sentiment: 0.0,
            sentiment_ma: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    SellOrNeutral,
}

impl SignalKind {
    /// `Buy` iff the backend flag is exactly 1.
    pub fn from_flag(flag: u8) -> Self {
        if flag == 1 {
            SignalKind::Buy
        } else {
            SignalKind::SellOrNeutral
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            SignalKind::Buy => 1,
            SignalKind::SellOrNeutral => 0,
        }
    }
}

/// The one shape every response is normalized into before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSignal {
    pub ticker: String,
    /// Always within `[0, 1]`.
    pub probability: f64,
    pub signal: SignalKind,
    pub features: FeatureSnapshot,
    pub model_timestamp: String,
    pub threshold_label: String,
}

impl CanonicalSignal {
    pub fn stamp(&self) -> ModelStamp {
        ModelStamp::parse(&self.model_timestamp)
    }
}

/// The two halves of a `"<trained-at> | <threshold>"` model timestamp.
///
/// Parsing never fails: a stamp without the delimiter yields neither part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStamp {
    pub trained_at: Option<String>,
    pub threshold: Option<String>,
}

impl ModelStamp {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('|') {
            Some((trained_at, threshold)) => Self {
                trained_at: non_empty(trained_at),
                threshold: non_empty(threshold),
            },
            None => Self {
                trained_at: None,
                threshold: None,
            },
        }
    }

    pub fn threshold_label(&self) -> String {
        self.threshold
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn non_empty(part: &str) -> Option<String> {
    let part = part.trim();
    (!part.is_empty()).then(|| part.to_string())
}
