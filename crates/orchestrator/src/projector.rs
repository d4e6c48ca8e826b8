//! Pure projection of signals and request state into display strings.
//!
//! Nothing here touches the network or the orchestrator; every function maps
//! a value to a value.

use chrono::{NaiveDate, NaiveDateTime};
use common::models::{
    CanonicalSignal, FeatureSnapshot, ModelStamp, NOT_AVAILABLE, RequestState, SessionState,
    SignalKind,
};

const SESSION_ID_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureView {
    pub sma10: String,
    pub rsi: String,
    pub vol20: String,
    pub sentiment: String,
    pub sentiment_ma: String,
    pub composite: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalView {
    pub ticker: String,
    pub is_buy: bool,
    pub signal_label: String,
    pub signal_badge: String,
    pub probability_percent: String,
    /// Width of the confidence bar, in `[0, 100]`.
    pub probability_bar: f64,
    pub features: FeatureView,
    pub model_date: String,
    pub model_time: String,
    pub threshold_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status_label: String,
    pub session_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Nothing fetched yet; carries the placeholder card.
    Empty(SignalView),
    Loading,
    Signal(SignalView),
    Error(String),
}

pub fn signal_label(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Buy => "Strong Buy",
        SignalKind::SellOrNeutral => "Sell / Neutral",
    }
}

pub fn probability_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub fn project_features(features: &FeatureSnapshot) -> FeatureView {
    FeatureView {
        sma10: fixed(features.sma10),
        rsi: fixed(features.rsi),
        vol20: fixed(features.vol20),
        sentiment: fixed(features.sentiment),
        sentiment_ma: fixed(features.sentiment_ma),
        composite: fixed(composite_score(features)),
    }
}

/// Blend of trend and momentum shown next to the raw features. Zero unless
/// both inputs are present.
pub fn composite_score(features: &FeatureSnapshot) -> f64 {
    if features.sma10 == 0.0 || features.rsi == 0.0 {
        return 0.0;
    }
    features.sma10 * 0.01 + features.rsi * 0.001
}

pub fn project_signal(signal: &CanonicalSignal) -> SignalView {
    let (model_date, model_time) = split_trained_at(&signal.stamp());

    SignalView {
        ticker: signal.ticker.clone(),
        is_buy: signal.signal == SignalKind::Buy,
        signal_label: signal_label(signal.signal).to_string(),
        signal_badge: format!("Signal: {}", signal.signal.flag()),
        probability_percent: probability_percent(signal.probability),
        probability_bar: (signal.probability * 100.0).clamp(0.0, 100.0),
        features: project_features(&signal.features),
        model_date,
        model_time,
        threshold_label: signal.threshold_label.clone(),
    }
}

pub fn project_state(state: &RequestState) -> DashboardView {
    match state {
        RequestState::Idle => DashboardView::Empty(project_signal(&placeholder_signal())),
        RequestState::Loading => DashboardView::Loading,
        RequestState::Success(signal) => DashboardView::Signal(project_signal(signal)),
        RequestState::Failed(err) => DashboardView::Error(err.to_string()),
    }
}

pub fn project_session(session: &SessionState) -> SessionView {
    let status_label = if session.ready { "Ready" } else { "Loading..." };
    let session_label = match &session.session_id {
        Some(id) if id.chars().count() > SESSION_ID_PREFIX_LEN => {
            let prefix: String = id.chars().take(SESSION_ID_PREFIX_LEN).collect();
            format!("{}...", prefix)
        }
        Some(id) => id.clone(),
        None => NOT_AVAILABLE.to_string(),
    };

    SessionView {
        status_label: status_label.to_string(),
        session_label,
    }
}

/// What the dashboard shows before any signal has been fetched.
pub fn placeholder_signal() -> CanonicalSignal {
    CanonicalSignal {
        ticker: "---".to_string(),
        probability: 0.5,
        signal: SignalKind::SellOrNeutral,
        features: FeatureSnapshot::placeholder(),
        model_timestamp: "--- | ---".to_string(),
        threshold_label: "---".to_string(),
    }
}

fn fixed(value: f64) -> String {
    format!("{:.4}", value)
}

fn split_trained_at(stamp: &ModelStamp) -> (String, String) {
    let Some(trained_at) = stamp.trained_at.as_deref() else {
        return (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string());
    };

    if let Ok(dt) = NaiveDateTime::parse_from_str(trained_at, "%Y-%m-%d %H:%M:%S") {
        return (
            dt.date().format("%Y-%m-%d").to_string(),
            dt.time().format("%H:%M:%S").to_string(),
        );
    }
    if let Ok(date) = NaiveDate::parse_from_str(trained_at, "%Y-%m-%d") {
        return (date.format("%Y-%m-%d").to_string(), NOT_AVAILABLE.to_string());
    }

    // Unknown layout: show it the way it came.
    let mut parts = trained_at.splitn(2, ' ');
    let date = parts.next().unwrap_or(NOT_AVAILABLE).to_string();
    let time = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string();
    (date, time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::SignalError;

    fn aapl() -> CanonicalSignal {
        CanonicalSignal {
            ticker: "AAPL".into(),
            probability: 0.83,
            signal: SignalKind::Buy,
            features: FeatureSnapshot {
                sma10: 160.2,
                rsi: 71.4,
                vol20: 0.016,
                sentiment: 0.7,
                sentiment_ma: 0.66,
            },
            model_timestamp: "2025-05-30 | 0.50".into(),
            threshold_label: "0.50".into(),
        }
    }

    #[test]
    fn test_project_buy_signal() {
        let view = project_signal(&aapl());

        assert_eq!(view.ticker, "AAPL");
        assert!(view.is_buy);
        assert_eq!(view.signal_label, "Strong Buy");
        assert_eq!(view.signal_badge, "Signal: 1");
        assert_eq!(view.probability_percent, "83.00%");
        assert!((view.probability_bar - 83.0).abs() < 1e-9);
        assert_eq!(view.model_date, "2025-05-30");
        assert_eq!(view.model_time, NOT_AVAILABLE);
        assert_eq!(view.threshold_label, "0.50");
    }

    #[test]
    fn test_features_are_fixed_precision() {
        let view = project_signal(&aapl()).features;

        assert_eq!(view.sma10, "160.2000");
        assert_eq!(view.rsi, "71.4000");
        assert_eq!(view.vol20, "0.0160");
        assert_eq!(view.sentiment, "0.7000");
        assert_eq!(view.sentiment_ma, "0.6600");
        // 160.2 * 0.01 + 71.4 * 0.001
        assert_eq!(view.composite, "1.6734");
    }

    #[test]
    fn test_composite_is_zero_without_inputs() {
        assert_eq!(composite_score(&FeatureSnapshot::placeholder()), 0.0);
        let partial = FeatureSnapshot {
            sma10: 100.0,
            ..FeatureSnapshot::placeholder()
        };
        assert_eq!(composite_score(&partial), 0.0);
    }

    #[test]
    fn test_timestamp_with_time_of_day() {
        let signal = CanonicalSignal {
            model_timestamp: "2025-05-30 14:05:00 | 0.55".into(),
            ..aapl()
        };
        let view = project_signal(&signal);
        assert_eq!(view.model_date, "2025-05-30");
        assert_eq!(view.model_time, "14:05:00");
    }

    #[test]
    fn test_timestamp_without_delimiter_falls_back() {
        let signal = CanonicalSignal {
            model_timestamp: "2025-05-30 00:00:00".into(),
            threshold_label: NOT_AVAILABLE.into(),
            ..aapl()
        };
        let view = project_signal(&signal);
        assert_eq!(view.model_date, NOT_AVAILABLE);
        assert_eq!(view.model_time, NOT_AVAILABLE);
        assert_eq!(view.threshold_label, NOT_AVAILABLE);
    }

    #[test]
    fn test_unrecognised_trained_at_is_split_on_space() {
        let signal = CanonicalSignal {
            model_timestamp: "May-30 nightly | 0.5".into(),
            ..aapl()
        };
        let view = project_signal(&signal);
        assert_eq!(view.model_date, "May-30");
        assert_eq!(view.model_time, "nightly");
    }

    #[test]
    fn test_sell_signal_label() {
        let signal = CanonicalSignal {
            probability: 0.1234,
            signal: SignalKind::SellOrNeutral,
            ..aapl()
        };
        let view = project_signal(&signal);
        assert!(!view.is_buy);
        assert_eq!(view.signal_label, "Sell / Neutral");
        assert_eq!(view.signal_badge, "Signal: 0");
        assert_eq!(view.probability_percent, "12.34%");
    }

    #[test]
    fn test_project_state_variants() {
        assert_eq!(
            project_state(&RequestState::Idle),
            DashboardView::Empty(project_signal(&placeholder_signal()))
        );
        assert_eq!(project_state(&RequestState::Loading), DashboardView::Loading);
        assert!(matches!(
            project_state(&RequestState::Success(aapl())),
            DashboardView::Signal(_)
        ));
        assert_eq!(
            project_state(&RequestState::Failed(SignalError::HttpError {
                status: 500,
                message: "model unavailable".into()
            })),
            DashboardView::Error("model unavailable".into())
        );
    }

    #[test]
    fn test_project_session() {
        let view = project_session(&SessionState {
            ready: true,
            session_id: Some("0f8fad5b-d9cb-469f-a165-70867728950e".into()),
        });
        assert_eq!(view.status_label, "Ready");
        assert_eq!(view.session_label, "0f8fad5b...");

        let view = project_session(&SessionState::default());
        assert_eq!(view.status_label, "Loading...");
        assert_eq!(view.session_label, NOT_AVAILABLE);

        let view = project_session(&SessionState {
            ready: true,
            session_id: Some("short".into()),
        });
        assert_eq!(view.session_label, "short");
    }

    #[test]
    fn test_placeholder_projection() {
        let view = project_signal(&placeholder_signal());
        assert_eq!(view.ticker, "---");
        assert_eq!(view.probability_percent, "50.00%");
        assert_eq!(view.features.composite, "0.0000");
        assert_eq!(view.model_date, "---");
        assert_eq!(view.model_time, NOT_AVAILABLE);
    }
}
