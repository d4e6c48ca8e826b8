use std::sync::Arc;

use common::models::{RequestMode, SimpleInputs};
use orchestrator::{
    DashboardView, RequestOrchestrator, SignalView,
    projector::{project_session, project_state},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

const HELP: &str = "\
Commands:
  <TICKER>                                   live signal, e.g. AAPL
  simple <TICKER> <price_change> <sentiment> simple (demo) signal
  reset                                      clear the last result
  help                                       show this text
  quit                                       exit
";

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Live(String),
    Simple { ticker: String, inputs: SimpleInputs },
    Reset,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] => Ok(Command::Empty),
        [cmd] if cmd.eq_ignore_ascii_case("quit") || cmd.eq_ignore_ascii_case("exit") => {
            Ok(Command::Quit)
        }
        [cmd] if cmd.eq_ignore_ascii_case("reset") => Ok(Command::Reset),
        [cmd] if cmd.eq_ignore_ascii_case("help") => Ok(Command::Help),
        [cmd, ticker, price_change, sentiment] if cmd.eq_ignore_ascii_case("simple") => {
            let price_change = price_change
                .parse::<f64>()
                .map_err(|_| format!("price_change {:?} is not a number", price_change))?;
            let sentiment_score = sentiment
                .parse::<f64>()
                .map_err(|_| format!("sentiment {:?} is not a number", sentiment))?;
            Ok(Command::Simple {
                ticker: ticker.to_string(),
                inputs: SimpleInputs {
                    price_change,
                    sentiment_score,
                },
            })
        }
        [cmd, ..] if cmd.eq_ignore_ascii_case("simple") => {
            Err("usage: simple <TICKER> <price_change> <sentiment>".to_string())
        }
        [ticker] => Ok(Command::Live(ticker.to_string())),
        _ => Err(format!("unknown command {:?}, type 'help'", line.trim())),
    }
}

/// Line-oriented front end over the orchestrator.
pub struct ConsoleService {
    orchestrator: Arc<RequestOrchestrator>,
    app_id: String,
}

impl ConsoleService {
    pub fn new(orchestrator: Arc<RequestOrchestrator>, app_id: String) -> Self {
        Self {
            orchestrator,
            app_id,
        }
    }

    pub async fn start<R, W>(self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Waiting for session...");
        let session = self.orchestrator.session().wait_ready().await;
        let session_view = project_session(&session);
        output
            .write_all(
                format!(
                    "NewsSentiment Pro [{}] Env: {} | UID: {}\n{}",
                    self.app_id, session_view.status_label, session_view.session_label, HELP
                )
                .as_bytes(),
            )
            .await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(msg) => {
                    output.write_all(format!("{}\n", msg).as_bytes()).await?;
                    continue;
                }
            };
            debug!("Console command: {:?}", command);

            match command {
                Command::Quit => break,
                Command::Empty => continue,
                Command::Help => {
                    output.write_all(HELP.as_bytes()).await?;
                    continue;
                }
                Command::Reset => {
                    if let Err(e) = self.orchestrator.reset() {
                        warn!("Reset refused: {}", e);
                    }
                }
                Command::Live(ticker) => {
                    // Failures are committed to the state rendered below, except Busy.
                    if let Err(e) = self
                        .orchestrator
                        .submit(&ticker, RequestMode::Live, None)
                        .await
                    {
                        warn!("Live request for {:?} failed: {}", ticker, e);
                    }
                }
                Command::Simple { ticker, inputs } => {
                    if let Err(e) = self
                        .orchestrator
                        .submit(&ticker, RequestMode::Simple, Some(inputs))
                        .await
                    {
                        warn!("Simple request for {:?} failed: {}", ticker, e);
                    }
                }
            }

            let view = project_state(&self.orchestrator.state());
            output.write_all(render(&view).as_bytes()).await?;
            output.flush().await?;
        }

        Ok(())
    }
}

pub fn render(view: &DashboardView) -> String {
    match view {
        DashboardView::Empty(placeholder) => format!(
            "Pick a ticker and run a live prediction.\n{}",
            render_signal(placeholder)
        ),
        DashboardView::Loading => "Fetching live data and analysing the signal...\n".to_string(),
        DashboardView::Error(message) => format!("Error: {}\n", message),
        DashboardView::Signal(signal) => render_signal(signal),
    }
}

fn render_signal(view: &SignalView) -> String {
    let filled = ((view.probability_bar / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled.min(BAR_WIDTH)),
        "-".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
    );
    let f = &view.features;

    format!(
        "{ticker}  {label}  ({badge})\n\
         Confidence {pct} [{bar}]\n\
         SMA(10) {sma}  RSI(14) {rsi}  Vol(20) {vol}\n\
         Sentiment {sent}  Sentiment MA {sent_ma}  Composite {comp}\n\
         Model date {date}  time {time}  threshold {threshold}\n",
        ticker = view.ticker,
        label = view.signal_label,
        badge = view.signal_badge,
        pct = view.probability_percent,
        bar = bar,
        sma = f.sma10,
        rsi = f.rsi,
        vol = f.vol20,
        sent = f.sentiment,
        sent_ma = f.sentiment_ma,
        comp = f.composite,
        date = view.model_date,
        time = view.model_time,
        threshold = view.threshold_label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::{RequestState, SessionState, SignalRequest};
    use prediction_api::{PredictionApi, RawReply, TransportError};
    use session::SessionHandle;
    use std::sync::Mutex;
    use tokio::io::BufReader;

    /// Replies by mode and remembers every ticker it was asked about.
    #[derive(Default)]
    struct ScriptedApi {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PredictionApi for ScriptedApi {
        async fn post_signal(&self, request: &SignalRequest) -> Result<RawReply, TransportError> {
            self.seen.lock().unwrap().push(request.ticker().to_string());
            let body = match request.mode() {
                RequestMode::Live => format!(
                    r#"{{"ticker":"{}","proba":0.83,"signal":1,"calculated_features":{{"sma_10":160.2,"rsi":71.4,"vol_20":0.016,"sentiment":0.7,"sentiment_ma":0.66}},"model_timestamp":"2025-05-30 | 0.50"}}"#,
                    request.ticker()
                ),
                RequestMode::Simple => return Ok(RawReply::new(500, r#"{"detail":"model unavailable"}"#)),
            };
            Ok(RawReply::new(200, body))
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Ok(Command::Empty));
        assert_eq!(parse_command("aapl"), Ok(Command::Live("aapl".into())));
        assert_eq!(parse_command("QUIT"), Ok(Command::Quit));
        assert_eq!(parse_command("reset"), Ok(Command::Reset));
        assert_eq!(
            parse_command("simple msft 0.02 -0.5"),
            Ok(Command::Simple {
                ticker: "msft".into(),
                inputs: SimpleInputs {
                    price_change: 0.02,
                    sentiment_score: -0.5
                }
            })
        );
        assert!(parse_command("simple msft x 0.1").is_err());
        assert!(parse_command("simple msft").is_err());
        assert!(parse_command("aapl msft").is_err());
    }

    #[test]
    fn test_render_states() {
        let idle = render(&project_state(&RequestState::Idle));
        assert!(idle.contains("Pick a ticker"), "{}", idle);
        assert!(idle.contains("---  Sell / Neutral  (Signal: 0)"), "{}", idle);
        assert!(idle.contains("Confidence 50.00% [##########----------]"), "{}", idle);
        assert!(idle.contains("Model date ---  time N/A  threshold ---"), "{}", idle);
        assert_eq!(
            render(&DashboardView::Error("model unavailable".into())),
            "Error: model unavailable\n"
        );
    }

    #[tokio::test]
    async fn test_console_session() {
        let api = Arc::new(ScriptedApi::default());
        let session = SessionHandle::fixed(SessionState {
            ready: true,
            session_id: Some("0f8fad5b-d9cb-469f-a165-70867728950e".into()),
        });
        let orchestrator = Arc::new(RequestOrchestrator::new(api.clone(), session));
        let console = ConsoleService::new(orchestrator, "test-app".into());

        let script = "aapl\nsimple msft 0.1 0.2\nreset\nquit\nnvda\n";
        let mut output = Vec::new();
        console
            .start(BufReader::new(script.as_bytes()), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("UID: 0f8fad5b..."), "{}", text);
        assert!(text.contains("AAPL  Strong Buy  (Signal: 1)"), "{}", text);
        assert!(text.contains("Confidence 83.00% [#################---]"), "{}", text);
        assert!(text.contains("Error: model unavailable"), "{}", text);
        // `reset` brings back the placeholder card.
        assert!(text.contains("Pick a ticker"), "{}", text);
        assert!(text.contains("---  Sell / Neutral  (Signal: 0)"), "{}", text);
        // Nothing after `quit` is processed.
        assert_eq!(*api.seen.lock().unwrap(), vec!["AAPL", "MSFT"]);
    }
}
