use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use common::{
    SignalError,
    models::{CanonicalSignal, RequestMode, RequestState, SignalRequest, SimpleInputs},
};
use prediction_api::{PredictionApi, failure_message, normalize};
use session::SessionHandle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Gates, dispatches and sequences signal requests. Sole owner of `RequestState`.
///
/// At most one request is in flight: `submit` while `Loading` is rejected with
/// [`SignalError::Busy`] and leaves the running request alone. Every dispatch is
/// tagged with a sequence number and only the latest one may commit its outcome.
/// A request whose future is dropped before it settles is abandoned and the state
/// returns to `Idle`.
pub struct RequestOrchestrator {
    api: Arc<dyn PredictionApi>,
    session: SessionHandle,
    state_tx: watch::Sender<RequestState>,
    latest_seq: AtomicU64,
}

impl RequestOrchestrator {
    pub fn new(api: Arc<dyn PredictionApi>, session: SessionHandle) -> Self {
        let (state_tx, _) = watch::channel(RequestState::Idle);
        Self {
            api,
            session,
            state_tx,
            latest_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state_tx.borrow().clone()
    }

    /// Read-only view of every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state_tx.subscribe()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn submit(
        &self,
        ticker: &str,
        mode: RequestMode,
        simple_inputs: Option<SimpleInputs>,
    ) -> Result<CanonicalSignal, SignalError> {
        if !self.session.is_ready() {
            warn!("Rejecting {} request for {:?}: session not ready", mode, ticker);
            return Err(self.fail_before_dispatch(SignalError::NotReady));
        }

        let flight = self.begin().inspect_err(|_| {
            debug!("Rejecting {} request for {:?}: already loading", mode, ticker);
        })?;

        let outcome = self.dispatch(flight.seq, ticker, mode, simple_inputs).await;
        flight.settle(outcome)
    }

    /// Returns a settled machine to `Idle`.
    pub fn reset(&self) -> Result<(), SignalError> {
        let mut busy = false;
        self.state_tx.send_if_modified(|state| match state {
            RequestState::Loading => {
                busy = true;
                false
            }
            RequestState::Idle => false,
            RequestState::Success(_) | RequestState::Failed(_) => {
                *state = RequestState::Idle;
                true
            }
        });

        if busy { Err(SignalError::Busy) } else { Ok(()) }
    }

    async fn dispatch(
        &self,
        seq: u64,
        ticker: &str,
        mode: RequestMode,
        simple_inputs: Option<SimpleInputs>,
    ) -> Result<CanonicalSignal, SignalError> {
        let request = SignalRequest::new(ticker, mode, simple_inputs)?;
        info!(
            "Dispatching request #{}: {} ({})",
            seq,
            request.ticker(),
            request.mode()
        );

        let reply = self.api.post_signal(&request).await?;

        if !reply.is_success() {
            return Err(SignalError::HttpError {
                status: reply.status,
                message: failure_message(reply.status, &reply.body),
            });
        }

        normalize(request.mode(), &reply.body)
    }

    /// Moves to `Loading` and issues a sequence number, unless already loading.
    fn begin(&self) -> Result<InFlight<'_>, SignalError> {
        let mut issued = None;
        self.state_tx.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = RequestState::Loading;
            issued = Some(self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });

        issued
            .map(|seq| InFlight {
                orchestrator: self,
                seq,
                settled: false,
            })
            .ok_or(SignalError::Busy)
    }

    /// Commits `outcome` if `seq` is still the latest request. Returns whether it did.
    fn commit(&self, seq: u64, outcome: &Result<CanonicalSignal, SignalError>) -> bool {
        let committed = self.state_tx.send_if_modified(|state| {
            if self.latest_seq.load(Ordering::SeqCst) != seq {
                return false;
            }
            *state = match outcome {
                Ok(signal) => RequestState::Success(signal.clone()),
                Err(err) => RequestState::Failed(err.clone()),
            };
            true
        });

        match (committed, outcome) {
            (true, Ok(signal)) => info!(
                "Request #{} succeeded: {} p={:.4} {:?}",
                seq, signal.ticker, signal.probability, signal.signal
            ),
            (true, Err(err)) => error!("Request #{} failed ({}): {}", seq, err.kind(), err),
            (false, _) => warn!(
                "Discarding stale response for request #{} (latest is #{})",
                seq,
                self.latest_seq.load(Ordering::SeqCst)
            ),
        }
        committed
    }

    fn abandon(&self, seq: u64) {
        let abandoned = self.state_tx.send_if_modified(|state| {
            if self.latest_seq.load(Ordering::SeqCst) != seq || !state.is_loading() {
                return false;
            }
            // Any response still carrying `seq` is now stale.
            self.latest_seq.fetch_add(1, Ordering::SeqCst);
            *state = RequestState::Idle;
            true
        });
        if abandoned {
            warn!("Request #{} abandoned before it settled", seq);
        }
    }

    fn fail_before_dispatch(&self, err: SignalError) -> SignalError {
        self.state_tx.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = RequestState::Failed(err.clone());
            true
        });
        err
    }
}

/// A dispatched request. Dropping it unsettled abandons the request.
struct InFlight<'a> {
    orchestrator: &'a RequestOrchestrator,
    seq: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(
        mut self,
        outcome: Result<CanonicalSignal, SignalError>,
    ) -> Result<CanonicalSignal, SignalError> {
        self.settled = true;
        self.orchestrator.commit(self.seq, &outcome);
        outcome
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.orchestrator.abandon(self.seq);
        }
    }
}
