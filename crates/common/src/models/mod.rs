pub mod request;
pub mod session;
pub mod signal;
pub mod state;

pub use request::{RequestMode, SignalRequest, SimpleInputs};
pub use session::SessionState;
pub use signal::{CanonicalSignal, FeatureSnapshot, ModelStamp, NOT_AVAILABLE, SignalKind};
pub use state::RequestState;
