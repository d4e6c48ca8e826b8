pub mod normalizer;
pub mod remote;
pub mod traits;

pub use normalizer::{PredictionResponse, SIMPLE_MODE_TIMESTAMP, normalize};
pub use remote::{PredictionClient, failure_message};
pub use traits::{PredictionApi, RawReply, TransportError};
