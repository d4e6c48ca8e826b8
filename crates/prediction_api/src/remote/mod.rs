pub mod error_response;
pub mod live_response;
pub mod payload;
pub mod prediction_client;
pub mod simple_response;

pub use error_response::failure_message;
pub use live_response::LiveSignalResponse;
pub use payload::PredictionPayload;
pub use prediction_client::PredictionClient;
pub use simple_response::SimpleSignalResponse;
