pub mod projector;
pub mod services;

pub use projector::{DashboardView, FeatureView, SessionView, SignalView};
pub use services::request_orchestrator::RequestOrchestrator;
