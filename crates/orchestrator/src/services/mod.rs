pub mod request_orchestrator;
