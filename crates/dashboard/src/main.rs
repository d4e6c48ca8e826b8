use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::{self, BufReader};
use tracing::{debug, info};

use common::config::AppConfig;
use common::logger;
use orchestrator::RequestOrchestrator;
use prediction_api::PredictionClient;
use session::{IdentityProvider, RestIdentityProvider, SessionBootstrapper};

use crate::services::console_service::ConsoleService;

mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("System starting up...");

    let config = AppConfig::from_env()?;
    info!("Prediction API: {}", config.api_base_url);

    let identity_timeout = config.http_timeout;
    let mut bootstrapper = SessionBootstrapper::start(
        config.identity_config.as_deref(),
        config.initial_auth_token.clone(),
        move |identity| {
            let provider = RestIdentityProvider::new(identity, identity_timeout)?;
            Ok(Arc::new(provider) as Arc<dyn IdentityProvider>)
        },
    );

    let client = PredictionClient::new(config.api_base_url.clone(), config.http_timeout)?;
    let orchestrator = Arc::new(RequestOrchestrator::new(
        Arc::new(client),
        bootstrapper.handle(),
    ));

    let console = ConsoleService::new(orchestrator, config.app_id.clone());
    let result = console
        .start(BufReader::new(io::stdin()), io::stdout())
        .await;

    bootstrapper.shutdown().await;
    info!("Dashboard stopped.");
    result
}
