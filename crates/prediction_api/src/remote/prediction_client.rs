use std::time::Duration;

use async_trait::async_trait;
use common::models::SignalRequest;
use reqwest::Client;
use tracing::{debug, error, info};
use url::Url;

use crate::traits::{PredictionApi, RawReply, TransportError};

use super::payload::PredictionPayload;

#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: Url,
}

impl PredictionClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("signal_dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, request: &SignalRequest) -> Result<Url, TransportError> {
        Ok(self
            .base_url
            .join(PredictionPayload::endpoint_path(request.mode()))?)
    }
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn post_signal(&self, request: &SignalRequest) -> Result<RawReply, TransportError> {
        let url = self.endpoint(request)?;
        let payload = PredictionPayload::from(request);

        info!("Requesting {} signal for {}", request.mode(), request.ticker());
        debug!("POST {} {:?}", url, payload);

        let resp = self.client.post(url.clone()).json(&payload).send().await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        if !(200..300).contains(&status) {
            error!("Prediction API {} failed with {}: {}", url, status, body);
        }

        Ok(RawReply::new(status, body))
    }
}
