use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use url::Url;

use super::{AuthUser, IdentityConfig, IdentityError, IdentityProvider};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomTokenRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomTokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<SignUpResponse>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider speaking the Identity Toolkit REST API.
pub struct RestIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    user_tx: broadcast::Sender<Option<AuthUser>>,
    current: Mutex<Option<AuthUser>>,
}

impl RestIdentityProvider {
    pub fn new(config: &IdentityConfig, timeout: Duration) -> Result<Self, IdentityError> {
        Self::with_base_url(config, Url::parse(IDENTITY_TOOLKIT_URL)?, timeout)
    }

    pub fn with_base_url(
        config: &IdentityConfig,
        base_url: Url,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(timeout).build()?;
        let (user_tx, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            user_tx,
            current: Mutex::new(None),
        })
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // "./" keeps the colon in "accounts:..." from being read as a URL scheme.
        let mut url = self.base_url.join(&format!("./{}", method))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        debug!("Identity call {}", method);
        let resp = self.client.post(url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!("Identity call {} failed with {}: {}", method, status, message);
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<R>().await?)
    }

    fn publish(&self, user: AuthUser) -> AuthUser {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(user.clone());
        }
        // No subscribers is fine; `subscribe` replays the current user.
        let _ = self.user_tx.send(Some(user.clone()));
        user
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, IdentityError> {
        let signed_in: CustomTokenResponse = self
            .call(
                "accounts:signInWithCustomToken",
                &CustomTokenRequest {
                    token,
                    return_secure_token: true,
                },
            )
            .await?;

        let lookup: LookupResponse = self
            .call(
                "accounts:lookup",
                &LookupRequest {
                    id_token: &signed_in.id_token,
                },
            )
            .await?;

        let uid = lookup
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or(IdentityError::MissingUser)?;

        info!("Signed in with custom token");
        Ok(self.publish(AuthUser { uid }))
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, IdentityError> {
        let resp: SignUpResponse = self
            .call(
                "accounts:signUp",
                &SignUpRequest {
                    return_secure_token: true,
                },
            )
            .await?;

        info!("Signed in anonymously");
        Ok(self.publish(AuthUser { uid: resp.local_id }))
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<AuthUser>> {
        let rx = self.user_tx.subscribe();
        // Broadcast has no per-receiver send, so existing receivers see the replay too.
        let current = self.current.lock().map(|c| c.clone()).unwrap_or(None);
        let _ = self.user_tx.send(current);
        rx
    }
}
