// HTTP client for the RapidAPI ytstream metadata endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::ApiConfig;
use super::errors::{LookupError, LookupResult};
use super::models::VideoId;
use super::traits::MetadataSource;

/// Optional error body; only `message` is relied upon
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Single-request client: no retry, credential headers on every call
pub struct YtStreamClient {
    http: Client,
    config: ApiConfig,
}

impl YtStreamClient {
    pub fn new(config: ApiConfig) -> LookupResult<Self> {
        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| LookupError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| LookupError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> LookupResult<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl MetadataSource for YtStreamClient {
    fn name(&self) -> &'static str {
        "ytstream"
    }

    async fn fetch(&self, id: &VideoId) -> Result<serde_json::Value, LookupError> {
        let url = self.config.endpoint();
        debug!(video_id = %id, endpoint = %url, "Requesting video metadata");

        let response = self
            .http
            .get(&url)
            .query(&[("id", id.as_str())])
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let server_message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            warn!(
                video_id = %id,
                status = status.as_u16(),
                server_message = server_message.as_deref().unwrap_or(""),
                "Metadata request rejected"
            );
            return Err(LookupError::http_status(status.as_u16(), server_message));
        }

        let json: serde_json::Value = serde_json::from_str(&body)?;
        debug!(video_id = %id, bytes = body.len(), "Metadata received");
        Ok(json)
    }
}
