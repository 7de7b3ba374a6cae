//! Homework status endpoint client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::config::PracticumConfig;
use crate::error::{ConfigError, FetchError, truncate_text};

/// Raw decoded body of the status endpoint. Shape is checked by the validator.
pub type PollResponse = Value;

/// Source of homework status snapshots
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch all homework updates since `since` (unix seconds; `None` means now).
    async fn fetch(&self, since: Option<i64>) -> Result<PollResponse, FetchError>;
}

/// Practicum API client
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(token: impl Into<String>, config: &PracticumConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, since: Option<i64>) -> Result<PollResponse, FetchError> {
        let from_date = since.unwrap_or_else(|| chrono::Utc::now().timestamp());

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                log::error!("Homework endpoint unreachable: {}", e);
                FetchError::from(e)
            })?;

        let status = response.status();
        log::info!("Requested homework statuses from_date={}, API status code: {}", from_date, status.as_u16());

        if !status.is_success() {
            let body = truncate_text(&response.text().await.unwrap_or_default());
            log::error!("Homework endpoint returned status {}: {}", status.as_u16(), body);
            let err = FetchError::Status {
                status: status.as_u16(),
                body,
            };
            return Err(err);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            log::error!("Homework endpoint returned invalid JSON: {}", e);
            FetchError::Body(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = PracticumConfig {
            endpoint: "http://localhost:1234/statuses/".to_string(),
            timeout_secs: 5,
        };
        let client = PracticumClient::new("token", &config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1234/statuses/");
    }
}
