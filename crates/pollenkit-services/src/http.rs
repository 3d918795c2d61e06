//! Shared HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::ServiceError;
use crate::retry::RetryConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport settings applied to every client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("pollenkit/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryConfig::default(),
        }
    }
}

pub(crate) fn build_client(options: &ClientOptions) -> Result<Client, ServiceError> {
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Parse a base URL so that relative joins append to its path instead of
/// replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ServiceError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-2xx response into `ServiceError::Api`.
pub(crate) async fn check_response(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    tracing::warn!("{} returned {}: {}", service, status, message);
    Err(ServiceError::Api {
        service,
        status: status.as_u16(),
        message,
    })
}

/// Decode a JSON body, reporting failures as `ServiceError::Parse`.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    response.json().await.map_err(|e| ServiceError::Parse {
        service,
        message: e.to_string(),
    })
}
