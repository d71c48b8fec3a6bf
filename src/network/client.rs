use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use std::{collections::BTreeMap, time::Duration};

use crate::config::ConfigError;

/// Transport settings shared by every HTTP provider. Immutable once a provider is built.
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
    /// Transient retries against the same endpoint before failing over.
    #[serde(default)]
    pub number_of_retries: u32,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            number_of_retries: 0,
            headers: BTreeMap::new(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

pub fn build_http_client(config: &ClientConfig) -> Result<ClientWithMiddleware, ConfigError> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    let min_retry_interval = Duration::from_millis(500);
    let max_retry_interval = Duration::from_secs(10);
    let retry_policy = reqwest_retry::policies::ExponentialBackoff::builder()
        .retry_bounds(min_retry_interval, max_retry_interval)
        .build_with_max_retries(config.number_of_retries);
    let client = reqwest_middleware::ClientBuilder::new(
        reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?,
    )
    .with(reqwest_retry::RetryTransientMiddleware::new_with_policy(
        retry_policy,
    ))
    .build();
    Ok(client)
}
