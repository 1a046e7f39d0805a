// src/breach.rs
//! Breach database lookup (Have I Been Pwned v3 API)

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BreachConfig, ScanConfig};
use crate::report::BreachRecord;

#[derive(Debug, Error)]
pub enum BreachError {
    #[error("breach API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("breach API returned HTTP {0}")]
    Status(u16),

    #[error("breach API response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can list known breaches for an email address
#[async_trait]
pub trait BreachLookup: Send + Sync {
    async fn lookup(&self, email: &str) -> Result<Vec<BreachRecord>, BreachError>;
}

/// HIBP API client
pub struct HibpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    delay: Duration,
}

impl HibpClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        user_agent: &str,
        timeout: Duration,
        delay: Duration,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            delay,
        })
    }

    pub fn from_config(breach: &BreachConfig, scan: &ScanConfig) -> anyhow::Result<Self> {
        Self::new(
            breach.api_url.clone(),
            breach.api_key.clone(),
            &scan.user_agent,
            Duration::from_secs(scan.request_timeout_secs),
            Duration::from_millis(scan.request_delay_ms),
        )
    }
}

#[async_trait]
impl BreachLookup for HibpClient {
    async fn lookup(&self, email: &str) -> Result<Vec<BreachRecord>, BreachError> {
        let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        let url = format!(
            "{}/breachedaccount/{}?truncateResponse=false",
            self.base_url, encoded
        );

        debug!("Looking up breaches for {}", email);

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header("hibp-api-key", key);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = request.send().await?;

        match response.status() {
            // HIBP answers 404 for an address with no known breaches
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let body = response.text().await?;
                let records: Vec<BreachRecord> = serde_json::from_str(&body)?;
                info!("Found {} breaches for {}", records.len(), email);
                Ok(records)
            }
            status => Err(BreachError::Status(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> HibpClient {
        HibpClient::new(
            server.uri(),
            key.map(str::to_string),
            "footprint-test",
            Duration::from_secs(5),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breachedaccount/jane%40example.com"))
            .and(header("hibp-api-key", "k3y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"Name": "Adobe", "Domain": "adobe.com"},
                {"Name": "Canva", "DataClasses": ["Email addresses"]}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = client(&server, Some("k3y"))
            .lookup("jane@example.com")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Adobe");
        assert_eq!(records[1].data_classes, vec!["Email addresses"]);
    }

    #[tokio::test]
    async fn test_not_found_means_no_breaches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let records = client(&server, None).lookup("jane@example.com").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server, None).lookup("jane@example.com").await;
        assert!(matches!(result, Err(BreachError::Status(401))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"unexpected\": true}"))
            .mount(&server)
            .await;

        let result = client(&server, None).lookup("jane@example.com").await;
        assert!(matches!(result, Err(BreachError::Parse(_))));
    }

    #[tokio::test]
    async fn test_politeness_delay_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = HibpClient::new(
            server.uri(),
            None,
            "footprint-test",
            Duration::from_secs(5),
            Duration::from_millis(100),
        )
        .unwrap();

        let start = std::time::Instant::now();
        assert!(client.lookup("jane@example.com").await.unwrap().is_empty());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
