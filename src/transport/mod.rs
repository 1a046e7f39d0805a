// src/transport/mod.rs
//! Probe transport: plain HTTP fetches plus an optional headless-browser capability
//!
//! Every probe is written against [`Fetcher`]. Pages that only make sense
//! after JavaScript runs go through [`ProbeTransport::page_source`], which uses
//! the [`Renderer`] when one was acquired and falls back to a plain fetch
//! otherwise.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod browser;
pub mod http;

pub use browser::BrowserRenderer;
pub use http::HttpFetcher;

use crate::config::ScanConfig;

/// Network or rendering failure. Probes treat it as "not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("rendering {url} failed: {reason}")]
    Render { url: String, reason: String },

    #[error("no browser available to render {0}")]
    RenderUnavailable(String),
}

/// Raw result of a plain fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Plain HTTP GET
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// Headless-browser navigation returning the rendered page source
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, TransportError>;

    /// Release the underlying browser. Calling it twice is a no-op.
    async fn close(&self);
}

/// The transport handed to every stage of one scan
pub struct ProbeTransport {
    fetcher: Box<dyn Fetcher>,
    renderer: Option<Box<dyn Renderer>>,
}

impl ProbeTransport {
    pub fn new(fetcher: Box<dyn Fetcher>, renderer: Option<Box<dyn Renderer>>) -> Self {
        Self { fetcher, renderer }
    }

    /// Fetch-only transport
    pub fn fetch_only(fetcher: Box<dyn Fetcher>) -> Self {
        Self::new(fetcher, None)
    }

    /// Build the transport from config, trying to launch a browser when enabled.
    ///
    /// A browser that fails to launch degrades the transport to fetch-only.
    pub async fn acquire(config: &ScanConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;

        let renderer: Option<Box<dyn Renderer>> = if config.use_browser {
            match BrowserRenderer::launch(config).await {
                Ok(browser) => {
                    info!("Headless browser launched");
                    Some(Box::new(browser))
                }
                Err(e) => {
                    warn!("Browser automation unavailable: {}", e);
                    warn!("Rendered platform checks will fall back to plain fetches");
                    None
                }
            }
        } else {
            debug!("Browser automation disabled by configuration");
            None
        };

        Ok(Self::new(Box::new(fetcher), renderer))
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        self.fetcher.fetch(url).await
    }

    pub async fn render(&self, url: &str) -> Result<String, TransportError> {
        match &self.renderer {
            Some(renderer) => renderer.render(url).await,
            None => Err(TransportError::RenderUnavailable(url.to_string())),
        }
    }

    pub fn can_render(&self) -> bool {
        self.renderer.is_some()
    }

    /// Page source for a JavaScript-heavy page.
    ///
    /// Rendered when possible; otherwise fetched, in which case anything other
    /// than HTTP 200 yields `None`.
    pub async fn page_source(&self, url: &str) -> Result<Option<String>, TransportError> {
        if self.can_render() {
            return self.render(url).await.map(Some);
        }

        let response = self.fetch(url).await?;
        if response.status == 200 {
            Ok(Some(response.body))
        } else {
            Ok(None)
        }
    }

    /// Release the browser, if any. Consumes the transport so it happens once.
    pub async fn release(self) {
        if let Some(renderer) = self.renderer {
            renderer.close().await;
            debug!("Browser released");
        }
    }
}
