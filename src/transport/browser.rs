// src/transport/browser.rs
//! Headless Chromium renderer

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Renderer, TransportError};
use crate::config::ScanConfig;

/// A single browser instance owned by one scan
pub struct BrowserRenderer {
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    settle: Duration,
}

impl BrowserRenderer {
    /// Launch headless Chromium. Fails when no usable browser is installed.
    pub async fn launch(config: &ScanConfig) -> Result<Self, TransportError> {
        let launch_failed = |reason: String| TransportError::Render {
            url: "about:blank".to_string(),
            reason,
        };

        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", config.user_agent))
            .request_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(launch_failed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| launch_failed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
            settle: Duration::from_millis(config.render_wait_ms),
        })
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<String, TransportError> {
        let failed = |e: chromiumoxide::error::CdpError| TransportError::Render {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let guard = self.browser.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| TransportError::RenderUnavailable(url.to_string()))?;

        let page = browser.new_page(url).await.map_err(failed)?;
        page.wait_for_navigation().await.map_err(failed)?;
        tokio::time::sleep(self.settle).await;
        let html = page.content().await.map_err(failed);

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        html
    }

    async fn close(&self) {
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser did not close cleanly: {}", e);
            }
            let _ = browser.wait().await;
        }

        if let Some(handle) = self.handler.lock().await.take() {
            handle.abort();
        }
    }
}

impl Drop for BrowserRenderer {
    fn drop(&mut self) {
        if let Some(handle) = self.handler.get_mut().take() {
            handle.abort();
        }
    }
}
