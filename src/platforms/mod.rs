// src/platforms/mod.rs
//! Social platform probes for username existence detection

use async_trait::async_trait;
use tracing::debug;

use crate::report::ActivityItem;
use crate::transport::{ProbeTransport, TransportError};

pub mod activity;
pub mod site;

pub use site::{default_platforms, Detection, Enrichment, SiteProbe};

/// Samples kept per profile after a deep scan
pub const MAX_ACTIVITY_SAMPLES: usize = 5;

/// Items requested per profile during a deep scan
pub const MAX_ACTIVITY_FETCH: usize = 10;

/// What a single probe concluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Exists,
    NotFound,
    TransportFailure(TransportError),
}

/// Result of probing one username variant on one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub platform: String,
    pub variant: String,
    pub url: String,
    pub outcome: ProbeOutcome,
    /// Deep-scan samples, only present for existing profiles
    pub detail: Option<Vec<ActivityItem>>,
}

impl ProbeResult {
    pub fn exists(&self) -> bool {
        self.outcome == ProbeOutcome::Exists
    }
}

/// One social platform's detection rules
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// Platform name used as the report key (e.g. "GitHub")
    fn name(&self) -> &str;

    /// Profile URL for `username`
    fn profile_url(&self, username: &str) -> String;

    /// Decide whether `username` exists on this platform
    async fn probe(&self, transport: &ProbeTransport, username: &str) -> ProbeResult;

    /// Fetch recent public activity for a confirmed profile
    async fn enrich(
        &self,
        _transport: &ProbeTransport,
        _username: &str,
    ) -> anyhow::Result<Vec<ActivityItem>> {
        Ok(Vec::new())
    }
}

/// Probe `variants` in order and stop at the first profile that exists.
///
/// Transport failures are treated like "not found" and probing moves on.
/// With `deep_scan` set, the matching profile is enriched; enrichment
/// failures leave `detail` empty.
pub async fn probe_variants(
    probe: &dyn PlatformProbe,
    transport: &ProbeTransport,
    variants: &[String],
    deep_scan: bool,
) -> Option<ProbeResult> {
    for variant in variants {
        let mut result = probe.probe(transport, variant).await;

        match result.outcome {
            ProbeOutcome::Exists => {
                debug!("{} profile found: {}", probe.name(), result.url);

                if deep_scan {
                    match probe.enrich(transport, variant).await {
                        Ok(mut items) => {
                            items.truncate(MAX_ACTIVITY_SAMPLES);
                            result.detail = Some(items);
                        }
                        Err(e) => debug!("{} deep scan failed for {}: {}", probe.name(), variant, e),
                    }
                }

                return Some(result);
            }
            ProbeOutcome::NotFound => {
                debug!("{}: no profile for {}", probe.name(), variant);
            }
            ProbeOutcome::TransportFailure(ref e) => {
                debug!("{}: probe of {} failed: {}", probe.name(), variant, e);
            }
        }
    }

    None
}
