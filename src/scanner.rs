// src/scanner.rs
//! Scan orchestration: runs the stages in order, owns the lifecycle
//!
//! Every stage writes straight into the [`FootprintAggregator`], so whatever a
//! stage recorded before an interrupt is kept. Whatever the outcome, the
//! report is finalized and persisted once and the transport released after.

use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::breach::BreachLookup;
use crate::config::ScanConfig;
use crate::domain::DomainAnalyzer;
use crate::identity::Identity;
use crate::output::{ReportStore, ScanSummary};
use crate::platforms::{self, default_platforms, PlatformProbe};
use crate::progress::ProgressTracker;
use crate::report::{FootprintAggregator, FootprintReport, ScanStatus};
use crate::search::MentionSearcher;
use crate::transport::ProbeTransport;

/// Per-scan knobs taken from config and CLI
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub deep_scan: bool,
    /// Variants tried per platform, in priority order
    pub variant_window: usize,
    /// Extra location for a copy of the report
    pub output: Option<PathBuf>,
}

impl ScanOptions {
    pub fn from_config(config: &ScanConfig, output: Option<PathBuf>) -> Self {
        Self {
            deep_scan: config.deep_scan,
            variant_window: config.variant_window,
            output,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            deep_scan: false,
            variant_window: 3,
            output: None,
        }
    }
}

/// What a finished scan hands back
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: FootprintReport,
    pub summary: ScanSummary,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Breaches,
    Social,
    Mentions,
    Domain,
}

impl Stage {
    const ALL: [Stage; 4] = [Stage::Breaches, Stage::Social, Stage::Mentions, Stage::Domain];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Breaches => "breach check",
            Stage::Social => "social media",
            Stage::Mentions => "public mentions",
            Stage::Domain => "domain analysis",
        };
        f.write_str(name)
    }
}

/// How a stage ended when raced against cancellation
#[derive(Debug)]
enum StageEnd<T> {
    Done(T),
    Cancelled,
    Failed(anyhow::Error),
}

pub struct Scanner {
    identity: Identity,
    transport: ProbeTransport,
    breaches: Box<dyn BreachLookup>,
    platforms: Vec<Box<dyn PlatformProbe>>,
    searcher: MentionSearcher,
    domain: DomainAnalyzer,
    progress: ProgressTracker,
    store: ReportStore,
    options: ScanOptions,
}

impl Scanner {
    /// Scanner with the built-in platforms and search engines.
    ///
    /// Mail hosting is reported as unknown unless a resolver is supplied
    /// with [`Scanner::with_domain_analyzer`].
    pub fn new(
        identity: Identity,
        transport: ProbeTransport,
        breaches: Box<dyn BreachLookup>,
        progress: ProgressTracker,
        store: ReportStore,
        options: ScanOptions,
    ) -> Self {
        let platforms = default_platforms()
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn PlatformProbe>)
            .collect();

        Self {
            identity,
            transport,
            breaches,
            platforms,
            searcher: MentionSearcher::default(),
            domain: DomainAnalyzer::new(None),
            progress,
            store,
            options,
        }
    }

    pub fn with_platforms(mut self, platforms: Vec<Box<dyn PlatformProbe>>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_searcher(mut self, searcher: MentionSearcher) -> Self {
        self.searcher = searcher;
        self
    }

    pub fn with_domain_analyzer(mut self, domain: DomainAnalyzer) -> Self {
        self.domain = domain;
        self
    }

    /// Run the scan to a terminal status.
    ///
    /// Setting `cancel` to true interrupts the scan. The transport is released
    /// even when persisting the report fails.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) -> anyhow::Result<ScanOutcome> {
        info!("Starting footprint scan for {}", self.identity.email());

        let mut aggregator = FootprintAggregator::new(&self.identity);
        let mut summary = ScanSummary::default();

        let status = self
            .run_stages(&mut aggregator, &mut summary, &mut cancel)
            .await;

        aggregator.finalize(status);
        let report = aggregator.into_report();
        info!("Scan {} for {}", status, report.email);

        let saved = self
            .store
            .persist(&report, self.options.output.as_deref())
            .await;

        self.progress.finish();
        self.transport.release().await;

        let path = saved?;
        info!("Results saved to {:?}", path);

        Ok(ScanOutcome {
            report,
            summary,
            path,
        })
    }

    async fn run_stages(
        &self,
        aggregator: &mut FootprintAggregator,
        summary: &mut ScanSummary,
        cancel: &mut watch::Receiver<bool>,
    ) -> ScanStatus {
        for stage in Stage::ALL {
            if *cancel.borrow() {
                warn!("Scan interrupted before {}", stage);
                return ScanStatus::Interrupted;
            }

            debug!("Entering stage: {}", stage);
            let end = race_cancel(cancel, self.run_stage(stage, aggregator)).await;

            match end {
                StageEnd::Done(found) => {
                    debug!("Stage {} found {}", stage, found);
                    match stage {
                        Stage::Breaches => summary.breaches = found,
                        Stage::Social => summary.social_profiles = found,
                        Stage::Mentions => summary.mentions = found,
                        Stage::Domain => summary.domain_units = found,
                    }
                }
                StageEnd::Cancelled => {
                    warn!("Scan interrupted during {}", stage);
                    return ScanStatus::Interrupted;
                }
                StageEnd::Failed(e) => {
                    error!("Stage {} failed: {:#}", stage, e);
                    return ScanStatus::Failed;
                }
            }
        }

        self.progress.task("Analysis complete", 20);
        ScanStatus::Completed
    }

    async fn run_stage(
        &self,
        stage: Stage,
        aggregator: &mut FootprintAggregator,
    ) -> anyhow::Result<usize> {
        match stage {
            Stage::Breaches => Ok(self.check_breaches(aggregator).await),
            Stage::Social => Ok(self.check_social_media(aggregator).await),
            Stage::Mentions => Ok(self.search_mentions(aggregator).await),
            Stage::Domain => Ok(self.analyze_domain(aggregator).await),
        }
    }

    async fn check_breaches(&self, aggregator: &mut FootprintAggregator) -> usize {
        self.progress.task("Checking data breaches", 5);

        match self.breaches.lookup(self.identity.email()).await {
            Ok(records) if !records.is_empty() => {
                let found = records.len();
                info!("Found {} breaches", found);
                aggregator.record_breaches(records);
                self.progress.task("Breaches found", 15);
                found
            }
            Ok(_) => {
                aggregator.record_breaches(Vec::new());
                self.progress.task("No breaches found", 15);
                0
            }
            Err(e) => {
                warn!("Breach check failed: {}", e);
                self.progress.task("Breach check failed", 15);
                0
            }
        }
    }

    async fn check_social_media(&self, aggregator: &mut FootprintAggregator) -> usize {
        let variants = self.identity.priority_variants(self.options.variant_window);
        let mut found = 0;

        for probe in &self.platforms {
            self.progress.task(&format!("Checking {}", probe.name()), 2);

            let Some(result) =
                platforms::probe_variants(probe.as_ref(), &self.transport, variants, self.options.deep_scan)
                    .await
            else {
                continue;
            };

            info!("{} profile found: {}", result.platform, result.url);
            aggregator.record_social(&result.platform, &result.url, &result.variant);
            if let Some(detail) = result.detail {
                aggregator.record_activity(&result.platform, detail);
            }
            found += 1;
        }

        self.progress.task("Social media scan complete", 10);
        found
    }

    async fn search_mentions(&self, aggregator: &mut FootprintAggregator) -> usize {
        let sets = self
            .searcher
            .search(&self.transport, &self.identity, &self.progress)
            .await;

        let mut found = 0;
        for set in sets {
            found += set.links.len();
            aggregator.record_mentions(&set.engine, set.links);
        }

        self.progress.task("Public mentions search complete", 15);
        found
    }

    async fn analyze_domain(&self, aggregator: &mut FootprintAggregator) -> usize {
        self.progress.task("Analyzing domain", 10);

        let info = self
            .domain
            .analyze(&self.transport, self.identity.domain())
            .await;
        aggregator.record_domain_info(info);

        self.progress.task("Domain analysis complete", 10);
        1
    }
}

/// Drive `stage` until it finishes or `cancel` flips to true, whichever is first.
///
/// A panic inside the stage ends it as `Failed` instead of unwinding out of
/// the scan.
async fn race_cancel<T, F>(cancel: &mut watch::Receiver<bool>, stage: F) -> StageEnd<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        biased;
        _ = wait_for_cancel(cancel) => StageEnd::Cancelled,
        result = AssertUnwindSafe(stage).catch_unwind() => match result {
            Ok(Ok(value)) => StageEnd::Done(value),
            Ok(Err(e)) => StageEnd::Failed(e),
            Err(panic) => StageEnd::Failed(anyhow::anyhow!("panicked: {}", panic_message(&*panic))),
        },
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Ask a running scan to stop. Returns true when a stop was already
/// requested, so the caller can escalate on a repeated interrupt.
pub fn request_cancel(cancel: &watch::Sender<bool>) -> bool {
    cancel.send_replace(true)
}

/// Resolves once cancellation is requested; never if the sender goes away first
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
