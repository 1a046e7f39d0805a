// src/main.rs
use clap::Parser;
use footprint_scout::breach::HibpClient;
use footprint_scout::cli::Cli;
use footprint_scout::config::Config;
use footprint_scout::domain::DomainAnalyzer;
use footprint_scout::identity::Identity;
use footprint_scout::output::{ReportStore, SummaryPrinter};
use footprint_scout::progress::ProgressTracker;
use footprint_scout::scanner::{request_cancel, ScanOptions, Scanner};
use footprint_scout::transport::ProbeTransport;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "footprint.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate arguments
    cli.validate()?;

    // Load config file
    let mut config = Config::load(
        cli.config.as_deref().map(Path::new),
        Path::new(DEFAULT_CONFIG_PATH),
    )?;

    // Apply CLI overrides
    if cli.deep_scan {
        config.scan.deep_scan = true;
    }
    if cli.extended {
        config.scan.extended_variants = true;
    }
    if cli.no_browser {
        config.scan.use_browser = false;
    }
    if let Some(ref dir) = cli.results_dir {
        config.scan.results_dir = dir.clone();
    }

    // Initialize logging
    let log_level = cli.log_level(&config.logging.level);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Reject bad input before any scan resource is acquired
    let identity = Identity::from_email(&cli.email, config.scan.extended_variants)?;
    tracing::debug!(
        "Base username {}, variants: {:?}",
        identity.base_username(),
        identity.variants()
    );

    let printer = SummaryPrinter::new();
    printer.banner(identity.email())?;

    let show_progress = cli.should_show_progress() && is_terminal::is_terminal(std::io::stderr());
    let progress = ProgressTracker::new(show_progress);

    let breaches = HibpClient::from_config(&config.breach, &config.scan)?;
    if config.breach.api_key.is_none() {
        tracing::warn!("No breach API key configured; breach lookups will likely be rejected");
    }

    let transport = ProbeTransport::acquire(&config.scan).await?;
    let store = ReportStore::new(&config.scan.results_dir);
    let options = ScanOptions::from_config(&config.scan, cli.output.as_ref().map(PathBuf::from));

    let scanner = Scanner::new(
        identity,
        transport,
        Box::new(breaches),
        progress.clone(),
        store,
        options,
    )
    .with_domain_analyzer(DomainAnalyzer::system());

    // Ctrl-C interrupts the scan and partial findings are still saved.
    // A second Ctrl-C exits immediately.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if request_cancel(&shutdown_tx) {
                tracing::error!("Second interrupt received, exiting without saving");
                std::process::exit(130);
            }
            tracing::warn!("Interrupt received, stopping scan (press Ctrl-C again to force exit)...");
        }
    });

    let outcome = scanner.run(shutdown_rx).await?;

    progress.suspend(|| printer.summary(&outcome.report, &outcome.summary, Some(&outcome.path)))?;

    Ok(())
}
