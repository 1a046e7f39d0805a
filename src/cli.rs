// src/cli.rs
use clap::Parser;

/// Footprint-Scout: digital footprint scanner
///
/// Looks up an email address in breach data, probes social platforms for
/// matching usernames, searches for public mentions and checks the domain.
#[derive(Parser, Debug, Clone)]
#[command(name = "footprint-scout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Email address to scan
    pub email: String,

    // ===== Input & Configuration =====
    /// Path to TOML config file (defaults to footprint.toml when present)
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    // ===== Output =====
    /// Also write the report to this path
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Override the results directory from config
    #[arg(long = "results-dir")]
    pub results_dir: Option<String>,

    // ===== Scan Behaviour =====
    /// Pull recent public activity for every profile found
    #[arg(long = "deep-scan")]
    pub deep_scan: bool,

    /// Add branded username variants (.official, .team)
    #[arg(long = "extended")]
    pub extended: bool,

    /// Never launch a headless browser; use plain fetches only
    #[arg(long = "no-browser")]
    pub no_browser: bool,

    // ===== Display =====
    /// Disable progress indicator
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    // ===== Logging =====
    /// Verbose logging (set log level to debug)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet logging (set log level to warn)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Cli {
    /// Validate flag combinations and return errors for invalid usage
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.verbose && self.quiet {
            anyhow::bail!("Cannot specify both --verbose and --quiet");
        }

        if self.email.trim().is_empty() {
            anyhow::bail!("An email address is required");
        }

        if let Some(ref dir) = self.results_dir {
            if dir.trim().is_empty() {
                anyhow::bail!("--results-dir must not be empty");
            }
        }

        Ok(())
    }

    /// Check if progress indicator should be enabled
    pub fn should_show_progress(&self) -> bool {
        !self.no_progress && !self.quiet
    }

    /// Log level from verbose/quiet flags, falling back to `configured`
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            configured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_positional() {
        let cli = Cli::parse_from(&["footprint-scout", "jane.doe@example.com"]);
        assert_eq!(cli.email, "jane.doe@example.com");
        assert_eq!(cli.config, None);
        assert!(!cli.deep_scan);
    }

    #[test]
    fn test_email_required() {
        assert!(Cli::try_parse_from(&["footprint-scout"]).is_err());
    }

    #[test]
    fn test_custom_config_path() {
        let cli = Cli::parse_from(&["footprint-scout", "--config", "custom.toml", "a@b.com"]);
        assert_eq!(cli.config, Some("custom.toml".to_string()));
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::parse_from(&[
            "footprint-scout",
            "a@b.com",
            "--deep-scan",
            "--extended",
            "--no-browser",
            "--results-dir",
            "out",
        ]);
        assert!(cli.deep_scan);
        assert!(cli.extended);
        assert!(cli.no_browser);
        assert_eq!(cli.results_dir, Some("out".to_string()));
    }

    #[test]
    fn test_verbose_and_quiet_invalid() {
        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "--verbose", "--quiet"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_blank_email_invalid() {
        let cli = Cli::parse_from(&["footprint-scout", "  "]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_valid_combination() {
        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "-v", "--deep-scan"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_progress_enabled_by_default() {
        let cli = Cli::parse_from(&["footprint-scout", "a@b.com"]);
        assert!(cli.should_show_progress());
    }

    #[test]
    fn test_progress_disabled() {
        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "--no-progress"]);
        assert!(!cli.should_show_progress());

        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "-q"]);
        assert!(!cli.should_show_progress());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "--verbose"]);
        assert_eq!(cli.log_level("info"), "debug");

        let cli = Cli::parse_from(&["footprint-scout", "a@b.com", "--quiet"]);
        assert_eq!(cli.log_level("info"), "warn");

        let cli = Cli::parse_from(&["footprint-scout", "a@b.com"]);
        assert_eq!(cli.log_level("trace"), "trace");
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(&[
            "footprint-scout",
            "-c", "test.toml",
            "-o", "report.json",
            "-v",
            "a@b.com",
        ]);
        assert_eq!(cli.config, Some("test.toml".to_string()));
        assert_eq!(cli.output, Some("report.json".to_string()));
        assert!(cli.verbose);
    }
}
