// src/output/human.rs
//! Human-readable colored terminal output

use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use super::ScanSummary;
use crate::report::{FootprintReport, MailHosting, ScanStatus};

/// Start banner and end-of-scan summary
pub struct SummaryPrinter {
    writer: Mutex<Box<dyn Write + Send>>,
    use_colors: bool,
}

impl SummaryPrinter {
    /// Create a new SummaryPrinter that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            use_colors: is_terminal::is_terminal(std::io::stdout()),
        }
    }

    /// Create a SummaryPrinter over any writer, without colors
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            use_colors: false,
        }
    }

    fn writer(&self) -> std::sync::MutexGuard<'_, Box<dyn Write + Send>> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn banner(&self, email: &str) -> anyhow::Result<()> {
        let mut writer = self.writer();

        if self.use_colors {
            writeln!(
                writer,
                "{} {}",
                "[*] Scanning digital footprint for".bold(),
                email.cyan().bold()
            )?;
        } else {
            writeln!(writer, "[*] Scanning digital footprint for {}", email)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn summary(
        &self,
        report: &FootprintReport,
        summary: &ScanSummary,
        saved_to: Option<&Path>,
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();
        let findings = &report.findings;

        let status = match report.status {
            ScanStatus::Completed => "Scan completed",
            ScanStatus::Interrupted => "Scan interrupted, partial results saved",
            ScanStatus::Failed => "Scan failed, partial results saved",
            ScanStatus::Running => "Scan still running",
        };

        let profiles: Vec<String> = findings
            .social_media
            .iter()
            .map(|(platform, profile)| format!("{} ({})", platform, profile.url))
            .collect();

        let domain_line = findings.domain_info.as_ref().map(|info| {
            let mail = match info.email_hosted {
                MailHosting::Hosted(true) => "mail hosted",
                MailHosting::Hosted(false) => "no mail servers",
                MailHosting::Unknown => "mail hosting unknown",
            };
            let site = if info.website_accessible {
                "website reachable"
            } else {
                "website unreachable"
            };
            format!("{}: {}, {}", info.domain, site, mail)
        });

        if self.use_colors {
            let headline = match report.status {
                ScanStatus::Completed => format!("[+] {}", status).green().bold(),
                _ => format!("[!] {}", status).yellow().bold(),
            };
            writeln!(writer, "\n{}", headline)?;

            let breaches = summary.breaches.to_string();
            writeln!(
                writer,
                "    {} {}",
                "Breaches:".dimmed(),
                if summary.breaches > 0 {
                    breaches.red().bold()
                } else {
                    breaches.normal()
                }
            )?;
            for breach in &findings.breaches {
                writeln!(writer, "      - {}", breach.name.red())?;
            }

            writeln!(
                writer,
                "    {} {}",
                "Social profiles:".dimmed(),
                summary.social_profiles.to_string().cyan().bold()
            )?;
            for profile in &profiles {
                writeln!(writer, "      - {}", profile.cyan())?;
            }

            writeln!(
                writer,
                "    {} {}",
                "Public mentions:".dimmed(),
                summary.mentions.to_string().yellow()
            )?;

            if let Some(ref line) = domain_line {
                writeln!(writer, "    {} {}", "Domain:".dimmed(), line)?;
            }

            if let Some(path) = saved_to {
                writeln!(
                    writer,
                    "    {} {}",
                    "Saved to:".dimmed(),
                    path.display().to_string().bold()
                )?;
            }
        } else {
            writeln!(writer, "\n[{}] {}", report.status, status)?;

            writeln!(writer, "    Breaches: {}", summary.breaches)?;
            for breach in &findings.breaches {
                writeln!(writer, "      - {}", breach.name)?;
            }

            writeln!(writer, "    Social profiles: {}", summary.social_profiles)?;
            for profile in &profiles {
                writeln!(writer, "      - {}", profile)?;
            }

            writeln!(writer, "    Public mentions: {}", summary.mentions)?;

            if let Some(ref line) = domain_line {
                writeln!(writer, "    Domain: {}", line)?;
            }

            if let Some(path) = saved_to {
                writeln!(writer, "    Saved to: {}", path.display())?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for SummaryPrinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::report::{BreachRecord, DomainInfo, FootprintAggregator};
    use std::sync::Arc;

    /// Shared in-memory sink so the test can read what was printed
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_summary_plain_text() {
        let identity = Identity::from_email("jane.doe@example.com", false).unwrap();
        let mut aggregator = FootprintAggregator::new(&identity);
        aggregator.record_breaches(vec![BreachRecord {
            name: "Adobe".to_string(),
            title: None,
            domain: None,
            breach_date: None,
            data_classes: Vec::new(),
            extra: serde_json::Map::new(),
        }]);
        aggregator.record_social("GitHub", "https://github.com/janedoe1", "janedoe1");
        aggregator.record_domain_info(DomainInfo {
            domain: "example.com".to_string(),
            website_accessible: true,
            email_hosted: MailHosting::Unknown,
        });
        aggregator.finalize(ScanStatus::Completed);

        let sink = Sink::default();
        let printer = SummaryPrinter::to_writer(Box::new(sink.clone()));
        let summary = ScanSummary {
            breaches: 1,
            social_profiles: 1,
            mentions: 0,
            domain_units: 1,
        };

        printer.banner("jane.doe@example.com").unwrap();
        printer
            .summary(
                aggregator.report(),
                &summary,
                Some(Path::new("results/jane.doe_example.com_footprint.json")),
            )
            .unwrap();

        let out = sink.contents();
        assert!(out.contains("Scanning digital footprint for jane.doe@example.com"));
        assert!(out.contains("[completed] Scan completed"));
        assert!(out.contains("Breaches: 1"));
        assert!(out.contains("- Adobe"));
        assert!(out.contains("- GitHub (https://github.com/janedoe1)"));
        assert!(out.contains("example.com: website reachable, mail hosting unknown"));
        assert!(out.contains("Saved to: results/jane.doe_example.com_footprint.json"));
    }

    #[test]
    fn test_summary_interrupted() {
        let identity = Identity::from_email("jane@example.com", false).unwrap();
        let mut aggregator = FootprintAggregator::new(&identity);
        aggregator.finalize(ScanStatus::Interrupted);

        let sink = Sink::default();
        let printer = SummaryPrinter::to_writer(Box::new(sink.clone()));
        printer
            .summary(aggregator.report(), &ScanSummary::default(), None)
            .unwrap();

        let out = sink.contents();
        assert!(out.contains("[interrupted]"));
        assert!(!out.contains("Saved to"));
        assert!(!out.contains("Domain:"));
    }
}
