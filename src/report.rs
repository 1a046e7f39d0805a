// src/report.rs
//! Footprint report document and the aggregator that owns it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::identity::Identity;

/// Scan lifecycle status as written to the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ScanStatus::Running)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Interrupted => "interrupted",
            ScanStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One breach record as returned by the breach API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BreachRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breach_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_classes: Vec<String>,
    /// Every other field the API returned, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a profile was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub url: String,
    pub username: String,
}

/// A sample of recent public activity pulled during a deep scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Whether the domain receives mail, or unknown when DNS is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailHosting {
    Hosted(bool),
    Unknown,
}

impl Serialize for MailHosting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MailHosting::Hosted(hosted) => serializer.serialize_bool(*hosted),
            MailHosting::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainInfo {
    pub domain: String,
    pub website_accessible: bool,
    pub email_hosted: MailHosting,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Findings {
    pub breaches: Vec<BreachRecord>,
    pub social_media: BTreeMap<String, SocialProfile>,
    pub public_mentions: BTreeMap<String, Vec<String>>,
    pub comments_mentions: BTreeMap<String, Vec<ActivityItem>>,
    /// Serialized as `{}` until the domain stage has run
    #[serde(serialize_with = "serialize_domain_info")]
    pub domain_info: Option<DomainInfo>,
}

fn serialize_domain_info<S: Serializer>(
    info: &Option<DomainInfo>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match info {
        Some(info) => info.serialize(serializer),
        None => BTreeMap::<String, String>::new().serialize(serializer),
    }
}

/// The persisted report document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintReport {
    pub email: String,
    pub scan_date: DateTime<Utc>,
    pub status: ScanStatus,
    pub findings: Findings,
}

/// Sole owner of a [`FootprintReport`]; every stage writes through it
#[derive(Debug)]
pub struct FootprintAggregator {
    report: FootprintReport,
}

impl FootprintAggregator {
    pub fn new(identity: &Identity) -> Self {
        Self {
            report: FootprintReport {
                email: identity.email().to_string(),
                scan_date: Utc::now(),
                status: ScanStatus::Running,
                findings: Findings::default(),
            },
        }
    }

    pub fn record_breaches(&mut self, breaches: Vec<BreachRecord>) {
        self.report.findings.breaches = breaches;
    }

    pub fn record_social(&mut self, platform: &str, url: &str, username: &str) {
        self.report.findings.social_media.insert(
            platform.to_string(),
            SocialProfile {
                url: url.to_string(),
                username: username.to_string(),
            },
        );
    }

    /// Store deep-scan samples for a platform. Empty samples are not stored.
    pub fn record_activity(&mut self, platform: &str, items: Vec<ActivityItem>) {
        if items.is_empty() {
            return;
        }
        self.report
            .findings
            .comments_mentions
            .insert(platform.to_string(), items);
    }

    /// Store links found by one search engine. Empty link lists are not stored.
    pub fn record_mentions(&mut self, engine: &str, links: Vec<String>) {
        if links.is_empty() {
            return;
        }
        self.report
            .findings
            .public_mentions
            .insert(engine.to_string(), links);
    }

    pub fn record_domain_info(&mut self, info: DomainInfo) {
        self.report.findings.domain_info = Some(info);
    }

    /// Move the report to a terminal status.
    ///
    /// Returns false without touching the report if it was already finalized
    /// or `status` is not terminal.
    pub fn finalize(&mut self, status: ScanStatus) -> bool {
        if self.is_finalized() || !status.is_terminal() {
            return false;
        }
        self.report.status = status;
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.report.status.is_terminal()
    }

    pub fn report(&self) -> &FootprintReport {
        &self.report
    }

    pub fn into_report(self) -> FootprintReport {
        self.report
    }
}
