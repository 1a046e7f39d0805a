// src/output/mod.rs
//! Report persistence and terminal presentation
//!
//! The JSON file on disk is the scan's durable result; the terminal summary
//! only observes it.

pub mod human;
pub mod json;

pub use human::SummaryPrinter;
pub use json::ReportStore;

/// Found counts per stage, reported alongside the final document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub breaches: usize,
    pub social_profiles: usize,
    pub mentions: usize,
    pub domain_units: usize,
}
