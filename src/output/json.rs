// src/output/json.rs
//! Pretty-printed JSON report files

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::report::FootprintReport;

/// Writes reports under a results directory, one file per email
#[derive(Debug, Clone)]
pub struct ReportStore {
    results_dir: PathBuf,
}

impl ReportStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// `{results_dir}/{email with '@' replaced by '_'}_footprint.json`
    pub fn report_path(&self, email: &str) -> PathBuf {
        let stem: String = email
            .chars()
            .map(|c| match c {
                '@' | '/' | '\\' => '_',
                c => c,
            })
            .collect();
        self.results_dir.join(format!("{}_footprint.json", stem))
    }

    /// Write the report, plus an identical copy at `extra` when given.
    ///
    /// Returns the path of the primary file.
    pub async fn persist(&self, report: &FootprintReport, extra: Option<&Path>) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;

        fs::create_dir_all(&self.results_dir)
            .await
            .with_context(|| format!("Failed to create results directory {:?}", self.results_dir))?;

        let path = self.report_path(&report.email);
        write_atomic(&path, &json).await?;
        debug!("Report written to {:?}", path);

        if let Some(extra) = extra {
            if let Some(parent) = extra.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
            write_atomic(extra, &json).await?;
            debug!("Report copied to {:?}", extra);
        }

        Ok(path)
    }
}

/// Write to a temporary sibling, then rename over the target
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, contents)
        .await
        .with_context(|| format!("Failed to write temporary file {:?}", temp_path))?;

    fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to move report into place at {:?}", path))?;

    Ok(())
}
