// src/checker/report.rs
// =============================================================================
// Turns a finished batch into the run summary.
//
// The summary is the machine-readable result of a run:
//   {timestamp, totalChecked, validCount, brokenCount, brokenRecords[]}
//
// It is printed as JSON on stdout, and its two counters can be appended to a
// CI output file (GitHub Actions' $GITHUB_OUTPUT) as key=value lines.
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use super::batch::{BatchOutcome, ClassifiedRecord};
use crate::store::RecordId;

/// One broken listing as it appears in the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokenEntry {
    pub id: RecordId,
    pub name: Option<String>,
    pub url: String,
    pub error: String,
}

impl From<&ClassifiedRecord> for BrokenEntry {
    fn from(classified: &ClassifiedRecord) -> Self {
        Self {
            id: classified.record.id.clone(),
            name: classified.record.name.clone(),
            url: classified.record.url.clone(),
            error: classified.error.clone().unwrap_or_default(),
        }
    }
}

/// Result of one check-links run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    pub total_checked: usize,
    pub valid_count: usize,
    pub broken_count: usize,
    pub broken_records: Vec<BrokenEntry>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &BatchOutcome, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_checked: outcome.total(),
            valid_count: outcome.valid.len(),
            broken_count: outcome.broken.len(),
            broken_records: outcome.broken.iter().map(BrokenEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The lines CI jobs read back
    pub fn ci_outputs(&self) -> String {
        format!(
            "broken_count={}\nvalid_count={}\n",
            self.broken_count, self.valid_count
        )
    }

    /// Appends ci_outputs() to `path`, creating the file if needed
    pub fn append_ci_outputs(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.ci_outputs().as_bytes())
    }
}
