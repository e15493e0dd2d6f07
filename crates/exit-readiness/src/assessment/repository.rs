use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::answers::AnswerSet;
use super::intake::SubmissionMetadata;
use super::narrative::ReportPrompt;
use super::scoring::{Category, ScoreResult};

/// Report identifier: creation time in base-36 milliseconds plus a process-wide sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl ReportId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let sequence = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        ReportId(format!("{}-{sequence:06}", base36(millis)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|digit| char::from(*digit)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Ready,
    NarrativeFailed,
    RenderFailed,
}

impl ReportStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Ready => "ready",
            ReportStatus::NarrativeFailed => "narrative_failed",
            ReportStatus::RenderFailed => "render_failed",
        }
    }
}

/// A scored assessment and whatever downstream artifacts have been produced for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub created_at: DateTime<Utc>,
    pub metadata: SubmissionMetadata,
    pub answers: AnswerSet,
    pub result: ScoreResult,
    pub prompt: ReportPrompt,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip)]
    pub html: Option<String>,
}

impl ReportRecord {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            overall: self.result.overall,
            category: self.result.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub created_at: DateTime<Utc>,
    pub overall: u8,
    pub category: Category,
}

/// Time-bounded report storage. Concurrent writes to one id are last-write-wins.
///
/// `ttl` is measured from the record's `created_at`, so re-storing a record keeps its expiry.
pub trait ReportStore: Send + Sync {
    fn put(&self, record: ReportRecord, ttl: Duration) -> Result<(), StoreError>;
    /// Entries past their expiry are hidden even if the sweeper has not removed them yet.
    fn get(&self, id: &ReportId) -> Result<Option<ReportRecord>, StoreError>;
    fn latest_ready(&self) -> Result<Option<ReportRecord>, StoreError>;
    /// Live reports, newest first.
    fn list(&self) -> Result<Vec<ReportSummary>, StoreError>;
    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("report store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_encode_time_and_sequence() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = ReportId::generate(now);
        let second = ReportId::generate(now);

        let (time, sequence) = first.as_str().split_once('-').expect("has separator");
        assert_eq!(time, base36(1_700_000_000_000));
        assert_eq!(sequence.len(), 6);
        assert_ne!(first, second);
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(1_295), "zz");
    }
}
