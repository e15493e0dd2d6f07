use chrono::{DateTime, Utc};
use exit_readiness::assessment::{
    ReportId, ReportRecord, ReportStatus, ReportStore, ReportSummary, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct StoredReport {
    record: ReportRecord,
    expires_at: DateTime<Utc>,
}

impl StoredReport {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Process-local report table. Nothing survives a restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    reports: Arc<RwLock<HashMap<ReportId, StoredReport>>>,
}

impl InMemoryReportStore {
    fn live_records(&self, now: DateTime<Utc>) -> Vec<ReportRecord> {
        let guard = self.reports.read().expect("report store lock poisoned");
        guard
            .values()
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.record.clone())
            .collect()
    }
}

impl ReportStore for InMemoryReportStore {
    fn put(&self, record: ReportRecord, ttl: Duration) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|err| StoreError::Unavailable(format!("invalid retention: {err}")))?;
        let expires_at = record
            .created_at
            .checked_add_signed(ttl)
            .ok_or_else(|| StoreError::Unavailable("retention overflows the calendar".to_string()))?;
        let mut guard = self.reports.write().expect("report store lock poisoned");
        guard.insert(record.id.clone(), StoredReport { record, expires_at });
        Ok(())
    }

    fn get(&self, id: &ReportId) -> Result<Option<ReportRecord>, StoreError> {
        let now = Utc::now();
        let guard = self.reports.read().expect("report store lock poisoned");
        Ok(guard
            .get(id)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.record.clone()))
    }

    fn latest_ready(&self) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .live_records(Utc::now())
            .into_iter()
            .filter(|record| record.status == ReportStatus::Ready)
            .max_by(|left, right| {
                (left.created_at, &left.id).cmp(&(right.created_at, &right.id))
            }))
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let mut summaries: Vec<ReportSummary> = self
            .live_records(Utc::now())
            .iter()
            .map(ReportRecord::summary)
            .collect();
        summaries.sort_by(|left, right| {
            (right.created_at, &right.id).cmp(&(left.created_at, &left.id))
        });
        Ok(summaries)
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut guard = self.reports.write().expect("report store lock poisoned");
        let before = guard.len();
        guard.retain(|_, stored| stored.is_live(now));
        Ok(before - guard.len())
    }
}
