use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReportStore};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use exit_readiness::assessment::{
    AssessmentService, HtmlReportRenderer, ReportStore, ScoreSummaryNarrative,
};
use exit_readiness::config::AppConfig;
use exit_readiness::error::AppError;
use exit_readiness::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryReportStore::default());
    let assessment_service = Arc::new(AssessmentService::new(
        store.clone(),
        Arc::new(ScoreSummaryNarrative),
        Arc::new(HtmlReportRenderer),
        config.reports.ttl,
    ));
    spawn_report_sweeper(store, config.reports.sweep_interval);

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        report_ttl_secs = config.reports.ttl.as_secs(),
        "exit readiness service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Evicts expired reports on a fixed cadence; reads never wait on the sweep.
fn spawn_report_sweeper<S>(store: Arc<S>, every: Duration)
where
    S: ReportStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.sweep_expired(Utc::now()) {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "swept expired reports"),
                Err(err) => warn!(error = %err, "report sweep failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use exit_readiness::assessment::{
        build_report_prompt, AnswerSet, ReportId, ReportRecord, ReportStatus, ScoringEngine,
        SubmissionMetadata,
    };

    #[tokio::test]
    async fn sweeper_evicts_expired_reports() {
        let store = Arc::new(InMemoryReportStore::default());
        let answers = AnswerSet::default();
        let result = ScoringEngine::new().score(&answers);
        let created_at: DateTime<Utc> = Utc::now() - chrono::Duration::seconds(30);
        let record = ReportRecord {
            id: ReportId("stale".to_string()),
            created_at,
            metadata: SubmissionMetadata::default(),
            prompt: build_report_prompt(&result, &answers),
            answers,
            result,
            status: ReportStatus::Ready,
            narrative: None,
            html: None,
        };
        store.put(record, Duration::from_secs(1)).expect("put");

        spawn_report_sweeper(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.sweep_expired(Utc::now()).expect("sweep"), 0);
    }
}
