use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use super::answers::RawAnswers;
use super::narrative::NarrativeGenerator;
use super::render::ReportRenderer;
use super::repository::{ReportId, ReportRecord, ReportStore};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::error::AppError;

/// Router exposing webhook intake, direct scoring, and report retrieval.
pub fn assessment_router<S, N, R>(service: Arc<AssessmentService<S, N, R>>) -> Router
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    Router::new()
        .route("/webhook/typeform", post(webhook_handler::<S, N, R>))
        .route("/api/v1/assessments/score", post(score_handler::<S, N, R>))
        .route("/reports", get(list_handler::<S, N, R>))
        .route("/report/latest", get(latest_handler::<S, N, R>))
        .route("/report/:report_id", get(report_html_handler::<S, N, R>))
        .route("/report/:report_id/json", get(report_json_handler::<S, N, R>))
        .route("/report/:report_id/retry", post(retry_handler::<S, N, R>))
        .with_state(service)
}

pub(crate) async fn webhook_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
    axum::Json(payload): axum::Json<Value>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    let record = service.submit_webhook(&payload)?;
    Ok((StatusCode::OK, axum::Json(created_view(&record))).into_response())
}

pub(crate) async fn score_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
    axum::Json(answers): axum::Json<RawAnswers>,
) -> Response
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    let result = service.score(&answers);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn report_html_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    match service.get(&ReportId(report_id)) {
        Ok(ReportRecord {
            html: Some(html), ..
        }) => Ok(Html(html).into_response()),
        Ok(_) | Err(AssessmentServiceError::NotFound) => Ok(not_found_page(
            "Report Not Found",
            "This report may have expired, doesn't exist, or is still being prepared.",
        )),
        Err(other) => Err(other.into()),
    }
}

pub(crate) async fn latest_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    match service.latest() {
        Ok(ReportRecord {
            html: Some(html), ..
        }) => Ok(Html(html).into_response()),
        Ok(_) | Err(AssessmentServiceError::NotFound) => Ok(not_found_page(
            "No Reports Found",
            "No completed assessment reports are available yet.",
        )),
        Err(other) => Err(other.into()),
    }
}

pub(crate) async fn report_json_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    let record = service.get(&ReportId(report_id))?;
    Ok((StatusCode::OK, axum::Json(record)).into_response())
}

pub(crate) async fn retry_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    let record = service.retry(&ReportId(report_id))?;
    Ok((StatusCode::OK, axum::Json(created_view(&record))).into_response())
}

pub(crate) async fn list_handler<S, N, R>(
    State(service): State<Arc<AssessmentService<S, N, R>>>,
) -> Result<Response, AppError>
where
    S: ReportStore + 'static,
    N: NarrativeGenerator + 'static,
    R: ReportRenderer + 'static,
{
    let reports = service.list()?;
    let payload = json!({
        "count": reports.len(),
        "reports": reports,
    });
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

fn created_view(record: &ReportRecord) -> Value {
    json!({
        "success": true,
        "report_id": record.id,
        "html_url": format!("/report/{}", record.id),
        "timestamp": record.created_at,
    })
}

fn not_found_page(title: &str, message: &str) -> Response {
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title}</title>\n<meta charset=\"UTF-8\">\n\
         <style>body{{font-family:Arial,sans-serif;display:flex;justify-content:center;\
         align-items:center;height:100vh;margin:0;background:#f5f5f5}}\
         .error-container{{text-align:center;background:#fff;padding:40px;border-radius:10px}}\
         a{{color:#3498db;text-decoration:none}}</style>\n</head>\n<body>\n\
         <div class=\"error-container\"><h2>{title}</h2><p>{message}</p>\
         <p><a href=\"/report/latest\">View Latest Report</a></p></div>\n</body>\n</html>\n"
    );
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}
