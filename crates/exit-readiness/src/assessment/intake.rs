//! Typeform webhook intake.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::answers::{AnswerValue, RawAnswers};

/// Submission metadata carried alongside the answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionMetadata {
    pub submitted_at: Option<DateTime<Utc>>,
    pub token: Option<String>,
    pub form_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSubmission {
    pub answers: RawAnswers,
    pub metadata: SubmissionMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("webhook payload has no form_response object")]
    MissingFormResponse,
    #[error("form_response has no answers array")]
    MissingAnswers,
}

/// Maps a Typeform webhook body into the questionnaire vocabulary.
///
/// Structural problems (no `form_response`, no `answers`) are errors. Individual answers that
/// cannot be read are skipped with a warning; the scorers default whatever is missing.
pub fn parse_typeform_webhook(payload: &Value) -> Result<ParsedSubmission, IntakeError> {
    let form_response = payload
        .get("form_response")
        .filter(|value| value.is_object())
        .ok_or(IntakeError::MissingFormResponse)?;

    let entries = form_response
        .get("answers")
        .and_then(Value::as_array)
        .ok_or(IntakeError::MissingAnswers)?;

    let mut answers = RawAnswers::new();
    for entry in entries {
        let Some(field_ref) = entry
            .get("field")
            .and_then(|field| field.get("ref"))
            .and_then(Value::as_str)
        else {
            warn!("skipping answer without a field ref");
            continue;
        };

        let answer_type = entry.get("type").and_then(Value::as_str).unwrap_or_default();
        match read_answer(answer_type, entry) {
            Some(value) => {
                answers.insert(field_ref.to_string(), value);
            }
            None => warn!(field = field_ref, answer_type, "skipping unreadable answer"),
        }
    }

    let metadata = SubmissionMetadata {
        submitted_at: form_response
            .get("submitted_at")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|timestamp| timestamp.with_timezone(&Utc)),
        token: string_field(form_response, "token"),
        form_id: string_field(form_response, "form_id"),
    };

    Ok(ParsedSubmission { answers, metadata })
}

fn read_answer(answer_type: &str, entry: &Value) -> Option<AnswerValue> {
    match answer_type {
        "choice" => entry
            .get("choice")
            .and_then(|choice| choice.get("label"))
            .and_then(Value::as_str)
            .map(|label| AnswerValue::Label(label.to_string())),
        "choices" => entry
            .get("choices")
            .and_then(|choices| choices.get("labels"))
            .and_then(labels),
        "number" | "opinion_scale" => entry
            .get("number")
            .and_then(Value::as_f64)
            .map(AnswerValue::Scale),
        "text" => entry
            .get("text")
            .and_then(Value::as_str)
            .map(|text| AnswerValue::Label(text.to_string())),
        other => {
            warn!(answer_type = other, "unknown answer type, reading raw value");
            match entry.get("value")? {
                Value::String(text) => Some(AnswerValue::Label(text.clone())),
                Value::Number(number) => number.as_f64().map(AnswerValue::Scale),
                array @ Value::Array(_) => labels(array),
                _ => None,
            }
        }
    }
}

fn labels(value: &Value) -> Option<AnswerValue> {
    let items = value.as_array()?;
    Some(AnswerValue::Labels(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    ))
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
