//! crates/classroom_core/src/omr.rs
//!
//! Normalization and storage of OMR scan results. Submissions arrive in a loose
//! shape (mixed field spellings, answers possibly JSON-encoded as a string) and
//! are coerced into a strict `NewOmrResult` before anything is written.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::domain::{NewOmrResult, OmrResult};
use crate::ports::{OmrResultStore, PortError, PortResult};

/// An OMR submission as received from a scanner client.
///
/// Both the scanner's snake_case names and the stored camelCase names are accepted.
/// Field shapes are left unchecked here; `normalize_submission` coerces them.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OmrSubmission {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub username: Option<Value>,
    /// A string, or a number which is stored in its decimal form.
    #[serde(alias = "userid", alias = "userId")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub user_id: Option<Value>,
    #[serde(alias = "assignmentId")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub assignment_id: Option<Value>,
    #[serde(alias = "assignmentTopic")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub assignment_topic: Option<Value>,
    /// A JSON object of answers, or the same object encoded as a string.
    #[serde(alias = "omrResults")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub omr_results: Option<Value>,
    /// A boolean, or the string `"true"` / `"false"`.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<bool>))]
    pub success: Option<Value>,
    /// RFC 3339 date-time, a zone-less ISO date-time (read as UTC), `YYYY-MM-DD`,
    /// or epoch milliseconds.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub timestamp: Option<Value>,
}

/// Validates and stores a submission, stamping it with the current time if it has none.
pub async fn store_omr_result(
    store: &dyn OmrResultStore,
    submission: OmrSubmission,
) -> PortResult<OmrResult> {
    let record = normalize_submission(submission, Utc::now())?;
    let stored = store.insert_omr_result(record).await?;
    info!(
        id = %stored.id,
        user_id = %stored.user_id,
        assignment_id = %stored.assignment_id,
        "OMR result stored"
    );
    Ok(stored)
}

pub async fn get_omr_result(store: &dyn OmrResultStore, id: Uuid) -> PortResult<OmrResult> {
    store.find_omr_result(id).await
}

pub async fn list_omr_results_for_user(
    store: &dyn OmrResultStore,
    user_id: &str,
) -> PortResult<Vec<OmrResult>> {
    store.list_omr_results_for_user(user_id).await
}

/// Coerces a loose submission into a strict record.
///
/// `now` is used as the timestamp when the submission carries none.
pub fn normalize_submission(
    submission: OmrSubmission,
    now: DateTime<Utc>,
) -> PortResult<NewOmrResult> {
    let omr_results = match submission.omr_results {
        Some(raw) => parse_omr_results(raw)?,
        None => return Err(missing("omr_results")),
    };

    let timestamp = match submission.timestamp {
        Some(Value::Null) | None => now,
        Some(raw) => parse_timestamp(&raw)?,
    };

    Ok(NewOmrResult {
        username: required(submission.username, "username")?,
        user_id: required(submission.user_id, "userid")?,
        assignment_id: required(submission.assignment_id, "assignment_id")?,
        assignment_topic: required(submission.assignment_topic, "assignment_topic")?,
        omr_results,
        success: required_flag(submission.success, "success")?,
        timestamp,
    })
}

/// Accepts a JSON object, or a string holding one.
pub fn parse_omr_results(raw: Value) -> PortResult<Map<String, Value>> {
    let value = match raw {
        Value::String(encoded) => serde_json::from_str::<Value>(&encoded).map_err(|e| {
            PortError::MalformedPayload(format!("omr_results is not valid JSON: {e}"))
        })?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(PortError::MalformedPayload(format!(
            "omr_results must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn parse_timestamp(raw: &Value) -> PortResult<DateTime<Utc>> {
    match raw {
        Value::String(text) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Ok(parsed.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| Utc.from_utc_datetime(&midnight))
                .ok_or_else(|| PortError::Validation(format!("timestamp '{text}' is not a valid date")))
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| PortError::Validation(format!("timestamp {number} is out of range"))),
        other => Err(PortError::Validation(format!(
            "timestamp must be a string or number, got {}",
            json_kind(other)
        ))),
    }
}

fn required(field: Option<Value>, name: &str) -> PortResult<String> {
    match field {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value),
        Some(Value::Number(number)) => Ok(number.to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(missing(name)),
        Some(other) => Err(PortError::Validation(format!(
            "{name} must be a string, got {}",
            json_kind(&other)
        ))),
    }
}

fn required_flag(field: Option<Value>, name: &str) -> PortResult<bool> {
    match field {
        Some(Value::Bool(flag)) => Ok(flag),
        Some(Value::String(text)) if text == "true" => Ok(true),
        Some(Value::String(text)) if text == "false" => Ok(false),
        None | Some(Value::Null) => Err(missing(name)),
        Some(other) => Err(PortError::Validation(format!(
            "{name} must be a boolean, got {other}"
        ))),
    }
}

fn missing(name: &str) -> PortError {
    PortError::Validation(format!("{name} is required"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
