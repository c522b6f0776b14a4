//! services/api/src/web/timetable.rs
//!
//! Axum handlers for the timetable endpoints. Each handler deserializes the
//! request, delegates to `classroom_core::schedule`, and shapes the reply.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use classroom_core::domain::{Lecture, LectureRef, LectureStatus, Timetable, Week};
use classroom_core::generation::GenerationRequest;
use classroom_core::ports::PortError;
use classroom_core::schedule::{self, StatusUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimetableRequest {
    pub teacher_id: String,
    pub weeks: Vec<Week>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReplaceTimetableRequest {
    pub weeks: Vec<Week>,
}

/// Selects one lecture by position and the fields to change on it.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LectureStatusRequest {
    pub week_index: usize,
    pub day_index: usize,
    pub lecture_index: usize,
    #[serde(default)]
    pub status: Option<LectureStatus>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct TimetableMessageResponse {
    pub message: String,
    pub timetable: Timetable,
}

#[derive(Serialize, ToSchema)]
pub struct GeneratedTimetableResponse {
    pub timetable: Vec<Week>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Store the first timetable for a teacher.
#[utoipa::path(
    post,
    path = "/timetable/storetimetable",
    tag = "Timetables",
    request_body = CreateTimetableRequest,
    responses(
        (status = 201, description = "Timetable stored", body = TimetableMessageResponse),
        (status = 400, description = "Body is not a timetable", body = ErrorResponse),
        (status = 409, description = "The teacher already has a timetable", body = ErrorResponse),
        (status = 422, description = "teacherId is empty", body = ErrorResponse)
    )
)]
pub async fn create_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateTimetableRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let timetable =
        schedule::create_timetable(app_state.timetables.as_ref(), &req.teacher_id, req.weeks).await?;

    Ok((
        StatusCode::CREATED,
        Json(TimetableMessageResponse {
            message: "Timetable stored successfully!".to_string(),
            timetable,
        }),
    ))
}

/// Fetch a teacher's timetable.
#[utoipa::path(
    get,
    path = "/timetable/getTimetable/{teacher_id}",
    tag = "Timetables",
    params(("teacher_id" = String, Path, description = "The teacher owning the timetable.")),
    responses(
        (status = 200, description = "The stored timetable", body = Timetable),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    )
)]
pub async fn get_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = schedule::get_timetable(app_state.timetables.as_ref(), &teacher_id).await?;
    Ok(Json(timetable))
}

/// Replace every week of an existing timetable.
#[utoipa::path(
    put,
    path = "/timetable/updateTimetable/{teacher_id}",
    tag = "Timetables",
    params(("teacher_id" = String, Path, description = "The teacher owning the timetable.")),
    request_body = ReplaceTimetableRequest,
    responses(
        (status = 200, description = "Timetable replaced", body = TimetableMessageResponse),
        (status = 400, description = "Body is not a list of weeks", body = ErrorResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    )
)]
pub async fn replace_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
    payload: Result<Json<ReplaceTimetableRequest>, JsonRejection>,
) -> Result<Json<TimetableMessageResponse>, ApiError> {
    let Json(req) = payload?;
    let timetable =
        schedule::replace_timetable(app_state.timetables.as_ref(), &teacher_id, req.weeks).await?;

    Ok(Json(TimetableMessageResponse {
        message: "Timetable updated successfully!".to_string(),
        timetable,
    }))
}

/// Delete a teacher's timetable.
#[utoipa::path(
    delete,
    path = "/timetable/deleteTimetable/{teacher_id}",
    tag = "Timetables",
    params(("teacher_id" = String, Path, description = "The teacher owning the timetable.")),
    responses(
        (status = 200, description = "Timetable deleted", body = MessageResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    )
)]
pub async fn delete_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    schedule::delete_timetable(app_state.timetables.as_ref(), &teacher_id).await?;
    Ok(Json(MessageResponse::new("Timetable deleted successfully!")))
}

/// List the lectures of a timetable that are not completed yet, in schedule order.
#[utoipa::path(
    get,
    path = "/timetable/getPendingLectures/{teacher_id}",
    tag = "Timetables",
    params(("teacher_id" = String, Path, description = "The teacher owning the timetable.")),
    responses(
        (status = 200, description = "Pending lectures, possibly none", body = Vec<Lecture>),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    )
)]
pub async fn pending_lectures_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
) -> Result<Json<Vec<Lecture>>, ApiError> {
    info!(teacher_id = %teacher_id, "Pending lectures requested");
    let pending = schedule::pending_lectures(app_state.timetables.as_ref(), &teacher_id).await?;
    Ok(Json(pending))
}

/// Set the status and/or completion flag of one lecture.
#[utoipa::path(
    patch,
    path = "/timetable/updateLectureStatus/{teacher_id}",
    tag = "Timetables",
    params(("teacher_id" = String, Path, description = "The teacher owning the timetable.")),
    request_body = LectureStatusRequest,
    responses(
        (status = 200, description = "Lecture updated", body = TimetableMessageResponse),
        (status = 404, description = "Timetable not found", body = ErrorResponse),
        (status = 422, description = "No field to change, or the lecture does not exist", body = ErrorResponse)
    )
)]
pub async fn update_lecture_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<String>,
    payload: Result<Json<LectureStatusRequest>, JsonRejection>,
) -> Result<Json<TimetableMessageResponse>, ApiError> {
    let Json(req) = payload?;
    let target = LectureRef {
        week_index: req.week_index,
        day_index: req.day_index,
        lecture_index: req.lecture_index,
    };
    let update = StatusUpdate {
        status: req.status,
        completed: req.completed,
    };
    let timetable =
        schedule::update_lecture_status(app_state.timetables.as_ref(), &teacher_id, target, update)
            .await?;

    Ok(Json(TimetableMessageResponse {
        message: "Lecture status updated successfully!".to_string(),
        timetable,
    }))
}

/// Draft a timetable from uploaded syllabus text.
///
/// Accepts a multipart/form-data request with one or more `files` parts (UTF-8
/// text) and a `request` part holding the generation parameters as JSON.
/// The drafted timetable is returned, not stored.
#[utoipa::path(
    post,
    path = "/timetable/generate",
    tag = "Timetables",
    request_body(content_type = "multipart/form-data", description = "Syllabus files and a `request` JSON part."),
    responses(
        (status = 200, description = "Drafted timetable", body = GeneratedTimetableResponse),
        (status = 400, description = "Unreadable upload or parameters", body = ErrorResponse),
        (status = 422, description = "Invalid parameters or empty syllabus", body = ErrorResponse),
        (status = 503, description = "Generation is not configured or the model is unreachable", body = ErrorResponse)
    )
)]
pub async fn generate_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GeneratedTimetableResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut request: Option<GenerationRequest> = None;
    let mut syllabus = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("request") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read request part: {e}")))?;
                let parsed = serde_json::from_str::<GenerationRequest>(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid JSON in request part: {e}")))?;
                request = Some(parsed);
            }
            Some("files") => {
                let file_name = field.file_name().unwrap_or("syllabus").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {file_name}: {e}")))?;
                let text = String::from_utf8(data.to_vec()).map_err(|_| {
                    ApiError::BadRequest(format!("File {file_name} is not UTF-8 text"))
                })?;
                syllabus.push_str(&text);
                syllabus.push('\n');
            }
            _ => {}
        }
    }

    let request = request
        .ok_or_else(|| ApiError::BadRequest("Multipart form must include a request part".to_string()))?;
    request.validate()?;
    if syllabus.trim().is_empty() {
        return Err(PortError::Validation("No text extracted from the uploaded files".to_string()).into());
    }

    let generator = app_state.generator.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Timetable generation is not configured".to_string())
    })?;
    let timetable = generator
        .generate_timetable(&request, &syllabus)
        .await
        .map_err(|err| match err {
            PortError::StoreUnavailable(reason) => {
                warn!(%reason, "Timetable generator call failed");
                ApiError::ServiceUnavailable("The timetable generator is unavailable".to_string())
            }
            other => other.into(),
        })?;
    info!(weeks = timetable.len(), "Timetable drafted");

    Ok(Json(GeneratedTimetableResponse { timetable }))
}
