//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification, the payloads
//! shared by several handlers, and the liveness endpoint.

use axum::Json;
use classroom_core::domain::{Day, Lecture, LectureRef, LectureStatus, OmrResult, Timetable, Week};
use classroom_core::generation::GenerationRequest;
use classroom_core::omr::OmrSubmission;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ErrorResponse;
use crate::web::omr::{self, OmrStoredResponse};
use crate::web::timetable::{
    self, CreateTimetableRequest, GeneratedTimetableResponse, LectureStatusRequest,
    ReplaceTimetableRequest, TimetableMessageResponse,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        timetable::create_timetable_handler,
        timetable::get_timetable_handler,
        timetable::replace_timetable_handler,
        timetable::delete_timetable_handler,
        timetable::pending_lectures_handler,
        timetable::update_lecture_status_handler,
        timetable::generate_timetable_handler,
        omr::store_omr_result_handler,
        omr::get_omr_result_handler,
        omr::list_user_omr_results_handler,
    ),
    components(
        schemas(
            Timetable, Week, Day, Lecture, LectureStatus, LectureRef,
            OmrResult, OmrSubmission, GenerationRequest,
            CreateTimetableRequest, ReplaceTimetableRequest, LectureStatusRequest,
            TimetableMessageResponse, GeneratedTimetableResponse, OmrStoredResponse,
            MessageResponse, HealthResponse, ErrorResponse
        )
    ),
    tags(
        (name = "Timetables", description = "Per-teacher lecture timetables and their progress."),
        (name = "OMR", description = "Append-only storage of optical-mark-recognition results.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payload Structs
//=========================================================================================

/// A bare acknowledgement.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
