//! services/api/src/web/omr.rs
//!
//! Axum handlers for storing and reading back OMR results. There is no update
//! or delete endpoint: results are an append-only record.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use classroom_core::domain::OmrResult;
use classroom_core::omr::{self, OmrSubmission};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct OmrStoredResponse {
    pub message: String,
    pub result: OmrResult,
}

/// Store one OMR submission.
///
/// `omr_results` may be a JSON object or a string containing one.
#[utoipa::path(
    post,
    path = "/omr",
    tag = "OMR",
    request_body = OmrSubmission,
    responses(
        (status = 201, description = "Result stored", body = OmrStoredResponse),
        (status = 400, description = "Body or omr_results could not be parsed", body = ErrorResponse),
        (status = 422, description = "A required field is missing or has the wrong shape", body = ErrorResponse)
    )
)]
pub async fn store_omr_result_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<OmrSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let result = omr::store_omr_result(app_state.omr_results.as_ref(), submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(OmrStoredResponse {
            message: "OMR results stored successfully".to_string(),
            result,
        }),
    ))
}

/// Fetch one stored OMR result.
#[utoipa::path(
    get,
    path = "/omr/{id}",
    tag = "OMR",
    params(("id" = Uuid, Path, description = "The store-assigned result id.")),
    responses(
        (status = 200, description = "The stored result", body = OmrResult),
        (status = 400, description = "The id is not a UUID", body = ErrorResponse),
        (status = 404, description = "No such result", body = ErrorResponse)
    )
)]
pub async fn get_omr_result_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OmrResult>, ApiError> {
    let Path(id) = id?;
    Ok(Json(omr::get_omr_result(app_state.omr_results.as_ref(), id).await?))
}

/// List every result a user has submitted, oldest first.
#[utoipa::path(
    get,
    path = "/omr/user/{user_id}",
    tag = "OMR",
    params(("user_id" = String, Path, description = "The submitting user.")),
    responses((status = 200, description = "The user's results, possibly none", body = Vec<OmrResult>))
)]
pub async fn list_user_omr_results_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OmrResult>>, ApiError> {
    let results = omr::list_omr_results_for_user(app_state.omr_results.as_ref(), &user_id).await?;
    Ok(Json(results))
}
