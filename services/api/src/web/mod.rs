pub mod omr;
pub mod rest;
pub mod state;
pub mod timetable;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the API router over the given state. CORS and the Swagger UI are
/// layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(rest::health_handler))
        .route("/timetable/storetimetable", post(timetable::create_timetable_handler))
        .route(
            "/timetable/getTimetable/{teacher_id}",
            get(timetable::get_timetable_handler),
        )
        .route(
            "/timetable/updateTimetable/{teacher_id}",
            put(timetable::replace_timetable_handler),
        )
        .route(
            "/timetable/deleteTimetable/{teacher_id}",
            delete(timetable::delete_timetable_handler),
        )
        .route(
            "/timetable/getPendingLectures/{teacher_id}",
            get(timetable::pending_lectures_handler),
        )
        .route(
            "/timetable/updateLectureStatus/{teacher_id}",
            patch(timetable::update_lecture_status_handler),
        )
        .route("/timetable/generate", post(timetable::generate_timetable_handler))
        .route("/omr", post(omr::store_omr_result_handler))
        .route("/omr/{id}", get(omr::get_omr_result_handler))
        .route("/omr/user/{user_id}", get(omr::list_user_omr_results_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
