//! crates/classroom_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like databases or model APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOmrResult, OmrResult, Timetable, Week};
use crate::generation::GenerationRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and core operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for timetable documents, keyed by teacher id.
#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Inserts a new document. Fails with `DuplicateKey` if the teacher already has one.
    async fn insert_timetable(&self, timetable: Timetable) -> PortResult<Timetable>;

    async fn find_timetable(&self, teacher_id: &str) -> PortResult<Timetable>;

    /// Overwrites the weeks of an existing document. Never creates.
    async fn replace_weeks(&self, teacher_id: &str, weeks: Vec<Week>) -> PortResult<Timetable>;

    async fn delete_timetable(&self, teacher_id: &str) -> PortResult<()>;
}

/// Append-only persistence for OMR results.
#[async_trait]
pub trait OmrResultStore: Send + Sync {
    async fn insert_omr_result(&self, result: NewOmrResult) -> PortResult<OmrResult>;

    async fn find_omr_result(&self, id: Uuid) -> PortResult<OmrResult>;

    /// All results submitted by a user, oldest first.
    async fn list_omr_results_for_user(&self, user_id: &str) -> PortResult<Vec<OmrResult>>;
}

#[async_trait]
pub trait TimetableGenerationService: Send + Sync {
    /// Drafts a timetable covering the given syllabus text.
    async fn generate_timetable(
        &self,
        request: &GenerationRequest,
        syllabus: &str,
    ) -> PortResult<Vec<Week>>;
}
