//! crates/classroom_core/src/domain.rs
//!
//! Defines the core data structures for the application: per-teacher lecture
//! timetables and the records produced by optical-mark-recognition scans.
//! These structs are independent of any database or transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

//=========================================================================================
// Timetables
//=========================================================================================

/// The teacher-facing progress marker of a lecture.
///
/// This is tracked alongside `Lecture::completed` and never derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum LectureStatus {
    #[default]
    Pending,
    Conducted,
    Completed,
}

/// A single scheduled lecture slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lecture {
    pub time: String,
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: LectureStatus,
}

impl Lecture {
    /// A freshly scheduled lecture: not completed, status `Pending`.
    pub fn scheduled(time: impl Into<String>, subject: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            subject: subject.into(),
            topic: topic.into(),
            completed: false,
            status: LectureStatus::Pending,
        }
    }
}

/// One weekday of a week, holding its lectures in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Day {
    pub day: String,
    #[serde(default)]
    pub schedule: Vec<Lecture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Week {
    pub week_number: i32,
    #[serde(default)]
    pub days: Vec<Day>,
}

/// The single timetable document owned by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Timetable {
    pub teacher_id: String,
    pub weeks: Vec<Week>,
}

impl Timetable {
    /// Iterates over every lecture in stored order: weeks, then days, then slots.
    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> + '_ {
        self.weeks
            .iter()
            .flat_map(|week| week.days.iter())
            .flat_map(|day| day.schedule.iter())
    }
}

/// Addresses one lecture by its zero-based position inside a timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LectureRef {
    pub week_index: usize,
    pub day_index: usize,
    pub lecture_index: usize,
}

//=========================================================================================
// OMR results
//=========================================================================================

/// A validated OMR submission, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOmrResult {
    pub username: String,
    pub user_id: String,
    pub assignment_id: String,
    pub assignment_topic: String,
    pub omr_results: Map<String, Value>,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// An OMR result as persisted. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OmrResult {
    pub id: Uuid,
    pub username: String,
    pub user_id: String,
    pub assignment_id: String,
    pub assignment_topic: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub omr_results: Map<String, Value>,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl OmrResult {
    /// Attaches a store-assigned identifier to a validated submission.
    pub fn from_new(id: Uuid, new: NewOmrResult) -> Self {
        Self {
            id,
            username: new.username,
            user_id: new.user_id,
            assignment_id: new.assignment_id,
            assignment_topic: new.assignment_topic,
            omr_results: new.omr_results,
            success: new.success,
            timestamp: new.timestamp,
        }
    }
}
