//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! `TimetableStore` and `OmrResultStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.
//!
//! Each timetable is one row whose week/day/lecture tree lives in a JSONB column,
//! so every write replaces the whole document in a single statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_core::domain::{NewOmrResult, OmrResult, Timetable, Week};
use classroom_core::ports::{OmrResultStore, PortError, PortResult, TimetableStore};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Classifies a driver error for the core. Unique violations become `DuplicateKey`.
fn map_db_error(err: sqlx::Error, key: &str) -> PortError {
    match err {
        sqlx::Error::RowNotFound => PortError::NotFound(key.to_string()),
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            PortError::DuplicateKey(key.to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => PortError::StoreUnavailable(err.to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

fn timetable_key(teacher_id: &str) -> String {
    format!("Timetable for teacher '{teacher_id}'")
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct TimetableRecord {
    teacher_id: String,
    weeks: Json<Vec<Week>>,
}
impl TimetableRecord {
    fn to_domain(self) -> Timetable {
        Timetable {
            teacher_id: self.teacher_id,
            weeks: self.weeks.0,
        }
    }
}

#[derive(FromRow)]
struct OmrResultRecord {
    id: Uuid,
    username: String,
    user_id: String,
    assignment_id: String,
    assignment_topic: String,
    omr_results: Json<Map<String, Value>>,
    success: bool,
    submitted_at: DateTime<Utc>,
}
impl OmrResultRecord {
    fn to_domain(self) -> OmrResult {
        OmrResult {
            id: self.id,
            username: self.username,
            user_id: self.user_id,
            assignment_id: self.assignment_id,
            assignment_topic: self.assignment_topic,
            omr_results: self.omr_results.0,
            success: self.success,
            timestamp: self.submitted_at,
        }
    }
}

const OMR_COLUMNS: &str =
    "id, username, user_id, assignment_id, assignment_topic, omr_results, success, submitted_at";

//=========================================================================================
// `TimetableStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TimetableStore for DbAdapter {
    async fn insert_timetable(&self, timetable: Timetable) -> PortResult<Timetable> {
        let key = timetable_key(&timetable.teacher_id);
        let record = sqlx::query_as::<_, TimetableRecord>(
            "INSERT INTO timetables (teacher_id, weeks) VALUES ($1, $2) RETURNING teacher_id, weeks",
        )
        .bind(&timetable.teacher_id)
        .bind(Json(&timetable.weeks))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &key))?;
        Ok(record.to_domain())
    }

    async fn find_timetable(&self, teacher_id: &str) -> PortResult<Timetable> {
        let record = sqlx::query_as::<_, TimetableRecord>(
            "SELECT teacher_id, weeks FROM timetables WHERE teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &timetable_key(teacher_id)))?;
        Ok(record.to_domain())
    }

    async fn replace_weeks(&self, teacher_id: &str, weeks: Vec<Week>) -> PortResult<Timetable> {
        let record = sqlx::query_as::<_, TimetableRecord>(
            "UPDATE timetables SET weeks = $2, updated_at = NOW() WHERE teacher_id = $1 RETURNING teacher_id, weeks",
        )
        .bind(teacher_id)
        .bind(Json(&weeks))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &timetable_key(teacher_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_timetable(&self, teacher_id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM timetables WHERE teacher_id = $1")
            .bind(teacher_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, &timetable_key(teacher_id)))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(timetable_key(teacher_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `OmrResultStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl OmrResultStore for DbAdapter {
    async fn insert_omr_result(&self, result: NewOmrResult) -> PortResult<OmrResult> {
        let id = Uuid::new_v4();
        let record = sqlx::query_as::<_, OmrResultRecord>(&format!(
            "INSERT INTO omr_results (id, username, user_id, assignment_id, assignment_topic, omr_results, success, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {OMR_COLUMNS}"
        ))
        .bind(id)
        .bind(&result.username)
        .bind(&result.user_id)
        .bind(&result.assignment_id)
        .bind(&result.assignment_topic)
        .bind(Json(&result.omr_results))
        .bind(result.success)
        .bind(result.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("OMR result {id}")))?;
        Ok(record.to_domain())
    }

    async fn find_omr_result(&self, id: Uuid) -> PortResult<OmrResult> {
        let record = sqlx::query_as::<_, OmrResultRecord>(&format!(
            "SELECT {OMR_COLUMNS} FROM omr_results WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("OMR result {id}")))?;
        Ok(record.to_domain())
    }

    async fn list_omr_results_for_user(&self, user_id: &str) -> PortResult<Vec<OmrResult>> {
        let records = sqlx::query_as::<_, OmrResultRecord>(&format!(
            "SELECT {OMR_COLUMNS} FROM omr_results WHERE user_id = $1 ORDER BY submitted_at ASC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("OMR results for user '{user_id}'")))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
