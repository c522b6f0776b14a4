//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the storage ports, used when no database is
//! configured and by the integration tests. It follows the same contract as
//! `DbAdapter`: unique teacher ids, whole-document replace, append-only results.

use std::collections::HashMap;

use async_trait::async_trait;
use classroom_core::domain::{NewOmrResult, OmrResult, Timetable, Week};
use classroom_core::ports::{OmrResultStore, PortError, PortResult, TimetableStore};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    timetables: RwLock<HashMap<String, Timetable>>,
    omr_results: RwLock<Vec<OmrResult>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn timetable_missing(teacher_id: &str) -> PortError {
    PortError::NotFound(format!("Timetable for teacher '{teacher_id}'"))
}

#[async_trait]
impl TimetableStore for InMemoryStore {
    async fn insert_timetable(&self, timetable: Timetable) -> PortResult<Timetable> {
        let mut timetables = self.timetables.write().await;
        if timetables.contains_key(&timetable.teacher_id) {
            return Err(PortError::DuplicateKey(format!(
                "Timetable for teacher '{}'",
                timetable.teacher_id
            )));
        }
        timetables.insert(timetable.teacher_id.clone(), timetable.clone());
        Ok(timetable)
    }

    async fn find_timetable(&self, teacher_id: &str) -> PortResult<Timetable> {
        self.timetables
            .read()
            .await
            .get(teacher_id)
            .cloned()
            .ok_or_else(|| timetable_missing(teacher_id))
    }

    async fn replace_weeks(&self, teacher_id: &str, weeks: Vec<Week>) -> PortResult<Timetable> {
        let mut timetables = self.timetables.write().await;
        let timetable = timetables
            .get_mut(teacher_id)
            .ok_or_else(|| timetable_missing(teacher_id))?;
        timetable.weeks = weeks;
        Ok(timetable.clone())
    }

    async fn delete_timetable(&self, teacher_id: &str) -> PortResult<()> {
        self.timetables
            .write()
            .await
            .remove(teacher_id)
            .map(|_| ())
            .ok_or_else(|| timetable_missing(teacher_id))
    }
}

#[async_trait]
impl OmrResultStore for InMemoryStore {
    async fn insert_omr_result(&self, result: NewOmrResult) -> PortResult<OmrResult> {
        let stored = OmrResult::from_new(Uuid::new_v4(), result);
        self.omr_results.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_omr_result(&self, id: Uuid) -> PortResult<OmrResult> {
        self.omr_results
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("OMR result {id}")))
    }

    async fn list_omr_results_for_user(&self, user_id: &str) -> PortResult<Vec<OmrResult>> {
        let mut results: Vec<OmrResult> = self
            .omr_results
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| r.timestamp);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Map;

    fn result_at(user_id: &str, secs: i64) -> NewOmrResult {
        NewOmrResult {
            username: "student".to_string(),
            user_id: user_id.to_string(),
            assignment_id: "a1".to_string(),
            assignment_topic: "quiz".to_string(),
            omr_results: Map::new(),
            success: true,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn results_for_a_user_come_back_oldest_first() {
        let store = InMemoryStore::new();
        let late = store.insert_omr_result(result_at("u1", 200)).await.unwrap();
        store.insert_omr_result(result_at("u2", 150)).await.unwrap();
        let early = store.insert_omr_result(result_at("u1", 100)).await.unwrap();

        let listed = store.list_omr_results_for_user("u1").await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn delete_of_unknown_teacher_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.delete_timetable("T404").await,
            Err(PortError::NotFound(_))
        ));
    }
}
