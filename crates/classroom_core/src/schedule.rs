//! crates/classroom_core/src/schedule.rs
//!
//! Timetable operations over an injected `TimetableStore`: the create/read/
//! replace/delete lifecycle, the pending-lecture view, and single-lecture
//! status updates.

use tracing::{debug, info};

use crate::domain::{Lecture, LectureRef, LectureStatus, Timetable, Week};
use crate::ports::{PortError, PortResult, TimetableStore};

/// The fields a lecture status update may touch. Unset fields are left as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: Option<LectureStatus>,
    pub completed: Option<bool>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.completed.is_none()
    }
}

fn validate_teacher_id(teacher_id: &str) -> PortResult<()> {
    if teacher_id.trim().is_empty() {
        return Err(PortError::Validation("teacherId must not be empty".to_string()));
    }
    Ok(())
}

/// Stores the first timetable for a teacher. A second create for the same
/// teacher fails with `DuplicateKey`.
pub async fn create_timetable(
    store: &dyn TimetableStore,
    teacher_id: &str,
    weeks: Vec<Week>,
) -> PortResult<Timetable> {
    validate_teacher_id(teacher_id)?;
    let timetable = store
        .insert_timetable(Timetable {
            teacher_id: teacher_id.to_string(),
            weeks,
        })
        .await?;
    info!(teacher_id, weeks = timetable.weeks.len(), "Timetable created");
    Ok(timetable)
}

pub async fn get_timetable(store: &dyn TimetableStore, teacher_id: &str) -> PortResult<Timetable> {
    store.find_timetable(teacher_id).await
}

/// Overwrites every week of an existing timetable.
pub async fn replace_timetable(
    store: &dyn TimetableStore,
    teacher_id: &str,
    weeks: Vec<Week>,
) -> PortResult<Timetable> {
    let timetable = store.replace_weeks(teacher_id, weeks).await?;
    info!(teacher_id, weeks = timetable.weeks.len(), "Timetable replaced");
    Ok(timetable)
}

pub async fn delete_timetable(store: &dyn TimetableStore, teacher_id: &str) -> PortResult<()> {
    store.delete_timetable(teacher_id).await?;
    info!(teacher_id, "Timetable deleted");
    Ok(())
}

/// Every lecture of the teacher's timetable that is not yet completed, in stored order.
pub async fn pending_lectures(
    store: &dyn TimetableStore,
    teacher_id: &str,
) -> PortResult<Vec<Lecture>> {
    let timetable = store.find_timetable(teacher_id).await?;
    let pending = collect_pending(&timetable);
    debug!(teacher_id, pending = pending.len(), "Collected pending lectures");
    Ok(pending)
}

/// Filters the lectures of a timetable down to those with `completed == false`.
///
/// Only the `completed` flag is consulted; `status` plays no part.
pub fn collect_pending(timetable: &Timetable) -> Vec<Lecture> {
    timetable
        .lectures()
        .filter(|lecture| !lecture.completed)
        .cloned()
        .collect()
}

/// Changes the status and/or completion flag of one lecture, then writes the
/// whole timetable back.
pub async fn update_lecture_status(
    store: &dyn TimetableStore,
    teacher_id: &str,
    target: LectureRef,
    update: StatusUpdate,
) -> PortResult<Timetable> {
    if update.is_empty() {
        return Err(PortError::Validation(
            "either status or completed must be provided".to_string(),
        ));
    }

    let mut timetable = store.find_timetable(teacher_id).await?;
    apply_status_update(&mut timetable.weeks, target, update)?;
    let timetable = store.replace_weeks(teacher_id, timetable.weeks).await?;

    info!(
        teacher_id,
        week = target.week_index,
        day = target.day_index,
        lecture = target.lecture_index,
        "Lecture status updated"
    );
    Ok(timetable)
}

/// Applies `update` to the lecture at `target`. Leaves `weeks` untouched on error.
pub fn apply_status_update(
    weeks: &mut [Week],
    target: LectureRef,
    update: StatusUpdate,
) -> PortResult<()> {
    let week = weeks.get_mut(target.week_index).ok_or_else(|| {
        PortError::Validation(format!("week index {} is out of range", target.week_index))
    })?;
    let day = week.days.get_mut(target.day_index).ok_or_else(|| {
        PortError::Validation(format!("day index {} is out of range", target.day_index))
    })?;
    let lecture = day.schedule.get_mut(target.lecture_index).ok_or_else(|| {
        PortError::Validation(format!(
            "lecture index {} is out of range",
            target.lecture_index
        ))
    })?;

    if let Some(status) = update.status {
        lecture.status = status;
    }
    if let Some(completed) = update.completed {
        lecture.completed = completed;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Day;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        docs: Mutex<HashMap<String, Timetable>>,
    }

    #[async_trait]
    impl TimetableStore for FakeStore {
        async fn insert_timetable(&self, timetable: Timetable) -> PortResult<Timetable> {
            let mut docs = self.docs.lock().unwrap();
            if docs.contains_key(&timetable.teacher_id) {
                return Err(PortError::DuplicateKey(timetable.teacher_id));
            }
            docs.insert(timetable.teacher_id.clone(), timetable.clone());
            Ok(timetable)
        }

        async fn find_timetable(&self, teacher_id: &str) -> PortResult<Timetable> {
            self.docs
                .lock()
                .unwrap()
                .get(teacher_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(teacher_id.to_string()))
        }

        async fn replace_weeks(&self, teacher_id: &str, weeks: Vec<Week>) -> PortResult<Timetable> {
            let mut docs = self.docs.lock().unwrap();
            let doc = docs
                .get_mut(teacher_id)
                .ok_or_else(|| PortError::NotFound(teacher_id.to_string()))?;
            doc.weeks = weeks;
            Ok(doc.clone())
        }

        async fn delete_timetable(&self, teacher_id: &str) -> PortResult<()> {
            self.docs
                .lock()
                .unwrap()
                .remove(teacher_id)
                .map(|_| ())
                .ok_or_else(|| PortError::NotFound(teacher_id.to_string()))
        }
    }

    fn lecture(time: &str, subject: &str, topic: &str, completed: bool) -> Lecture {
        Lecture {
            completed,
            ..Lecture::scheduled(time, subject, topic)
        }
    }

    fn sample_weeks() -> Vec<Week> {
        vec![Week {
            week_number: 1,
            days: vec![
                Day {
                    day: "Monday".to_string(),
                    schedule: vec![lecture("09:00", "Math", "Algebra", false)],
                },
                Day {
                    day: "Tuesday".to_string(),
                    schedule: vec![lecture("10:00", "Science", "Physics", true)],
                },
            ],
        }]
    }

    fn mixed_weeks() -> Vec<Week> {
        vec![
            Week {
                week_number: 1,
                days: vec![Day {
                    day: "Monday".to_string(),
                    schedule: vec![
                        lecture("09:00", "Math", "Sets", true),
                        lecture("10:00", "History", "Rome", false),
                        lecture("11:00", "Art", "Colour", false),
                    ],
                }],
            },
            Week {
                week_number: 2,
                days: vec![
                    Day {
                        day: "Wednesday".to_string(),
                        schedule: vec![lecture("09:00", "Math", "Groups", false)],
                    },
                    Day {
                        day: "Friday".to_string(),
                        schedule: vec![lecture("13:00", "Biology", "Cells", true)],
                    },
                ],
            },
        ]
    }

    #[tokio::test]
    async fn pending_lectures_returns_only_incomplete_monday_slot() {
        let store = FakeStore::default();
        create_timetable(&store, "T1", sample_weeks()).await.unwrap();

        let pending = pending_lectures(&store, "T1").await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].time, "09:00");
        assert_eq!(pending[0].subject, "Math");
        assert_eq!(pending[0].topic, "Algebra");
    }

    #[test]
    fn collect_pending_keeps_stored_order_and_partitions_all_lectures() {
        let timetable = Timetable {
            teacher_id: "T2".to_string(),
            weeks: mixed_weeks(),
        };

        let pending = collect_pending(&timetable);
        let topics: Vec<&str> = pending.iter().map(|l| l.topic.as_str()).collect();
        assert_eq!(topics, ["Rome", "Colour", "Groups"]);

        let completed = timetable.lectures().filter(|l| l.completed).count();
        assert_eq!(pending.len() + completed, timetable.lectures().count());
    }

    #[test]
    fn collect_pending_ignores_status_marker() {
        let mut weeks = sample_weeks();
        weeks[0].days[0].schedule[0].status = LectureStatus::Completed;
        let timetable = Timetable {
            teacher_id: "T1".to_string(),
            weeks,
        };

        assert_eq!(collect_pending(&timetable).len(), 1);
    }

    #[tokio::test]
    async fn pending_lectures_is_empty_when_everything_is_done() {
        let store = FakeStore::default();
        let mut weeks = sample_weeks();
        weeks[0].days[0].schedule[0].completed = true;
        create_timetable(&store, "T1", weeks).await.unwrap();

        assert!(pending_lectures(&store, "T1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_lectures_for_unknown_teacher_is_not_found() {
        let store = FakeStore::default();
        let err = pending_lectures(&store, "nobody").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_and_blank_teacher() {
        let store = FakeStore::default();
        create_timetable(&store, "T1", sample_weeks()).await.unwrap();

        let dup = create_timetable(&store, "T1", vec![]).await.unwrap_err();
        assert!(matches!(dup, PortError::DuplicateKey(_)));
        assert_eq!(get_timetable(&store, "T1").await.unwrap().weeks, sample_weeks());

        let blank = create_timetable(&store, "  ", vec![]).await.unwrap_err();
        assert!(matches!(blank, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn replace_missing_teacher_creates_nothing() {
        let store = FakeStore::default();
        let err = replace_timetable(&store, "ghost", sample_weeks()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert!(matches!(
            get_timetable(&store, "ghost").await.unwrap_err(),
            PortError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn update_lecture_status_touches_only_requested_fields() {
        let store = FakeStore::default();
        create_timetable(&store, "T1", sample_weeks()).await.unwrap();
        let target = LectureRef {
            week_index: 0,
            day_index: 0,
            lecture_index: 0,
        };

        let updated = update_lecture_status(
            &store,
            "T1",
            target,
            StatusUpdate {
                status: Some(LectureStatus::Conducted),
                completed: None,
            },
        )
        .await
        .unwrap();

        let slot = &updated.weeks[0].days[0].schedule[0];
        assert_eq!(slot.status, LectureStatus::Conducted);
        assert!(!slot.completed);
        assert_eq!(get_timetable(&store, "T1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_lecture_status_rejects_bad_reference_and_empty_update() {
        let store = FakeStore::default();
        create_timetable(&store, "T1", sample_weeks()).await.unwrap();

        let out_of_range = LectureRef {
            week_index: 0,
            day_index: 1,
            lecture_index: 3,
        };
        let err = update_lecture_status(
            &store,
            "T1",
            out_of_range,
            StatusUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        assert_eq!(get_timetable(&store, "T1").await.unwrap().weeks, sample_weeks());

        let target = LectureRef {
            week_index: 0,
            day_index: 0,
            lecture_index: 0,
        };
        let err = update_lecture_status(&store, "T1", target, StatusUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }
}
