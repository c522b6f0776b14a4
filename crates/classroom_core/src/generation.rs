//! crates/classroom_core/src/generation.rs
//!
//! Parameters for drafting a timetable with a language model, the prompt sent
//! to it, and the parsing of its reply back into `Week`s.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::Deserialize;

use crate::domain::{Day, Lecture, Week};
use crate::ports::{PortError, PortResult};

pub const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

const TIMETABLE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "timetable": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "week": { "type": "integer", "minimum": 1 },
          "days": {
            "type": "array",
            "items": {
              "type": "object",
              "properties": {
                "day": { "type": "string", "enum": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] },
                "schedule": {
                  "type": "array",
                  "items": {
                    "type": "object",
                    "properties": {
                      "time": { "type": "string", "pattern": "^\\d{2}:\\d{2}-\\d{2}:\\d{2}$" },
                      "subject": { "type": "string" },
                      "topic": { "type": "string" }
                    },
                    "required": ["time", "subject", "topic"]
                  }
                }
              },
              "required": ["day", "schedule"]
            }
          }
        },
        "required": ["week", "days"]
      }
    }
  },
  "required": ["timetable"]
}"#;

/// The knobs a teacher sets when asking for a drafted timetable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerationRequest {
    #[serde(default = "default_num_weeks")]
    pub num_weeks: u32,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    pub list_of_days: Vec<String>,
    /// Length of one lecture, in hours.
    pub lecture_duration: f64,
    #[serde(default)]
    pub model_name: Option<String>,
}

fn default_num_weeks() -> u32 {
    2
}

fn default_start_time() -> String {
    "09:00".to_string()
}

fn default_end_time() -> String {
    "14:00".to_string()
}

impl GenerationRequest {
    pub fn validate(&self) -> PortResult<()> {
        if self.num_weeks == 0 {
            return Err(PortError::Validation("num_weeks must be at least 1".to_string()));
        }
        if !(self.lecture_duration.is_finite() && self.lecture_duration > 0.0) {
            return Err(PortError::Validation(
                "lecture_duration must be a positive number of hours".to_string(),
            ));
        }
        if self.list_of_days.is_empty() {
            return Err(PortError::Validation("list_of_days must not be empty".to_string()));
        }
        if let Some(day) = self.list_of_days.iter().find(|d| !WEEKDAYS.contains(&d.as_str())) {
            return Err(PortError::Validation(format!("'{day}' is not a weekday")));
        }

        let start = parse_clock(&self.start_time, "start_time")?;
        let end = parse_clock(&self.end_time, "end_time")?;
        if start >= end {
            return Err(PortError::Validation(
                "start_time must be earlier than end_time".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the instruction text for the model.
    pub fn prompt(&self, syllabus: &str) -> String {
        format!(
            "Create a topic time table for each subject in JSON format (follow this JSON schema: {schema}) \
             of {weeks} weeks, each week on {days}, each day from {start} to {end}, \
             each lecture lasting {duration} hours, lunch break from 12:00 to 13:00 with the following syllabus.\n\
             Keep the time table such that the number of consecutive lectures of the same subject is minimized.\n\n\
             {syllabus}\n\n\
             Return ONLY the JSON object without any explanations or markdown formatting.",
            schema = TIMETABLE_SCHEMA,
            weeks = self.num_weeks,
            days = self.list_of_days.join(", "),
            start = self.start_time,
            end = self.end_time,
            duration = self.lecture_duration,
        )
    }
}

fn parse_clock(value: &str, field: &str) -> PortResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| PortError::Validation(format!("{field} must be HH:MM, got '{value}'")))
}

//=========================================================================================
// Model reply parsing
//=========================================================================================

#[derive(Deserialize)]
struct GeneratedTimetable {
    timetable: Vec<GeneratedWeek>,
}

#[derive(Deserialize)]
struct GeneratedWeek {
    week: i32,
    days: Vec<GeneratedDay>,
}

#[derive(Deserialize)]
struct GeneratedDay {
    day: String,
    schedule: Vec<GeneratedLecture>,
}

#[derive(Deserialize)]
struct GeneratedLecture {
    time: String,
    subject: String,
    topic: String,
}

impl GeneratedTimetable {
    fn into_weeks(self) -> Vec<Week> {
        self.timetable
            .into_iter()
            .map(|week| Week {
                week_number: week.week,
                days: week
                    .days
                    .into_iter()
                    .map(|day| Day {
                        day: day.day,
                        schedule: day
                            .schedule
                            .into_iter()
                            .map(|l| Lecture::scheduled(l.time, l.subject, l.topic))
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

fn json_object_span() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"))
}

/// Turns a model reply into weeks of freshly scheduled lectures.
///
/// The reply is tried as JSON first; failing that, the outermost `{...}` span
/// (models like to wrap answers in prose or code fences) is tried.
pub fn parse_generated_timetable(reply: &str) -> PortResult<Vec<Week>> {
    if let Ok(parsed) = serde_json::from_str::<GeneratedTimetable>(reply.trim()) {
        return Ok(parsed.into_weeks());
    }

    let span = json_object_span()
        .find(reply)
        .ok_or_else(|| PortError::MalformedPayload("model reply contains no JSON object".to_string()))?;

    serde_json::from_str::<GeneratedTimetable>(span.as_str())
        .map(GeneratedTimetable::into_weeks)
        .map_err(|e| PortError::MalformedPayload(format!("model reply is not a timetable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LectureStatus;

    fn request() -> GenerationRequest {
        serde_json::from_str(r#"{"list_of_days": ["Monday", "Wednesday"], "lecture_duration": 1.5}"#)
            .unwrap()
    }

    #[test]
    fn request_defaults_are_filled_in() {
        let req = request();
        assert_eq!(req.num_weeks, 2);
        assert_eq!(req.start_time, "09:00");
        assert_eq!(req.end_time, "14:00");
        assert!(req.model_name.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_validation_catches_bad_parameters() {
        let mut req = request();
        req.end_time = "08:00".to_string();
        assert!(matches!(req.validate(), Err(PortError::Validation(_))));

        let mut req = request();
        req.list_of_days.push("Sunday".to_string());
        assert!(matches!(req.validate(), Err(PortError::Validation(_))));

        let mut req = request();
        req.lecture_duration = 0.0;
        assert!(matches!(req.validate(), Err(PortError::Validation(_))));

        let mut req = request();
        req.start_time = "9am".to_string();
        assert!(matches!(req.validate(), Err(PortError::Validation(_))));
    }

    #[test]
    fn prompt_mentions_parameters_and_syllabus() {
        let prompt = request().prompt("Unit 1: Kinematics");
        assert!(prompt.contains("of 2 weeks"));
        assert!(prompt.contains("Monday, Wednesday"));
        assert!(prompt.contains("Unit 1: Kinematics"));
    }

    const REPLY: &str = r#"{"timetable": [{"week": 1, "days": [{"day": "Monday", "schedule": [
        {"time": "09:00-10:30", "subject": "Physics", "topic": "Kinematics"},
        {"time": "10:30-12:00", "subject": "Math", "topic": "Vectors"}]}]}]}"#;

    #[test]
    fn plain_json_reply_becomes_pending_weeks() {
        let weeks = parse_generated_timetable(REPLY).unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_number, 1);
        let slots = &weeks[0].days[0].schedule;
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|l| !l.completed && l.status == LectureStatus::Pending));
        assert_eq!(slots[1].topic, "Vectors");
    }

    #[test]
    fn fenced_reply_is_recovered() {
        let wrapped = format!("Here you go:\n```json\n{REPLY}\n```\nEnjoy!");
        let weeks = parse_generated_timetable(&wrapped).unwrap();
        assert_eq!(weeks[0].days[0].day, "Monday");
    }

    #[test]
    fn reply_without_timetable_is_malformed() {
        assert!(matches!(
            parse_generated_timetable("I cannot help with that."),
            Err(PortError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_generated_timetable(r#"{"schedule": []}"#),
            Err(PortError::MalformedPayload(_))
        ));
    }
}
