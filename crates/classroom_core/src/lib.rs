pub mod domain;
pub mod generation;
pub mod omr;
pub mod ports;
pub mod schedule;

pub use domain::{Day, Lecture, LectureRef, LectureStatus, NewOmrResult, OmrResult, Timetable, Week};
pub use generation::GenerationRequest;
pub use omr::OmrSubmission;
pub use ports::{OmrResultStore, PortError, PortResult, TimetableGenerationService, TimetableStore};
pub use schedule::StatusUpdate;
