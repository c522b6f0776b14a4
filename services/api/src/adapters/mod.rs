pub mod db;
pub mod memory;
pub mod timetable_llm;

pub use db::DbAdapter;
pub use memory::InMemoryStore;
pub use timetable_llm::OpenAiTimetableAdapter;
