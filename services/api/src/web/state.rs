//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::InMemoryStore;
use crate::config::Config;
use classroom_core::ports::{OmrResultStore, TimetableGenerationService, TimetableStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub timetables: Arc<dyn TimetableStore>,
    pub omr_results: Arc<dyn OmrResultStore>,
    /// Absent when no model API key is configured.
    pub generator: Option<Arc<dyn TimetableGenerationService>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by a fresh `InMemoryStore` and no timetable generator.
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            timetables: store.clone(),
            omr_results: store,
            generator: None,
            config: Arc::new(config),
        }
    }
}
