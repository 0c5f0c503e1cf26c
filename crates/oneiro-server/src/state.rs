//! Shared application state.

use std::sync::Arc;

use oneiro_core::{DreamService, Interpreter};

#[derive(Clone)]
pub struct AppState {
    /// The submission workflow over the storage ports.
    pub service: Arc<DreamService>,
    /// The raw interpretation gateway, exposed directly by
    /// `POST /interpret-dream` without touching credits or records.
    pub interpreter: Arc<dyn Interpreter>,
}

impl AppState {
    pub fn new(service: Arc<DreamService>, interpreter: Arc<dyn Interpreter>) -> Self {
        Self {
            service,
            interpreter,
        }
    }
}
