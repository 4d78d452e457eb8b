//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use prometheus::Registry;
use std::sync::Arc;

use crate::repositories::{EntryExitStore, ToolStore};

#[derive(Clone)]
pub struct AppState {
    pub entries: Arc<dyn EntryExitStore>,
    pub tools: Arc<dyn ToolStore>,
    pub metrics_registry: Registry,
}

impl AppState {
    pub fn new(entries: Arc<dyn EntryExitStore>, tools: Arc<dyn ToolStore>, metrics_registry: Registry) -> Self {
        Self {
            entries,
            tools,
            metrics_registry,
        }
    }
}
