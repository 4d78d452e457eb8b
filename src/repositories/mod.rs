//! Repositorios
//!
//! Cada repositorio expone un trait (usado por controladores y servicios)
//! y su implementación sobre PostgreSQL.

pub mod entry_exit_repository;
pub mod tool_repository;

pub use entry_exit_repository::{EntryExitRepository, EntryExitStore};
pub use tool_repository::{ToolRepository, ToolStore};
