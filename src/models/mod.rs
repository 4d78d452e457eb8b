//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL (ver `migrations/`).

pub mod employee;
pub mod entry_exit;
pub mod tool;
