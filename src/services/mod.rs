//! Services module
//!
//! Lógica de negocio de la aplicación: consulta de herramientas pendientes,
//! reportes de uso y el recordatorio por correo.

pub mod notification_service;
pub mod pending_tools_service;
pub mod report_service;
