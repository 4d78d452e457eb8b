//! Control de flota
//!
//! API de registro de entradas y salidas de vehículos, préstamo de
//! herramientas del inventario y recordatorio por correo de las
//! herramientas que siguen en uso.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;
