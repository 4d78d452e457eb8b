//! Middleware del sistema
//!
//! CORS, rate limiting y cabeceras de seguridad.

pub mod cors;
pub mod rate_limit;
pub mod security_headers;
