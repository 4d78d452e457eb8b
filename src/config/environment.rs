//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Las variables se leen
//! una sola vez al arrancar (`EnvironmentConfig::from_env`).

use anyhow::{anyhow, Context, Result};
use std::env;

pub const CRON_DIAS_HABILES_DEFAULT: &str = "50 16 * * 1-5";
pub const CRON_SABADO_DEFAULT: &str = "0 12 * * 6";

/// Configuración del servidor SMTP
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

/// Configuración del recordatorio de herramientas
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub recipient: String,
    pub cron_weekdays: String,
    pub cron_saturday: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub smtp: SmtpConfig,
    pub notifications: NotificationConfig,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid value, got '{}'", key, value)),
        Err(_) => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        let notifications_enabled: bool = parsed_or("NOTIFICATIONS_ENABLED", true)?;

        // Sin recordatorio las credenciales SMTP pueden faltar
        let smtp_value = |key: &str| -> Result<String> {
            if notifications_enabled {
                required(key)
            } else {
                Ok(env::var(key).unwrap_or_default())
            }
        };

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parsed_or("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            database_url: required("DATABASE_URL")?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_requests: parsed_or("RATE_LIMIT_REQUESTS", 100)?,
            rate_limit_window: parsed_or("RATE_LIMIT_WINDOW", 15 * 60)?,
            smtp: SmtpConfig {
                host: smtp_value("SMTP_HOST")?,
                port: parsed_or("SMTP_PORT", 587)?,
                user: smtp_value("SMTP_USER")?,
                password: smtp_value("SMTP_PASSWORD")?,
                from: smtp_value("SMTP_FROM")?,
            },
            notifications: NotificationConfig {
                enabled: notifications_enabled,
                recipient: smtp_value("NOTIFICATION_EMAIL")?,
                cron_weekdays: env::var("NOTIFICATION_CRON_WEEKDAYS")
                    .unwrap_or_else(|_| CRON_DIAS_HABILES_DEFAULT.to_string()),
                cron_saturday: env::var("NOTIFICATION_CRON_SATURDAY")
                    .unwrap_or_else(|_| CRON_SABADO_DEFAULT.to_string()),
            },
        })
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CORS abierto si no hay orígenes o si se usa `*`
    pub fn cors_is_permissive(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
impl EnvironmentConfig {
    /// Configuración fija para tests, sin tocar el entorno del proceso
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 3000,
            host: "127.0.0.1".to_string(),
            database_url: "postgres://localhost/test".to_string(),
            cors_origins: vec!["*".to_string()],
            rate_limit_requests: 100,
            rate_limit_window: 60,
            smtp: SmtpConfig {
                host: "localhost".to_string(),
                port: 587,
                user: String::new(),
                password: String::new(),
                from: "Control de Flota <flota@example.com>".to_string(),
            },
            notifications: NotificationConfig {
                enabled: false,
                recipient: "ops@example.com".to_string(),
                cron_weekdays: CRON_DIAS_HABILES_DEFAULT.to_string(),
                cron_saturday: CRON_SABADO_DEFAULT.to_string(),
            },
        }
    }
}
