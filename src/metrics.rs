//! Métricas Prometheus
//!
//! El registro se crea en `main` y se comparte por `AppState`; el scheduler
//! reporta aquí el resultado de cada ciclo de notificación.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::services::notification_service::NotificationOutcome;
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct NotificationMetrics {
    outcomes: IntCounterVec,
    last_run: IntGauge,
}

impl NotificationMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let outcomes = IntCounterVec::new(
            Opts::new(
                "pending_tool_notifications_total",
                "Ciclos de notificación de herramientas pendientes por resultado",
            ),
            &["outcome"],
        )?;
        let last_run = IntGauge::new(
            "pending_tool_notifications_last_run_timestamp_seconds",
            "Momento del último ciclo de notificación ejecutado",
        )?;

        registry.register(Box::new(outcomes.clone()))?;
        registry.register(Box::new(last_run.clone()))?;

        Ok(Self { outcomes, last_run })
    }

    pub fn record(&self, outcome: &NotificationOutcome) {
        self.outcomes.with_label_values(&[outcome.label()]).inc();
        if !matches!(outcome, NotificationOutcome::Skipped) {
            self.last_run.set(chrono::Utc::now().timestamp());
        }
    }

    pub fn count(&self, label: &str) -> u64 {
        self.outcomes.with_label_values(&[label]).get()
    }
}

/// Exposición en formato texto de Prometheus
pub fn render(registry: &Registry) -> Result<String, AppError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| AppError::Internal(format!("Error codificando métricas: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| AppError::Internal(e.to_string()))
}
