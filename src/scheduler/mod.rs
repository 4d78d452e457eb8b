//! Scheduler de recordatorios
//!
//! Tarea de fondo que duerme hasta el próximo disparo de calendario y lanza
//! un ciclo del `PendingToolsNotifier`. Un ciclo que se dispara mientras
//! otro sigue en curso se omite (`Skipped`). Cada resultado se registra en
//! el log y en las métricas.

pub mod cron;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::metrics::NotificationMetrics;
use crate::services::notification_service::{NotificationOutcome, PendingToolsNotifier};
pub use cron::{CalendarTrigger, CronError};

/// Permite una sola ejecución a la vez
#[derive(Clone, Default)]
pub struct SingleFlight {
    running: Arc<AtomicBool>,
}

/// Libera el `SingleFlight` al salir de alcance
pub struct FlightGuard {
    running: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl SingleFlight {
    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { running: self.running.clone() })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

pub struct NotificationScheduler {
    triggers: Vec<CalendarTrigger>,
    notifier: Arc<PendingToolsNotifier>,
    metrics: NotificationMetrics,
    flight: SingleFlight,
}

impl NotificationScheduler {
    pub fn new(triggers: Vec<CalendarTrigger>, notifier: Arc<PendingToolsNotifier>, metrics: NotificationMetrics) -> Self {
        Self {
            triggers,
            notifier,
            metrics,
            flight: SingleFlight::default(),
        }
    }

    /// Próximo disparo entre todos los triggers
    pub fn next_fire<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.triggers.iter().filter_map(|t| t.next_after(after)).min()
    }

    /// Próximo disparo sin repetir uno ya lanzado: si el reloj retrocedió
    /// por debajo de `last_fire`, se cuenta desde `last_fire`.
    pub fn next_fire_since<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        last_fire: Option<&DateTime<Tz>>,
    ) -> Option<DateTime<Tz>> {
        match last_fire {
            Some(last) if last > now => self.next_fire(last),
            _ => self.next_fire(now),
        }
    }

    /// Ejecuta un ciclo respetando el single-flight
    pub async fn run_once(&self) -> NotificationOutcome {
        let outcome = match self.flight.try_begin() {
            Some(_guard) => self.notifier.run(Utc::now()).await,
            None => NotificationOutcome::Skipped,
        };

        match &outcome {
            NotificationOutcome::Sent { herramientas } => {
                info!(outcome = outcome.label(), herramientas, "📧 Recordatorio de herramientas enviado")
            }
            NotificationOutcome::NothingPending => {
                info!(outcome = outcome.label(), "✅ Sin herramientas pendientes, no se envía correo")
            }
            NotificationOutcome::Skipped => {
                warn!(outcome = outcome.label(), "⏭️ Ciclo omitido: el anterior sigue en curso")
            }
            NotificationOutcome::Failed { etapa, error } => {
                error!(outcome = outcome.label(), ?etapa, %error, "❌ Ciclo de notificación fallido")
            }
        }
        self.metrics.record(&outcome);
        outcome
    }

    /// Arranca el loop de fondo; abortar el handle lo detiene
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        for trigger in &self.triggers {
            info!("⏰ Recordatorio programado: '{}'", trigger.expression());
        }

        tokio::spawn(async move {
            let mut last_fire: Option<DateTime<Local>> = None;
            loop {
                let now = Local::now();
                let Some(next) = self.next_fire_since(&now, last_fire.as_ref()) else {
                    error!("❌ Ningún trigger produce un próximo disparo; scheduler detenido");
                    return;
                };

                let wait = (next - now).to_std().unwrap_or_default();
                info!(next = %next.to_rfc3339(), "⏳ Próximo recordatorio");
                tokio::time::sleep(wait).await;
                last_fire = Some(next);

                let scheduler = self.clone();
                tokio::spawn(async move {
                    scheduler.run_once().await;
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::{AsignacionHerramienta, Herramienta};
    use crate::repositories::ToolStore;
    use crate::services::notification_service::tests::RecordingMailer;
    use crate::utils::errors::AppResult;
    use async_trait::async_trait;
    use prometheus::Registry;
    use tokio::sync::Notify;
    use uuid::Uuid;

    /// Store que bloquea la consulta hasta recibir `release`
    struct BlockingStore {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ToolStore for BlockingStore {
        async fn find_tools_in_use(&self) -> AppResult<Vec<Herramienta>> {
            self.release.notified().await;
            Ok(vec![])
        }
        async fn find_tools_with_history(&self) -> AppResult<Vec<Herramienta>> {
            Ok(vec![])
        }
        async fn assign(&self, _: Uuid, _: Uuid, _: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
            unreachable!()
        }
        async fn return_tool(&self, _: Uuid, _: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
            unreachable!()
        }
    }

    fn scheduler(store: Arc<dyn ToolStore>) -> (Arc<NotificationScheduler>, NotificationMetrics) {
        let metrics = NotificationMetrics::register(&Registry::new()).unwrap();
        let notifier = Arc::new(PendingToolsNotifier::new(
            store,
            Arc::new(RecordingMailer::default()),
            "ops@example.com".into(),
        ));
        let triggers = vec!["50 16 * * 1-5".parse().unwrap(), "0 12 * * 6".parse().unwrap()];
        (Arc::new(NotificationScheduler::new(triggers, notifier, metrics.clone())), metrics)
    }

    #[test]
    fn test_single_flight_guard() {
        let flight = SingleFlight::default();
        let guard = flight.try_begin();
        assert!(guard.is_some());
        assert!(flight.try_begin().is_none());
        drop(guard);
        assert!(flight.try_begin().is_some());
    }

    #[test]
    fn test_next_fire_picks_earliest_trigger() {
        let release = Arc::new(Notify::new());
        let (scheduler, _) = scheduler(Arc::new(BlockingStore { release }));

        // sábado 25/05/2024 08:00 -> sábado 12:00
        let saturday = Utc.with_ymd_and_hms(2024, 5, 25, 8, 0, 0).unwrap();
        assert_eq!(scheduler.next_fire(&saturday), Some(Utc.with_ymd_and_hms(2024, 5, 25, 12, 0, 0).unwrap()));

        // sábado 13:00 -> lunes 16:50
        let after_noon = Utc.with_ymd_and_hms(2024, 5, 25, 13, 0, 0).unwrap();
        assert_eq!(scheduler.next_fire(&after_noon), Some(Utc.with_ymd_and_hms(2024, 5, 27, 16, 50, 0).unwrap()));
    }

    #[test]
    fn test_clock_stepping_back_does_not_repeat_fire() {
        let release = Arc::new(Notify::new());
        let (scheduler, _) = scheduler(Arc::new(BlockingStore { release }));

        // lunes 20/05/2024 16:50 ya disparó; el reloj vuelve a las 16:45
        let last_fire = Utc.with_ymd_and_hms(2024, 5, 20, 16, 50, 0).unwrap();
        let stepped_back = Utc.with_ymd_and_hms(2024, 5, 20, 16, 45, 0).unwrap();

        assert_eq!(scheduler.next_fire(&stepped_back), Some(last_fire));
        assert_eq!(
            scheduler.next_fire_since(&stepped_back, Some(&last_fire)),
            Some(Utc.with_ymd_and_hms(2024, 5, 21, 16, 50, 0).unwrap())
        );
        assert_eq!(scheduler.next_fire_since(&stepped_back, None), Some(last_fire));
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let release = Arc::new(Notify::new());
        let (scheduler, metrics) = scheduler(Arc::new(BlockingStore { release: release.clone() }));

        let first = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run_once().await })
        };

        while !scheduler.flight.is_running() {
            tokio::task::yield_now().await;
        }

        assert_eq!(scheduler.run_once().await, NotificationOutcome::Skipped);

        release.notify_one();
        assert_eq!(first.await.unwrap(), NotificationOutcome::NothingPending);
        assert!(!scheduler.flight.is_running());
        assert_eq!(metrics.count("skipped"), 1);
        assert_eq!(metrics.count("nothing_pending"), 1);
    }
}
