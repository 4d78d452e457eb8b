use anyhow::{Context, Result};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use control_flota::config::{database::DatabaseConfig, EnvironmentConfig};
use control_flota::database::{connect, run_migrations};
use control_flota::metrics::NotificationMetrics;
use control_flota::repositories::{EntryExitRepository, ToolRepository};
use control_flota::routes::build_app;
use control_flota::scheduler::{CalendarTrigger, NotificationScheduler};
use control_flota::services::notification_service::{PendingToolsNotifier, SmtpMailer};
use control_flota::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚚 Control de Flota - Entradas/Salidas y Herramientas");
    info!("=====================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);

    // Inicializar base de datos
    let pool = match connect(&DatabaseConfig::new(config.database_url.clone())).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };
    run_migrations(&pool).await?;

    let entries = Arc::new(EntryExitRepository::new(pool.clone()));
    let tools = Arc::new(ToolRepository::new(pool));

    let registry = Registry::new();
    let metrics = NotificationMetrics::register(&registry).context("No se pudieron registrar las métricas")?;

    // Recordatorio de herramientas pendientes
    let scheduler_handle = if config.notifications.enabled {
        Some(start_scheduler(&config, tools.clone(), metrics)?)
    } else {
        warn!("🔕 Recordatorio de herramientas deshabilitado (NOTIFICATIONS_ENABLED=false)");
        None
    };

    let app_state = AppState::new(entries, tools, registry);
    let app = build_app(app_state, &config);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   GET  /metrics - Métricas Prometheus");
    info!("🚗 Entradas/Salidas:");
    info!("   GET    /api/entrada-salida - Listar registros");
    info!("   POST   /api/entrada-salida - Crear registro");
    info!("   PUT    /api/entrada-salida/:id - Actualizar registro");
    info!("   DELETE /api/entrada-salida/:id - Eliminar registro");
    info!("🔧 Herramientas:");
    info!("   GET  /api/herramientas/pendientes - Herramientas en uso");
    info!("   POST /api/herramientas/:id/asignar - Asignar herramienta");
    info!("   POST /api/herramientas/:id/devolver - Devolver herramienta");
    info!("📊 Reportes:");
    info!("   GET  /api/reportes/tiempo-promedio-uso - Tiempo promedio de uso");
    info!("   GET  /api/reportes/top-usuarios - Empleados con más préstamos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = scheduler_handle {
        handle.abort();
        info!("⏹️ Scheduler de recordatorios detenido");
    }

    if let Err(e) = served {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

fn start_scheduler(
    config: &EnvironmentConfig,
    tools: Arc<ToolRepository>,
    metrics: NotificationMetrics,
) -> Result<JoinHandle<()>> {
    let notifications = &config.notifications;

    let triggers = [&notifications.cron_weekdays, &notifications.cron_saturday]
        .into_iter()
        .map(|expr| expr.parse::<CalendarTrigger>())
        .collect::<Result<Vec<_>, _>>()?;

    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let notifier = Arc::new(PendingToolsNotifier::new(tools, mailer, notifications.recipient.clone()));
    let scheduler = Arc::new(NotificationScheduler::new(triggers, notifier, metrics));

    info!("📧 Recordatorios a {} vía {}:{}", notifications.recipient, config.smtp.host, config.smtp.port);
    Ok(scheduler.spawn())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
