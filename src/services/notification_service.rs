//! Notificación por correo de herramientas pendientes
//!
//! Renderiza la lista de pendientes como una tabla HTML y la envía en un
//! único correo al operador configurado. El transporte se inyecta mediante
//! el trait `Mailer`; en producción es `SmtpMailer` (lettre).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{error, info};

use crate::config::environment::SmtpConfig;
use crate::dto::tool_dto::PendingTool;
use crate::repositories::ToolStore;
use crate::services::pending_tools_service::get_pending_tools;

pub const ASUNTO_RECORDATORIO: &str = "Recordatorio: Herramientas Pendientes de Devolución";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Dirección de correo inválida '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("No se pudo construir el correo: {0}")]
    Build(String),

    #[error("Error de transporte SMTP: {0}")]
    Transport(String),
}

/// Transporte de correo
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), NotificationError>;
}

/// Envío por SMTP con lettre. El transporte se construye una sola vez.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let from: Mailbox = config.from.parse().map_err(|e: lettre::address::AddressError| {
            NotificationError::InvalidAddress { address: config.from.clone(), reason: e.to_string() }
        })?;

        // 465 es TLS implícito; cualquier otro puerto negocia STARTTLS
        let builder = (if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        })
        .map_err(|e| NotificationError::Transport(format!("SMTP relay: {e}")))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), NotificationError> {
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            NotificationError::InvalidAddress { address: to.to_string(), reason: e.to_string() }
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        info!("📤 Correo enviado a: {to}");
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fecha de calendario en la zona horaria local, formato dd/mm/aaaa
pub fn formatear_fecha(fecha: DateTime<Utc>) -> String {
    fecha.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

/// Tabla HTML con una fila por herramienta pendiente
pub fn render_pending_tools_html(pendientes: &[PendingTool]) -> String {
    let filas: String = pendientes
        .iter()
        .map(|p| {
            format!(
                "<tr class=\"pendiente\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"dias\">{}</td></tr>\n",
                escape_html(&p.nombre),
                escape_html(&p.sku),
                escape_html(&p.empleado),
                formatear_fecha(p.fecha_asignacion),
                p.dias_en_uso,
            )
        })
        .collect();

    format!(
        r#"<h2>Herramientas pendientes de devolución</h2>
<p>Las siguientes herramientas siguen asignadas y no han sido devueltas:</p>
<table border="1" cellpadding="6" cellspacing="0">
<thead><tr><th>Herramienta</th><th>SKU</th><th>Empleado</th><th>Fecha de asignación</th><th>Días en uso</th></tr></thead>
<tbody>
{filas}</tbody>
</table>
"#
    )
}

/// Etapa del ciclo en la que ocurrió el fallo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Etapa {
    Consulta,
    Envio,
}

/// Resultado estructurado de un ciclo de notificación
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { herramientas: usize },
    NothingPending,
    Skipped,
    Failed { etapa: Etapa, error: String },
}

impl NotificationOutcome {
    /// Etiqueta usada en logs y métricas
    pub fn label(&self) -> &'static str {
        match self {
            NotificationOutcome::Sent { .. } => "sent",
            NotificationOutcome::NothingPending => "nothing_pending",
            NotificationOutcome::Skipped => "skipped",
            NotificationOutcome::Failed { etapa: Etapa::Consulta, .. } => "query_failed",
            NotificationOutcome::Failed { etapa: Etapa::Envio, .. } => "send_failed",
        }
    }
}

/// Consulta pendientes y envía el recordatorio
pub struct PendingToolsNotifier {
    store: Arc<dyn ToolStore>,
    mailer: Arc<dyn Mailer>,
    destinatario: String,
}

impl PendingToolsNotifier {
    pub fn new(store: Arc<dyn ToolStore>, mailer: Arc<dyn Mailer>, destinatario: String) -> Self {
        Self { store, mailer, destinatario }
    }

    /// Envía el correo; no hace nada si la lista está vacía.
    /// Devuelve `true` si se envió.
    pub async fn notify(&self, pendientes: &[PendingTool]) -> Result<bool, NotificationError> {
        if pendientes.is_empty() {
            return Ok(false);
        }
        let html = render_pending_tools_html(pendientes);
        self.mailer.send_html(&self.destinatario, ASUNTO_RECORDATORIO, html).await?;
        Ok(true)
    }

    /// Un ciclo completo: consulta y envío. Nunca reintenta.
    pub async fn run(&self, now: DateTime<Utc>) -> NotificationOutcome {
        let pendientes = match get_pending_tools(self.store.as_ref(), now).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "❌ Error consultando herramientas pendientes");
                return NotificationOutcome::Failed { etapa: Etapa::Consulta, error: e.to_string() };
            }
        };

        match self.notify(&pendientes).await {
            Ok(true) => NotificationOutcome::Sent { herramientas: pendientes.len() },
            Ok(false) => NotificationOutcome::NothingPending,
            Err(e) => {
                error!(error = %e, destinatario = %self.destinatario, "❌ Error enviando recordatorio");
                NotificationOutcome::Failed { etapa: Etapa::Envio, error: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::tool::{AsignacionHerramienta, Herramienta};
    use crate::utils::errors::{AppError, AppResult};
    use chrono::Duration;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Transport("conexión rechazada".into()));
            }
            self.sent.lock().await.push((to.to_string(), subject.to_string(), html));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ToolStore for FailingStore {
        async fn find_tools_in_use(&self) -> AppResult<Vec<Herramienta>> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_tools_with_history(&self) -> AppResult<Vec<Herramienta>> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn assign(&self, _: Uuid, _: Uuid, _: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn return_tool(&self, _: Uuid, _: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn pendiente(nombre: &str, sku: &str, dias: i64) -> PendingTool {
        PendingTool {
            herramienta_id: Uuid::new_v4(),
            nombre: nombre.into(),
            sku: sku.into(),
            empleado: "Ana Ruiz".into(),
            fecha_asignacion: Utc::now() - Duration::days(dias),
            dias_en_uso: dias,
        }
    }

    fn dias_de_fila(html: &str, nombre: &str) -> i64 {
        let fila = html
            .lines()
            .find(|l| l.contains("class=\"pendiente\"") && l.contains(&format!("<td>{}</td>", nombre)))
            .expect("fila no encontrada");
        let inicio = fila.find("class=\"dias\">").expect("celda de días") + "class=\"dias\">".len();
        let fin = fila[inicio..].find('<').expect("cierre de celda") + inicio;
        fila[inicio..fin].parse().expect("número de días")
    }

    #[test]
    fn test_render_two_rows() {
        let html = render_pending_tools_html(&[pendiente("Drill", "100", 2), pendiente("Saw", "200", 9)]);
        assert_eq!(html.matches("class=\"pendiente\"").count(), 2);
        assert!(dias_de_fila(&html, "Saw") > dias_de_fila(&html, "Drill"));
    }

    #[test]
    fn test_render_escapes_html() {
        let html = render_pending_tools_html(&[pendiente("<script>", "1&2", 1)]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("1&amp;2"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_date_format() {
        let fecha = formatear_fecha(Utc::now());
        assert_eq!(fecha.len(), 10);
        assert_eq!(fecha.matches('/').count(), 2);
    }

    #[tokio::test]
    async fn test_empty_list_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = PendingToolsNotifier::new(Arc::new(FailingStore), mailer.clone(), "ops@example.com".into());

        assert!(!notifier.notify(&[]).await.unwrap());
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_notify_sends_single_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = PendingToolsNotifier::new(Arc::new(FailingStore), mailer.clone(), "ops@example.com".into());

        assert!(notifier.notify(&[pendiente("Drill", "100", 2), pendiente("Saw", "200", 9)]).await.unwrap());

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ops@example.com");
        assert_eq!(sent[0].1, ASUNTO_RECORDATORIO);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_not_swallowed() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = PendingToolsNotifier::new(Arc::new(FailingStore), mailer.clone(), "ops@example.com".into());

        let outcome = notifier.run(Utc::now()).await;
        assert!(matches!(outcome, NotificationOutcome::Failed { etapa: Etapa::Consulta, .. }));
        assert_eq!(outcome.label(), "query_failed");
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let notifier = PendingToolsNotifier::new(Arc::new(FailingStore), mailer, "ops@example.com".into());

        let result = notifier.notify(&[pendiente("Drill", "100", 2)]).await;
        assert!(matches!(result, Err(NotificationError::Transport(_))));
    }
}
