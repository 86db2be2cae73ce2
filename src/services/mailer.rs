//! Outbound email.
//!
//! [`Mailer`] is implemented by [`ResendMailer`] (Resend HTTP API) and by
//! [`LogMailer`], which only logs and is selected in development when no API
//! key is configured.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::MailSettings;
use crate::error::{AppError, AppResult};
use crate::models::{CaseDescription, CaseNumber, CaseStatus};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
/// HTTP connect timeout for the mail provider.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for the mail provider.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// A rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct ResendSendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends mail through the Resend HTTP API.
pub struct ResendMailer {
    http_client: reqwest::Client,
    api_key: SecretString,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: SecretString, from: String) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Delivery(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutboundEmail) -> AppResult<()> {
        let body = ResendSendEmailBody {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .http_client
            .post(RESEND_ENDPOINT)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("User-Agent", "mesa-partes")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(AppError::Delivery(format!(
            "Resend send failed (status={}): {}",
            status, detail
        )))
    }
}

/// Development mailer: logs the recipient and subject, never the body.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> AppResult<()> {
        info!(
            target: "mail",
            to = %email.to,
            subject = %email.subject,
            "Email not sent (log-only mailer)"
        );
        Ok(())
    }
}

/// Pick the mailer for the configured settings.
pub fn from_settings(settings: &MailSettings) -> AppResult<Box<dyn Mailer>> {
    match settings.resend_api_key {
        Some(ref key) => Ok(Box::new(ResendMailer::new(
            key.clone(),
            settings.from.clone(),
        )?)),
        None => {
            warn!("RESEND_API_KEY not set: emails will only be logged");
            Ok(Box::new(LogMailer))
        }
    }
}

/// Escape text for interpolation into HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

const FOOTER_HTML: &str = r#"<hr style="border:none;border-top:1px solid #e5e7eb;margin:30px 0;">
<p style="color:#9ca3af;font-size:12px;text-align:center;">Mesa de Partes Virtual<br>Este es un correo automático, por favor no responder.</p>"#;

/// Verification code email.
pub fn verification_email(to: &str, full_name: &str, code: &str, ttl_minutes: i64) -> OutboundEmail {
    let name = escape_html(full_name);
    let html = format!(
        r#"<div style="font-family:Arial,sans-serif;max-width:600px;margin:0 auto;padding:20px;">
<h1 style="color:#1e40af;text-align:center;">Mesa de Partes Virtual</h1>
<h2 style="color:#1e40af;">Código de Verificación</h2>
<p>Hola <strong>{name}</strong>,</p>
<p>Has iniciado el proceso de envío de documento a mesa de partes. Tu código de verificación es:</p>
<div style="background:#eff6ff;padding:30px;text-align:center;border-radius:8px;border:2px solid #1e40af;">
<span style="color:#1e40af;font-size:48px;letter-spacing:10px;font-family:monospace;">{code}</span>
</div>
<p style="color:#dc2626;font-weight:bold;">Este código expira en {ttl_minutes} minutos.</p>
<p style="color:#6b7280;font-size:14px;">Si no solicitaste este código, puedes ignorar este mensaje.</p>
{FOOTER_HTML}
</div>"#
    );
    let text = format!(
        "Hola {full_name},\n\n\
         Tu código de verificación para Mesa de Partes Virtual es: {code}\n\n\
         Este código expira en {ttl_minutes} minutos.\n\
         Si no solicitaste este código, puedes ignorar este mensaje.\n"
    );

    OutboundEmail {
        to: to.to_string(),
        subject: "Código de Verificación - Mesa de Partes Virtual".to_string(),
        html,
        text,
    }
}

/// Case confirmation email sent after a successful submission.
pub fn confirmation_email(
    to: &str,
    full_name: &str,
    case_number: &CaseNumber,
    description: &CaseDescription,
    public_url: &str,
) -> OutboundEmail {
    let name = escape_html(full_name);
    let subject_line = escape_html(&description.subject);
    let document_type = description.document_type.as_str();
    let documents = description.document_count;
    let folios = description.folio_count;
    let status = CaseStatus::Pending.as_str();
    let link = format!("{}/consultar", public_url.trim_end_matches('/'));

    let html = format!(
        r#"<div style="font-family:Arial,sans-serif;max-width:600px;margin:0 auto;padding:20px;">
<h1 style="color:#059669;">Expediente Creado Exitosamente</h1>
<p>Hola <strong>{name}</strong>,</p>
<p>Tu documento ha sido recibido correctamente en nuestra mesa de partes virtual.</p>
<div style="background:#ecfdf5;border-left:4px solid #059669;padding:20px;">
<p style="margin:0;color:#065f46;"><strong>Número de Expediente:</strong></p>
<h2 style="color:#059669;font-family:monospace;letter-spacing:2px;">{case_number}</h2>
</div>
<h3>Detalles del Expediente:</h3>
<ul>
<li><strong>Tipo de documento:</strong> {document_type}</li>
<li><strong>Asunto:</strong> {subject_line}</li>
<li><strong>Cantidad de documentos:</strong> {documents}</li>
<li><strong>Cantidad de folios:</strong> {folios}</li>
<li><strong>Estado:</strong> {status}</li>
</ul>
<p><strong>Guarda este número de expediente.</strong> Lo necesitarás para consultar el estado de tu trámite en
<a href="{link}" style="color:#1e40af;">{link}</a>.</p>
{FOOTER_HTML}
</div>"#
    );
    let text = format!(
        "Hola {full_name},\n\n\
         Tu documento ha sido recibido correctamente.\n\n\
         Número de Expediente: {case_number}\n\
         Tipo de documento: {document_type}\n\
         Asunto: {}\n\
         Cantidad de documentos: {documents}\n\
         Cantidad de folios: {folios}\n\
         Estado: {status}\n\n\
         Consulta el estado de tu expediente en {link}\n",
        description.subject
    );

    OutboundEmail {
        to: to.to_string(),
        subject: format!("Expediente Creado: {}", case_number),
        html,
        text,
    }
}
