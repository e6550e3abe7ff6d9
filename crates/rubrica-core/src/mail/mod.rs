//! Outbound transactional email
//!
//! Messages are rendered here and handed to a [`Mailer`]. Two mailers exist:
//! [`HttpMailer`] posts to a mail relay, [`OutboxMailer`] drops one JSON file
//! per message into a directory (the default when no relay is configured).

mod http;
mod outbox;

use std::path::Path;

use base64::Engine;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::Result;
use crate::roster::{Group, Student};

pub use http::HttpMailer;
pub use outbox::OutboxMailer;

/// Binary attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// Attachment with MIME type guessed from the file name
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }
}

/// A rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub headers: Vec<(String, String)>,
    pub attachment: Option<Attachment>,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content_type: &'a str,
    content_base64: String,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
    headers: Vec<(&'a str, &'a str)>,
    attachments: Vec<AttachmentPayload<'a>>,
}

impl OutboundEmail {
    /// JSON body understood by the relay and written to the outbox
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        let payload = EmailPayload {
            from: &self.from,
            to: &self.to,
            subject: &self.subject,
            text: &self.text,
            html: &self.html,
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            attachments: self
                .attachment
                .iter()
                .map(|a| AttachmentPayload {
                    filename: &a.filename,
                    content_type: &a.content_type,
                    content_base64: base64::engine::general_purpose::STANDARD.encode(&a.data),
                })
                .collect(),
        };
        Ok(serde_json::to_value(payload)?)
    }
}

/// Delivery seam for outbound email
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Pick the relay when configured, otherwise the outbox under `store_root`
pub fn mailer_from_config(config: &MailConfig, store_root: &Path) -> Box<dyn Mailer> {
    if config.endpoint.is_empty() {
        Box::new(OutboxMailer::new(store_root.join(&config.outbox_dir)))
    } else {
        Box::new(HttpMailer::new(&config.endpoint, config.timeout_secs))
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Recovery code message
pub fn recovery_code_email(from: &str, to: &str, code: &str, ttl_secs: u64) -> OutboundEmail {
    let minutes = ttl_secs.div_ceil(60);
    OutboundEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Código de recuperación de cuenta".to_string(),
        text: format!("Tu código de recuperación es: {}", code),
        html: format!(
            concat!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">",
                "<h2>Recuperación de cuenta</h2>",
                "<p>Hemos recibido una solicitud para recuperar tu cuenta.</p>",
                "<p style=\"font-size: 18px;\">Tu código de verificación es: <strong>{}</strong></p>",
                "<p>Este código expirará en {} minutos.</p>",
                "<p style=\"font-size: 12px;\">Si no solicitaste este código, ignora este mensaje.</p>",
                "</div>"
            ),
            escape_html(code),
            minutes
        ),
        headers: vec![
            ("X-Priority".to_string(), "1".to_string()),
            ("Importance".to_string(), "High".to_string()),
        ],
        attachment: None,
    }
}

/// Grade report for one student of a group
pub fn grade_report_email(
    from: &str,
    group: &Group,
    student: &Student,
    attachment: Option<Attachment>,
) -> OutboundEmail {
    let mut rows_text = String::new();
    let mut rows_html = String::new();

    for nota in &group.notas {
        let final_score = student
            .grade_for(&nota.rubric_id)
            .map(|c| format!("{:.2}", c.final_score))
            .unwrap_or_else(|| "-".to_string());
        rows_text.push_str(&format!(
            "Nota {} ({}%): {}\n",
            nota.number, nota.percentage, final_score
        ));
        rows_html.push_str(&format!(
            "<tr><td>Nota {}</td><td>{}%</td><td>{}</td></tr>",
            nota.number, nota.percentage, final_score
        ));
    }

    OutboundEmail {
        from: from.to_string(),
        to: student.email.clone(),
        subject: format!("Calificaciones - {}", group.name),
        text: format!(
            "Hola {},\n\n{}\nPromedio: {:.2}\n",
            student.name, rows_text, student.average
        ),
        html: format!(
            concat!(
                "<div style=\"font-family: Arial, sans-serif;\">",
                "<h2>Calificaciones de {}</h2>",
                "<p>Hola {},</p>",
                "<table><tr><th>Nota</th><th>Peso</th><th>Resultado</th></tr>{}</table>",
                "<p><strong>Promedio: {:.2}</strong></p>",
                "</div>"
            ),
            escape_html(&group.name),
            escape_html(&student.name),
            rows_html,
            student.average
        ),
        headers: Vec::new(),
        attachment,
    }
}
