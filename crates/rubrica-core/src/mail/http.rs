//! Mail relay client

use std::time::Duration;

use super::{Mailer, OutboundEmail};
use crate::error::{RubricaError, Result};

/// Posts each message as JSON to a transactional mail relay
pub struct HttpMailer {
    url: String,
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpMailer {
    pub fn new(url: &str, timeout_secs: u64) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs.clamp(1, 300))))
            .build()
            .into();

        Self {
            url: url.to_string(),
            agent,
            user_agent: format!(
                "rubrica/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
        }
    }
}

impl Mailer for HttpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<()> {
        let body = serde_json::to_string(&email.to_payload()?)?;

        let response = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .send(body.as_bytes());

        match response {
            Ok(_) => {
                tracing::info!(to = %email.to, subject = %email.subject, "mail_relayed");
                Ok(())
            }
            Err(ureq::Error::StatusCode(code)) => {
                tracing::warn!(code, to = %email.to, "mail_relay_rejected");
                Err(RubricaError::Mail(format!("relay returned HTTP {}", code)))
            }
            Err(e) => Err(RubricaError::Mail(format!("transport error: {}", e))),
        }
    }
}
