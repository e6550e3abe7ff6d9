//! File-based outbox

use std::fs;
use std::path::{Path, PathBuf};

use super::{Mailer, OutboundEmail};
use crate::error::{RubricaError, Result};

/// Writes one `<ulid>-<subject-slug>.json` file per message
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Messages currently in the outbox, oldest first
    pub fn messages(&self) -> Result<Vec<serde_json::Value>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .iter()
            .map(|p| {
                let content = fs::read_to_string(p)?;
                Ok(serde_json::from_str(&content)?)
            })
            .collect()
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, email: &OutboundEmail) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| RubricaError::Mail(format!("cannot create outbox: {}", e)))?;

        let name = format!(
            "{}-{}.json",
            ulid::Ulid::new().to_string().to_lowercase(),
            slug::slugify(&email.subject)
        );
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(&email.to_payload()?)?;
        fs::write(&path, body)
            .map_err(|e| RubricaError::Mail(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::info!(to = %email.to, path = %path.display(), "mail_queued");
        Ok(())
    }
}
