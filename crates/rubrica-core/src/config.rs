//! Store configuration for rubrica
//!
//! Configuration is stored in `.rubrica/config.toml`. A missing file means
//! defaults; a few settings can be overridden from the environment.

pub mod types;

use std::fs;
use std::path::Path;

use crate::error::{RubricaError, Result};

pub use types::{
    AccountsConfig, GradingConfig, MailConfig, RecoveryConfig, StoreConfig, MAX_PERCENTAGE,
    STORE_FORMAT_VERSION,
};

/// Environment variable overriding the mail relay endpoint
pub const MAIL_ENDPOINT_ENV: &str = "RUBRICA_MAIL_ENDPOINT";

impl StoreConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&content)?;

        if config.recovery.code_length == 0 || config.recovery.code_length > 12 {
            return Err(RubricaError::invalid_value(
                "recovery.code_length",
                config.recovery.code_length,
            ));
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RubricaError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var(MAIL_ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                self.mail.endpoint = endpoint;
            }
        }
        self
    }
}
