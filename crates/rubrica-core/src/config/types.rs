//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Current store format version
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Upper bound for a nota percentage
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store format version for compatibility checking
    #[serde(default = "default_version")]
    pub version: u32,

    /// Grade computation settings
    #[serde(default)]
    pub grading: GradingConfig,

    /// One-time recovery code settings
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Teacher account rules
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Outbound mail settings
    #[serde(default)]
    pub mail: MailConfig,
}

/// Grade computation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Refuse notas that push a group's total percentage above 100
    #[serde(default)]
    pub strict_weights: bool,
}

/// One-time recovery code settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Seconds a code stays valid
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: u64,

    /// Number of digits in a code
    #[serde(default = "default_code_length")]
    pub code_length: u32,
}

/// Teacher account rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Required email suffix (e.g. `@correo.itm.edu.co`); none means any domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institutional_domain: Option<String>,

    /// Password strength rules that must hold (out of 5)
    #[serde(default = "default_min_password_rules")]
    pub min_password_rules: usize,
}

/// Outbound mail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// HTTP endpoint of a transactional mail relay (empty = local outbox)
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout for the relay
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,

    /// Outbox directory, relative to the store root
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            grading: GradingConfig::default(),
            recovery: RecoveryConfig::default(),
            accounts: AccountsConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl_secs(),
            code_length: default_code_length(),
        }
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            institutional_domain: None,
            min_password_rules: default_min_password_rules(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: default_mail_from(),
            endpoint: String::new(),
            timeout_secs: default_mail_timeout_secs(),
            outbox_dir: default_outbox_dir(),
        }
    }
}

fn default_version() -> u32 {
    STORE_FORMAT_VERSION
}

fn default_code_ttl_secs() -> u64 {
    600
}

fn default_code_length() -> u32 {
    6
}

fn default_min_password_rules() -> usize {
    4
}

fn default_mail_from() -> String {
    "Soporte Rubricas <no-reply@rubrica.local>".to_string()
}

fn default_mail_timeout_secs() -> u64 {
    30
}

fn default_outbox_dir() -> String {
    "outbox".to_string()
}
