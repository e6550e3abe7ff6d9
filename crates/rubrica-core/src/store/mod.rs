//! Store management for rubrica
//!
//! The store is the directory holding all rubrica data: `config.toml`, the
//! SQLite database and the mail outbox. Default location: `.rubrica/`.
//!
//! Operations are grouped by area in the submodules; each one opens at most
//! one transaction and returns plain records.

mod accounts;
mod courses;
mod grading;
mod groups;
pub mod paths;
mod report;
mod rubrics;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::db::Database;
use crate::error::{RubricaError, Result};
use crate::mail::{mailer_from_config, Mailer};
use crate::roster::Teacher;

pub use accounts::RecoveryRequest;
pub use courses::{MembershipChange, NewCourse};
pub use grading::{GradeSubmission, NotaChange, RecordedGrade, StudentGrade};
pub use groups::{EnrolmentChange, NewGroup, StudentUpdate};
pub use paths::{CONFIG_FILE, DEFAULT_STORE_DIR, STORE_ENV};
pub use report::ReportDelivery;
pub use rubrics::GuideAssignment;

/// The rubrica store
pub struct Store {
    /// Root path of the store
    root: PathBuf,
    /// Store configuration
    config: StoreConfig,
    /// SQLite database
    db: Database,
    /// Outbound mail
    mailer: Box<dyn Mailer>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Discover a store by walking up from the given directory
    pub fn discover(start: &Path) -> Result<Self> {
        let store_path = paths::discover_store(start)?;
        Self::open(&store_path)
    }

    /// Open an existing store at the given path
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(RubricaError::StoreNotFound {
                search_root: path.to_path_buf(),
            });
        }

        let config_path = path.join(CONFIG_FILE);
        let config = if config_path.exists() {
            StoreConfig::load(&config_path)?
        } else {
            StoreConfig::default()
        }
        .with_env_overrides();

        let db = Database::open(path)?;
        let mailer = mailer_from_config(&config.mail, path);

        Ok(Store {
            root: path.to_path_buf(),
            config,
            db,
            mailer,
        })
    }

    /// Initialize a new store under the given project root
    pub fn init(project_root: &Path) -> Result<Self> {
        Self::init_at(&project_root.join(DEFAULT_STORE_DIR))
    }

    /// Initialize a store at an explicit path; existing data is kept
    pub fn init_at(store_root: &Path) -> Result<Self> {
        fs::create_dir_all(store_root)?;

        let config_path = store_root.join(CONFIG_FILE);
        if !config_path.exists() {
            StoreConfig::default().save(&config_path)?;
            tracing::info!(path = %store_root.display(), "initialized store");
        }

        Self::open(store_root)
    }

    /// Replace the mail transport
    pub fn with_mailer(mut self, mailer: Box<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Get the store root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Outbox directory used when no relay is configured
    pub fn outbox_dir(&self) -> PathBuf {
        self.root.join(&self.config.mail.outbox_dir)
    }

    pub(crate) fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Look up a teacher by email for acting on their behalf
    pub fn teacher_by_email(&self, email: &str) -> Result<Teacher> {
        let email = email.trim().to_lowercase();
        crate::db::roster::teacher_by_email(self.db.conn(), &email)?
            .map(|(teacher, _)| teacher)
            .ok_or_else(|| RubricaError::not_found("teacher", email))
    }
}

#[cfg(test)]
mod tests;
