//! Store directory layout and discovery

use std::path::{Path, PathBuf};

use crate::error::{RubricaError, Result};

/// Default store directory name under a project root
pub const DEFAULT_STORE_DIR: &str = ".rubrica";

/// Configuration file inside the store
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the store directory explicitly
pub const STORE_ENV: &str = "RUBRICA_STORE";

/// Walk up from `start` until a directory containing `.rubrica/` is found
pub fn discover_store(start: &Path) -> Result<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let candidate = dir.join(DEFAULT_STORE_DIR);
        if candidate.is_dir() {
            tracing::debug!(path = %candidate.display(), "discovered store");
            return Ok(candidate);
        }
        current = dir.parent();
    }

    Err(RubricaError::StoreNotFound {
        search_root: start.to_path_buf(),
    })
}
