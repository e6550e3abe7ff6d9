//! Identifier generation for rubrica entities
//!
//! IDs are `<prefix><ulid>` in lowercase, e.g. `rb-01hv3k...`. Students are
//! keyed by email inside their group and notas by sequence number, so they
//! carry no generated id.

use crate::error::{RubricaError, Result};

/// Kind of entity an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Teacher,
    Course,
    Group,
    Rubric,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Teacher => "dc-",
            IdKind::Course => "cu-",
            IdKind::Group => "gr-",
            IdKind::Rubric => "rb-",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IdKind::Teacher => "teacher",
            IdKind::Course => "course",
            IdKind::Group => "group",
            IdKind::Rubric => "rubric",
        }
    }
}

/// Generate a fresh identifier for the given kind
pub fn generate(kind: IdKind) -> String {
    format!(
        "{}{}",
        kind.prefix(),
        ulid::Ulid::new().to_string().to_lowercase()
    )
}

/// Check that `id` looks like an identifier of `kind`
pub fn validate(kind: IdKind, id: &str) -> Result<()> {
    let suffix = id
        .strip_prefix(kind.prefix())
        .ok_or_else(|| RubricaError::invalid_value(&format!("{} id", kind.label()), id))?;

    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RubricaError::invalid_value(
            &format!("{} id", kind.label()),
            id,
        ));
    }

    Ok(())
}
