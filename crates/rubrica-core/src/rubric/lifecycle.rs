//! Rubric lifecycle: draft -> active -> inactive
//!
//! A rubric becomes active when it is assigned as the guide of a scope. The
//! guide it replaces in that scope becomes inactive in the same commit. An
//! inactive rubric only returns to active through an explicit reassignment.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RubricState;
use crate::error::{RubricaError, Result};

/// A course or group a rubric can guide
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Scope {
    Course(String),
    Group(String),
}

impl Scope {
    pub fn id(&self) -> &str {
        match self {
            Scope::Course(id) | Scope::Group(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scope::Course(_) => "course",
            Scope::Group(_) => "group",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

impl RubricState {
    /// Check a single state change
    pub fn transition(self, to: RubricState) -> Result<RubricState> {
        let allowed = matches!(
            (self, to),
            (RubricState::Draft, RubricState::Active)
                | (RubricState::Active, RubricState::Inactive)
                | (RubricState::Inactive, RubricState::Active)
        ) || self == to;

        if allowed {
            Ok(to)
        } else {
            Err(RubricaError::invalid_value(
                "rubric state transition",
                format!("{} -> {}", self, to),
            ))
        }
    }
}

/// Writes needed to make `target` the guide of a scope
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuidePlan {
    /// Guides of the scope that must go inactive first
    pub deactivate: Vec<String>,
    /// Rubric to mark active, unless it already is
    pub activate: Option<String>,
    /// Whether the scope's guide set still lacks the target
    pub register: bool,
}

impl GuidePlan {
    pub fn is_noop(&self) -> bool {
        self.deactivate.is_empty() && self.activate.is_none() && !self.register
    }
}

/// Plan the guide assignment of `target` given the scope's current guides.
///
/// `scope_guides` lists every rubric registered in the scope with its state.
/// All active guides other than the target are deactivated, which also heals
/// a scope that somehow ended up with more than one.
pub fn plan_guide_assignment(
    target_id: &str,
    target_state: RubricState,
    scope_guides: &[(String, RubricState)],
) -> GuidePlan {
    let deactivate = scope_guides
        .iter()
        .filter(|(id, state)| id != target_id && *state == RubricState::Active)
        .map(|(id, _)| id.clone())
        .collect();

    let activate = (target_state != RubricState::Active).then(|| target_id.to_string());
    let register = !scope_guides.iter().any(|(id, _)| id == target_id);

    GuidePlan {
        deactivate,
        activate,
        register,
    }
}
