//! Rubric templates: a two-level tree of topics holding weighted criteria
//!
//! The same shape serves two purposes. A template defines structure (scores
//! zero or unset); a filled instance, stored as a grade snapshot, carries the
//! scores a teacher entered. Wire names from the legacy JSON documents
//! (`nombre`, `temas`, `criterios`, `peso`, ...) are accepted as aliases.

pub mod clone;
pub mod lifecycle;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RubricaError, Result};

pub use clone::{clone_template, TemplateBuilder, TemplateData, COPY_SUFFIX};
pub use lifecycle::{plan_guide_assignment, GuidePlan, Scope};

/// Lifecycle state of a rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RubricState {
    /// Being edited; visible to its creator only
    #[default]
    #[serde(alias = "borrador")]
    Draft,
    /// Current guide of a scope
    #[serde(alias = "activo")]
    Active,
    /// Superseded guide
    #[serde(alias = "inactivo")]
    Inactive,
}

impl RubricState {
    pub fn as_str(self) -> &'static str {
        match self {
            RubricState::Draft => "draft",
            RubricState::Active => "active",
            RubricState::Inactive => "inactive",
        }
    }
}

impl fmt::Display for RubricState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RubricState {
    type Err = RubricaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "draft" | "borrador" => Ok(RubricState::Draft),
            "active" | "activo" => Ok(RubricState::Active),
            "inactive" | "inactivo" => Ok(RubricState::Inactive),
            other => Err(RubricaError::invalid_value("rubric state", other)),
        }
    }
}

/// One weighted line of a topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(default, alias = "criterio")]
    pub label: String,

    /// Share of the topic, intended 0-100
    #[serde(default, alias = "peso", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Grade given; only meaningful in a filled instance
    #[serde(default, alias = "calificacion", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// weight x score
    #[serde(default, alias = "acumulado", skip_serializing_if = "Option::is_none")]
    pub accumulated: Option<f64>,

    #[serde(default, alias = "observaciones")]
    pub remarks: String,
}

impl Criterion {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight: Some(weight),
            score: Some(0.0),
            accumulated: Some(0.0),
            remarks: String::new(),
        }
    }

    /// Same criterion with a score filled in
    pub fn scored(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// weight x score, with missing values counted as 0
    pub fn contribution(&self) -> f64 {
        self.weight.unwrap_or(0.0) * self.score.unwrap_or(0.0)
    }
}

/// A named group of criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(default, alias = "nombre")]
    pub name: String,

    #[serde(default, alias = "criterios", alias = "rows")]
    pub criteria: Vec<Criterion>,
}

impl Topic {
    pub fn new(name: impl Into<String>, criteria: Vec<Criterion>) -> Self {
        Self {
            name: name.into(),
            criteria,
        }
    }

    /// Recompute every criterion's accumulated value from weight and score
    pub fn fill_accumulated(&mut self) {
        for criterion in &mut self.criteria {
            criterion.accumulated = Some(criterion.contribution());
        }
    }
}

/// A stored rubric template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: String,
    pub name: String,
    pub state: RubricState,
    /// Creating teacher, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Rubric {
    /// Number of criteria across all topics
    pub fn criteria_count(&self) -> usize {
        self.topics.iter().map(|t| t.criteria.len()).sum()
    }
}

/// Input for creating a rubric template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRubric {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "temas")]
    pub topics: Vec<Topic>,
}

impl NewRubric {
    /// Reject structurally malformed input; numeric gaps are fine
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RubricaError::missing_field("name"));
        }
        Ok(())
    }
}

impl From<TemplateData> for NewRubric {
    fn from(data: TemplateData) -> Self {
        Self {
            name: data.name,
            topics: data.topics,
        }
    }
}
