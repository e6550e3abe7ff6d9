//! Detached structural copies of rubric templates
//!
//! Cloning never touches the store. The result has no id; the caller decides
//! whether and when to persist it.

use serde::{Deserialize, Serialize};

use super::{Criterion, Rubric, RubricState, Topic};

/// Suffix appended to the name of a duplicated rubric
pub const COPY_SUFFIX: &str = "(Copy)";

/// Template-shaped data without identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateData {
    pub name: String,
    pub state: RubricState,
    pub topics: Vec<Topic>,
}

/// Builds a [`TemplateData`] from an existing rubric
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    data: TemplateData,
}

impl TemplateBuilder {
    /// Deep copy of the topic/criterion tree.
    ///
    /// Absent numbers become 0 and absent text becomes empty, so the copy is
    /// fully populated even when the source was sparse.
    pub fn from_rubric(source: &Rubric) -> Self {
        Self {
            data: TemplateData {
                name: source.name.clone(),
                state: source.state,
                topics: source.topics.iter().map(copy_topic).collect(),
            },
        }
    }

    /// Append `suffix` to the current name, separated by a space
    pub fn suffix_name(mut self, suffix: &str) -> Self {
        self.data.name = format!("{} {}", self.data.name, suffix);
        self
    }

    pub fn state(mut self, state: RubricState) -> Self {
        self.data.state = state;
        self
    }

    pub fn build(self) -> TemplateData {
        self.data
    }
}

fn copy_topic(topic: &Topic) -> Topic {
    Topic {
        name: topic.name.clone(),
        criteria: topic.criteria.iter().map(copy_criterion).collect(),
    }
}

fn copy_criterion(criterion: &Criterion) -> Criterion {
    Criterion {
        label: criterion.label.clone(),
        weight: Some(criterion.weight.unwrap_or(0.0)),
        score: Some(criterion.score.unwrap_or(0.0)),
        accumulated: Some(criterion.accumulated.unwrap_or(0.0)),
        remarks: criterion.remarks.clone(),
    }
}

/// Plain structural copy: same name, same state, same tree
pub fn clone_template(source: &Rubric) -> TemplateData {
    TemplateBuilder::from_rubric(source).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rubric(topics: Vec<Topic>) -> Rubric {
        Rubric {
            id: "rb-source".into(),
            name: "Proyecto final".into(),
            state: RubricState::Active,
            owner_id: Some("dc-owner".into()),
            topics,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn test_clone_copies_structure() {
        let source = rubric(vec![Topic::new(
            "T1",
            vec![Criterion::new("C1", 50.0)],
        )]);

        let copy = clone_template(&source);
        assert_eq!(copy.name, "Proyecto final");
        assert_eq!(copy.state, RubricState::Active);
        assert_eq!(copy.topics, source.topics);
    }

    #[test]
    fn test_clone_fills_missing_fields() {
        let source = rubric(vec![Topic {
            name: String::new(),
            criteria: vec![Criterion {
                label: "sparse".into(),
                ..Default::default()
            }],
        }]);

        let copy = clone_template(&source);
        let c = &copy.topics[0].criteria[0];
        assert_eq!(c.weight, Some(0.0));
        assert_eq!(c.score, Some(0.0));
        assert_eq!(c.accumulated, Some(0.0));
        assert_eq!(c.remarks, "");
    }

    #[test]
    fn test_clone_empty_topics() {
        let copy = clone_template(&rubric(vec![]));
        assert!(copy.topics.is_empty());
    }

    #[test]
    fn test_builder_duplicate_as_draft() {
        let source = rubric(vec![Topic::new(
            "T1",
            vec![Criterion::new("C1", 50.0).scored(3.0)],
        )]);

        let copy = TemplateBuilder::from_rubric(&source)
            .suffix_name(COPY_SUFFIX)
            .state(RubricState::Draft)
            .build();

        assert_eq!(copy.name, "Proyecto final (Copy)");
        assert_eq!(copy.state, RubricState::Draft);
        assert_eq!(copy.topics[0].criteria[0].weight, Some(50.0));
        assert_eq!(copy.topics[0].criteria[0].score, Some(3.0));
    }

    #[test]
    fn test_clone_is_detached() {
        let source = rubric(vec![Topic::new("T1", vec![Criterion::new("C1", 10.0)])]);
        let mut copy = clone_template(&source);
        copy.topics[0].criteria[0].label = "edited".into();
        assert_eq!(source.topics[0].criteria[0].label, "C1");
    }
}
