//! Rubric templates: creation, cloning, guide assignment and visibility

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use super::Store;
use crate::access::{check_course_moderator, check_rubric_access, RubricAccess};
use crate::db::{roster, rubrics};
use crate::error::{RubricaError, Result};
use crate::id::{self, IdKind};
use crate::roster::{Group, Teacher};
use crate::rubric::{
    plan_guide_assignment, NewRubric, Rubric, RubricState, Scope, TemplateBuilder, TemplateData,
    COPY_SUFFIX,
};

/// What a guide assignment changed
#[derive(Debug, Clone, Serialize)]
pub struct GuideAssignment {
    pub rubric_id: String,
    pub scope: Scope,
    /// Guides of the scope that went inactive
    pub deactivated: Vec<String>,
    /// Whether the target changed state to active
    pub activated: bool,
    /// Whether the rubric was newly added to the scope's guide set
    pub registered: bool,
}

impl GuideAssignment {
    pub fn changed(&self) -> bool {
        self.activated || self.registered || !self.deactivated.is_empty()
    }
}

impl Store {
    pub(crate) fn load_rubric(&self, rubric_id: &str) -> Result<Rubric> {
        rubrics::get(self.db.conn(), rubric_id)?
            .ok_or_else(|| RubricaError::not_found("rubric", rubric_id))
    }

    /// Access of `actor` to `rubric`, joined from their courses and groups
    pub(crate) fn rubric_access(&self, actor: &Teacher, rubric: &Rubric) -> Result<RubricAccess> {
        let conn = self.db.conn();
        let courses = roster::courses_of_teacher(conn, &actor.id)?;
        let mut groups: Vec<Group> = Vec::new();
        for course in &courses {
            groups.extend(roster::groups_of_course(conn, &course.id, None)?);
        }
        check_rubric_access(rubric, &actor.id, &courses, &groups)
    }

    /// Store a new draft template owned by `actor`
    #[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub fn create_rubric(&self, actor: &Teacher, input: NewRubric) -> Result<Rubric> {
        input.validate()?;

        let now = Utc::now();
        let rubric = Rubric {
            id: id::generate(IdKind::Rubric),
            name: input.name.trim().to_string(),
            state: RubricState::Draft,
            owner_id: Some(actor.id.clone()),
            topics: input.topics,
            created: now,
            updated: now,
        };
        rubrics::insert(self.db.conn(), &rubric)?;

        tracing::info!(rubric_id = %rubric.id, criteria = rubric.criteria_count(), "rubric_created");
        Ok(rubric)
    }

    pub fn get_rubric(&self, actor: &Teacher, rubric_id: &str) -> Result<Rubric> {
        let rubric = self.load_rubric(rubric_id)?;
        self.rubric_access(actor, &rubric)?;
        Ok(rubric)
    }

    /// Replace a rubric's name and topics
    pub fn update_rubric(&self, actor: &Teacher, rubric_id: &str, input: NewRubric) -> Result<Rubric> {
        input.validate()?;
        let rubric = self.load_rubric(rubric_id)?;
        if !self.rubric_access(actor, &rubric)?.can_moderate {
            return Err(RubricaError::unauthorized(
                "edit rubric",
                "only the creator or a course moderator may edit it",
            ));
        }

        rubrics::update_content(
            self.db.conn(),
            rubric_id,
            input.name.trim(),
            &input.topics,
            Utc::now(),
        )?;
        self.load_rubric(rubric_id)
    }

    /// Detached copy named `<name> (Copy)` in draft state; nothing is stored
    pub fn clone_rubric(&self, actor: &Teacher, rubric_id: &str) -> Result<TemplateData> {
        let source = self.get_rubric(actor, rubric_id)?;
        Ok(TemplateBuilder::from_rubric(&source)
            .suffix_name(COPY_SUFFIX)
            .state(RubricState::Draft)
            .build())
    }

    /// Clone and store the copy as a new draft of `actor`
    pub fn duplicate_rubric(&self, actor: &Teacher, rubric_id: &str) -> Result<Rubric> {
        let data = self.clone_rubric(actor, rubric_id)?;
        self.create_rubric(actor, NewRubric::from(data))
    }

    /// Make `rubric_id` the active guide of `scope`.
    ///
    /// Runs in one immediate transaction: every other active guide of the
    /// scope goes inactive, the target goes active and joins the scope's guide
    /// set. Concurrent assignments on the same store serialize on the write
    /// lock, so a scope never ends up with two active guides.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub fn assign_guide(&self, actor: &Teacher, rubric_id: &str, scope: &Scope) -> Result<GuideAssignment> {
        let start = Instant::now();

        match scope {
            Scope::Course(course_id) => {
                let course = self.load_course(course_id)?;
                check_course_moderator(&course, &actor.id)?;
            }
            Scope::Group(group_id) => {
                self.load_group_for_grading(actor, group_id)?;
            }
        }
        let rubric = self.load_rubric(rubric_id)?;
        self.rubric_access(actor, &rubric)?;

        let assignment = self.db.immediate("assign guide", |tx| {
            let target = rubrics::get(tx, rubric_id)?
                .ok_or_else(|| RubricaError::not_found("rubric", rubric_id))?;
            let guides = rubrics::scope_guides(tx, scope)?;
            let plan = plan_guide_assignment(&target.id, target.state, &guides);

            let now = Utc::now();
            for id in &plan.deactivate {
                rubrics::set_state(tx, id, RubricState::Inactive, now)?;
            }
            if let Some(id) = &plan.activate {
                let next = target.state.transition(RubricState::Active)?;
                rubrics::set_state(tx, id, next, now)?;
            }
            let registered = plan.register && rubrics::register_guide(tx, scope, &target.id)?;

            Ok(GuideAssignment {
                rubric_id: target.id,
                scope: scope.clone(),
                deactivated: plan.deactivate,
                activated: plan.activate.is_some(),
                registered,
            })
        })?;

        crate::trace_time!(start, "assign_guide");
        tracing::info!(
            rubric_id,
            %scope,
            deactivated = assignment.deactivated.len(),
            registered = assignment.registered,
            "guide_assigned"
        );
        Ok(assignment)
    }

    /// Own drafts, guides of moderated courses and rubrics of owned groups
    pub fn visible_rubrics(&self, actor: &Teacher) -> Result<Vec<Rubric>> {
        rubrics::visible_to(self.db.conn(), &actor.id)
    }

    /// Rubrics of a group, for its owner or a course moderator
    pub fn group_rubrics(&self, actor: &Teacher, group_id: &str) -> Result<Vec<Rubric>> {
        let (_, group) = self.load_group_for_grading(actor, group_id)?;
        group
            .rubric_ids
            .iter()
            .map(|id| self.load_rubric(id))
            .collect()
    }
}
