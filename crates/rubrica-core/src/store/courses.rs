//! Courses and their teacher membership

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Store;
use crate::access::{check_course_access, check_course_moderator};
use crate::db::roster;
use crate::error::{RubricaError, Result};
use crate::id::{self, IdKind};
use crate::roster::{Course, MemberRequest, Teacher};

/// Input for course creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourse {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "icono")]
    pub icon: String,
    #[serde(default, alias = "docentes")]
    pub teachers: Vec<MemberRequest>,
}

/// Result of adding teachers to a course
#[derive(Debug, Clone, Serialize)]
pub struct MembershipChange {
    pub course: Course,
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    /// Emails with no registered teacher, skipped
    pub unknown: Vec<String>,
}

impl Store {
    pub(crate) fn load_course(&self, course_id: &str) -> Result<Course> {
        roster::get_course(self.db.conn(), course_id)?
            .ok_or_else(|| RubricaError::not_found("course", course_id))
    }

    /// Create a course; the creating teacher always joins as moderator
    #[tracing::instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub fn create_course(&self, actor: &Teacher, input: NewCourse) -> Result<Course> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(RubricaError::missing_field("name"));
        }

        let course_id = id::generate(IdKind::Course);

        self.db.immediate("create course", |tx| {
            if roster::course_id_by_name(tx, &name)?.is_some() {
                return Err(RubricaError::already_exists("course", &name));
            }
            roster::insert_course(tx, &course_id, &name, input.icon.trim(), Utc::now())?;
            roster::add_member(tx, &course_id, &actor.id, true)?;

            for request in &input.teachers {
                let email = request.email.trim().to_lowercase();
                match roster::teacher_by_email(tx, &email)? {
                    Some((teacher, _)) if teacher.id != actor.id => {
                        roster::add_member(tx, &course_id, &teacher.id, request.moderator)?;
                    }
                    Some(_) => {}
                    None => tracing::debug!(%email, "skipping unknown teacher"),
                }
            }
            Ok(())
        })?;

        tracing::info!(course_id = %course_id, "course_created");
        self.load_course(&course_id)
    }

    /// Courses the teacher belongs to
    pub fn list_courses(&self, actor: &Teacher) -> Result<Vec<Course>> {
        roster::courses_of_teacher(self.db.conn(), &actor.id)
    }

    pub fn get_course(&self, actor: &Teacher, course_id: &str) -> Result<Course> {
        let course = self.load_course(course_id)?;
        check_course_access(&course, &actor.id)?;
        Ok(course)
    }

    /// Add teachers by email; refuses when every email is already a member
    #[tracing::instrument(skip(self, actor, requests), fields(actor = %actor.id))]
    pub fn add_course_teachers(
        &self,
        actor: &Teacher,
        course_id: &str,
        requests: &[MemberRequest],
    ) -> Result<MembershipChange> {
        let (added, already_present, unknown) = self.db.immediate("add teachers", |tx| {
            let course = roster::get_course(tx, course_id)?
                .ok_or_else(|| RubricaError::not_found("course", course_id))?;
            check_course_moderator(&course, &actor.id)?;

            let mut already_present = Vec::new();
            let mut fresh: Vec<(String, bool)> = Vec::new();
            for request in requests {
                let email = request.email.trim().to_lowercase();
                if course.teachers.iter().any(|m| m.email == email) {
                    already_present.push(email);
                } else if !fresh.iter().any(|(e, _)| e == &email) {
                    fresh.push((email, request.moderator));
                }
            }

            if fresh.is_empty() {
                return Err(RubricaError::already_exists(
                    "course members",
                    already_present.join(", "),
                ));
            }

            let mut added = Vec::new();
            let mut unknown = Vec::new();
            for (email, moderator) in fresh {
                match roster::teacher_by_email(tx, &email)? {
                    Some((teacher, _)) => {
                        roster::add_member(tx, course_id, &teacher.id, moderator)?;
                        added.push(email);
                    }
                    None => unknown.push(email),
                }
            }
            Ok((added, already_present, unknown))
        })?;

        tracing::info!(course_id, added = added.len(), "course_teachers_added");
        Ok(MembershipChange {
            course: self.load_course(course_id)?,
            added,
            already_present,
            unknown,
        })
    }

    pub fn set_course_moderator(
        &self,
        actor: &Teacher,
        course_id: &str,
        email: &str,
        moderator: bool,
    ) -> Result<Course> {
        let course = self.load_course(course_id)?;
        check_course_moderator(&course, &actor.id)?;

        let email = email.trim().to_lowercase();
        let member = course
            .teachers
            .iter()
            .find(|m| m.email == email)
            .ok_or_else(|| RubricaError::not_found("course member", &email))?;

        roster::set_moderator(self.db.conn(), course_id, &member.teacher_id, moderator)?;
        self.load_course(course_id)
    }

    pub fn remove_course_teacher(&self, actor: &Teacher, course_id: &str, email: &str) -> Result<Course> {
        let course = self.load_course(course_id)?;
        check_course_moderator(&course, &actor.id)?;

        let email = email.trim().to_lowercase();
        let member = course
            .teachers
            .iter()
            .find(|m| m.email == email)
            .ok_or_else(|| RubricaError::not_found("course member", &email))?;

        roster::remove_member(self.db.conn(), course_id, &member.teacher_id)?;
        self.load_course(course_id)
    }

    /// Rename a course or change its icon; `None` keeps the current value
    pub fn update_course(
        &self,
        actor: &Teacher,
        course_id: &str,
        name: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Course> {
        self.db.immediate("update course", |tx| {
            let course = roster::get_course(tx, course_id)?
                .ok_or_else(|| RubricaError::not_found("course", course_id))?;
            check_course_moderator(&course, &actor.id)?;

            let name = name.map(str::trim).unwrap_or(course.name.as_str());
            if name.is_empty() {
                return Err(RubricaError::missing_field("name"));
            }
            if name != course.name {
                if let Some(other) = roster::course_id_by_name(tx, name)? {
                    if other != course.id {
                        return Err(RubricaError::already_exists("course", name));
                    }
                }
            }
            let icon = icon.map(str::trim).unwrap_or(course.icon.as_str());
            roster::update_course(tx, course_id, name, icon)
        })?;

        self.load_course(course_id)
    }

    /// Delete a course with its groups, notas and grades
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub fn delete_course(&self, actor: &Teacher, course_id: &str) -> Result<()> {
        let course = self.load_course(course_id)?;
        check_course_moderator(&course, &actor.id)?;

        roster::delete_course(self.db.conn(), course_id)?;
        tracing::info!(course_id, groups = course.group_ids.len(), "course_deleted");
        Ok(())
    }
}
