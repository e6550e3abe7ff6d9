//! Access-control rules for courses, groups and rubrics
//!
//! Checks run on already-loaded records; the store does the lookups.

use crate::error::{RubricaError, Result};
use crate::roster::{Course, Group};
use crate::rubric::{Rubric, RubricState};

/// What a course member may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseAccess {
    pub is_moderator: bool,
}

/// What a teacher may do with a rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricAccess {
    pub can_moderate: bool,
}

/// Teacher must belong to the course
pub fn check_course_access(course: &Course, teacher_id: &str) -> Result<CourseAccess> {
    let member = course.member(teacher_id).ok_or_else(|| {
        RubricaError::unauthorized("access course", format!("not a member of {}", course.name))
    })?;
    Ok(CourseAccess {
        is_moderator: member.moderator,
    })
}

/// Teacher must moderate the course
pub fn check_course_moderator(course: &Course, teacher_id: &str) -> Result<()> {
    if check_course_access(course, teacher_id)?.is_moderator {
        Ok(())
    } else {
        Err(RubricaError::unauthorized(
            "moderate course",
            format!("not a moderator of {}", course.name),
        ))
    }
}

/// Grading a group: its owner or a moderator of the owning course
pub fn check_grading_access(course: &Course, group: &Group, teacher_id: &str) -> Result<()> {
    if group.course_id != course.id {
        return Err(RubricaError::not_found(
            "group in course",
            format!("{} / {}", course.id, group.id),
        ));
    }
    if group.teacher_id == teacher_id || course.is_moderator(teacher_id) {
        Ok(())
    } else {
        Err(RubricaError::unauthorized(
            "grade group",
            format!("not the owner of {} nor a course moderator", group.name),
        ))
    }
}

/// Rubric access for a teacher.
///
/// `courses` are the courses the teacher belongs to and `groups` the groups of
/// those courses. A draft is private to its creator. A course guide is open to
/// members and moderated by course moderators. A group rubric is reserved to
/// the group owner.
pub fn check_rubric_access(
    rubric: &Rubric,
    teacher_id: &str,
    courses: &[Course],
    groups: &[Group],
) -> Result<RubricAccess> {
    let is_creator = rubric.owner_id.as_deref() == Some(teacher_id);

    if rubric.state == RubricState::Draft && is_creator {
        return Ok(RubricAccess { can_moderate: true });
    }

    let guided_course = courses
        .iter()
        .find(|c| c.guide_rubric_ids.iter().any(|id| id == &rubric.id));
    let owning_group = groups
        .iter()
        .find(|g| g.rubric_ids.iter().any(|id| id == &rubric.id));

    match (guided_course, owning_group) {
        (Some(course), _) => Ok(RubricAccess {
            can_moderate: course.is_moderator(teacher_id),
        }),
        (None, Some(group)) if group.teacher_id == teacher_id => {
            Ok(RubricAccess { can_moderate: true })
        }
        (None, Some(_)) => Err(RubricaError::unauthorized(
            "access rubric",
            "reserved to the group owner",
        )),
        (None, None) if is_creator => Ok(RubricAccess { can_moderate: true }),
        (None, None) => Err(RubricaError::unauthorized(
            "access rubric",
            format!("{} is not shared with you", rubric.id),
        )),
    }
}
