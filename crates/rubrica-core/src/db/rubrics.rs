//! Rubric rows and scope guide registrations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_json, parse_state, parse_timestamp};
use crate::error::Result;
use crate::rubric::{Rubric, RubricState, Scope, Topic};

const RUBRIC_COLUMNS: &str = "r.id, r.name, r.state, r.owner_id, r.topics_json, r.created, r.updated";

fn rubric_from_row(row: &Row<'_>) -> rusqlite::Result<Rubric> {
    let state: String = row.get(2)?;
    let topics_json: String = row.get(4)?;
    let created: String = row.get(5)?;
    let updated: String = row.get(6)?;

    Ok(Rubric {
        id: row.get(0)?,
        name: row.get(1)?,
        state: parse_state(&state)?,
        owner_id: row.get(3)?,
        topics: parse_json(&topics_json)?,
        created: parse_timestamp(&created)?,
        updated: parse_timestamp(&updated)?,
    })
}

pub fn insert(conn: &Connection, rubric: &Rubric) -> Result<()> {
    conn.execute(
        "INSERT INTO rubrics (id, name, state, owner_id, topics_json, created, updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rubric.id,
            rubric.name,
            rubric.state.as_str(),
            rubric.owner_id,
            serde_json::to_string(&rubric.topics)?,
            rubric.created.to_rfc3339(),
            rubric.updated.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Rubric>> {
    let rubric = conn
        .query_row(
            &format!("SELECT {} FROM rubrics r WHERE r.id = ?1", RUBRIC_COLUMNS),
            [id],
            rubric_from_row,
        )
        .optional()?;
    Ok(rubric)
}

pub fn set_state(conn: &Connection, id: &str, state: RubricState, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE rubrics SET state = ?2, updated = ?3 WHERE id = ?1",
        params![id, state.as_str(), at.to_rfc3339()],
    )?;
    Ok(())
}

pub fn update_content(
    conn: &Connection,
    id: &str,
    name: &str,
    topics: &[Topic],
    at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE rubrics SET name = ?2, topics_json = ?3, updated = ?4 WHERE id = ?1",
        params![id, name, serde_json::to_string(topics)?, at.to_rfc3339()],
    )?;
    Ok(())
}

/// Guides registered in a scope, with their current state, in registration order
pub fn scope_guides(conn: &Connection, scope: &Scope) -> Result<Vec<(String, RubricState)>> {
    let sql = match scope {
        Scope::Course(_) => {
            "SELECT r.id, r.state FROM course_guides s JOIN rubrics r ON r.id = s.rubric_id
             WHERE s.course_id = ?1 ORDER BY s.position, r.id"
        }
        Scope::Group(_) => {
            "SELECT r.id, r.state FROM group_rubrics s JOIN rubrics r ON r.id = s.rubric_id
             WHERE s.group_id = ?1 ORDER BY s.position, r.id"
        }
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([scope.id()], |row| {
        let id: String = row.get(0)?;
        let state: String = row.get(1)?;
        Ok((id, parse_state(&state)?))
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Add `rubric_id` to the scope's guide set; re-adding is a no-op
pub fn register_guide(conn: &Connection, scope: &Scope, rubric_id: &str) -> Result<bool> {
    let sql = match scope {
        Scope::Course(_) => {
            "INSERT OR IGNORE INTO course_guides (course_id, rubric_id, position)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1 FROM course_guides WHERE course_id = ?1))"
        }
        Scope::Group(_) => {
            "INSERT OR IGNORE INTO group_rubrics (group_id, rubric_id, position)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1 FROM group_rubrics WHERE group_id = ?1))"
        }
    };
    let inserted = conn.execute(sql, params![scope.id(), rubric_id])?;
    Ok(inserted > 0)
}

/// Rubrics a teacher can see: own drafts, guides of courses they moderate
/// and rubrics of groups they created
pub fn visible_to(conn: &Connection, teacher_id: &str) -> Result<Vec<Rubric>> {
    let sql = format!(
        "SELECT {} FROM rubrics r
         WHERE (r.owner_id = ?1 AND r.state = 'draft')
            OR r.id IN (
                SELECT cg.rubric_id FROM course_guides cg
                JOIN course_teachers ct ON ct.course_id = cg.course_id
                WHERE ct.teacher_id = ?1 AND ct.moderator = 1)
            OR r.id IN (
                SELECT gr.rubric_id FROM group_rubrics gr
                JOIN course_groups g ON g.id = gr.group_id
                WHERE g.teacher_id = ?1)
         ORDER BY r.created, r.id",
        RUBRIC_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([teacher_id], rubric_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
