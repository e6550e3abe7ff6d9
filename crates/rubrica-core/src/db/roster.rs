//! Teacher, course, group and student rows
//!
//! Courses and groups are assembled from several tables here; callers get
//! plain records with identifier lists and never follow live references.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{notas, parse_timestamp};
use crate::error::Result;
use crate::roster::{Course, CourseMember, Group, NewStudent, Student, Teacher};

// Teachers

pub fn insert_teacher(conn: &Connection, teacher: &Teacher, password_hash: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO teachers (id, email, password_hash, created) VALUES (?1, ?2, ?3, ?4)",
        params![
            teacher.id,
            teacher.email,
            password_hash,
            teacher.created.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Teacher and stored password hash
pub fn teacher_by_email(conn: &Connection, email: &str) -> Result<Option<(Teacher, String)>> {
    let found = conn
        .query_row(
            "SELECT id, email, created, password_hash FROM teachers WHERE email = ?1",
            [email],
            |row| {
                let created: String = row.get(2)?;
                Ok((
                    Teacher {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created: parse_timestamp(&created)?,
                    },
                    row.get(3)?,
                ))
            },
        )
        .optional()?;
    Ok(found)
}

pub fn teacher_by_id(conn: &Connection, id: &str) -> Result<Option<Teacher>> {
    let found = conn
        .query_row(
            "SELECT id, email, created FROM teachers WHERE id = ?1",
            [id],
            |row| {
                let created: String = row.get(2)?;
                Ok(Teacher {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created: parse_timestamp(&created)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

pub fn set_password(conn: &Connection, teacher_id: &str, password_hash: &str) -> Result<()> {
    conn.execute(
        "UPDATE teachers SET password_hash = ?2 WHERE id = ?1",
        params![teacher_id, password_hash],
    )?;
    Ok(())
}

pub fn set_email(conn: &Connection, teacher_id: &str, email: &str) -> Result<()> {
    conn.execute(
        "UPDATE teachers SET email = ?2 WHERE id = ?1",
        params![teacher_id, email],
    )?;
    Ok(())
}

// Courses

pub fn insert_course(
    conn: &Connection,
    id: &str,
    name: &str,
    icon: &str,
    created: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO courses (id, name, icon, created) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, icon, created.to_rfc3339()],
    )?;
    Ok(())
}

pub fn course_id_by_name(conn: &Connection, name: &str) -> Result<Option<String>> {
    let id = conn
        .query_row("SELECT id FROM courses WHERE name = ?1", [name], |r| r.get(0))
        .optional()?;
    Ok(id)
}

fn string_column(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([key], |r| r.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

fn course_members(conn: &Connection, course_id: &str) -> Result<Vec<CourseMember>> {
    let mut stmt = conn.prepare(
        "SELECT ct.teacher_id, t.email, ct.moderator FROM course_teachers ct
         JOIN teachers t ON t.id = ct.teacher_id
         WHERE ct.course_id = ?1 ORDER BY ct.position, t.email",
    )?;
    let rows = stmt.query_map([course_id], |row| {
        Ok(CourseMember {
            teacher_id: row.get(0)?,
            email: row.get(1)?,
            moderator: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_course(conn: &Connection, id: &str) -> Result<Option<Course>> {
    let head: Option<(String, String, String)> = conn
        .query_row(
            "SELECT id, name, icon FROM courses WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;

    let Some((id, name, icon)) = head else {
        return Ok(None);
    };

    Ok(Some(Course {
        teachers: course_members(conn, &id)?,
        group_ids: string_column(
            conn,
            "SELECT id FROM course_groups WHERE course_id = ?1 ORDER BY created, id",
            &id,
        )?,
        guide_rubric_ids: string_column(
            conn,
            "SELECT rubric_id FROM course_guides WHERE course_id = ?1 ORDER BY position, rubric_id",
            &id,
        )?,
        id,
        name,
        icon,
    }))
}

/// Courses the teacher belongs to
pub fn courses_of_teacher(conn: &Connection, teacher_id: &str) -> Result<Vec<Course>> {
    let ids = string_column(
        conn,
        "SELECT c.id FROM courses c JOIN course_teachers ct ON ct.course_id = c.id
         WHERE ct.teacher_id = ?1 ORDER BY c.name",
        teacher_id,
    )?;
    let mut courses = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(course) = get_course(conn, &id)? {
            courses.push(course);
        }
    }
    Ok(courses)
}

pub fn update_course(conn: &Connection, id: &str, name: &str, icon: &str) -> Result<()> {
    conn.execute(
        "UPDATE courses SET name = ?2, icon = ?3 WHERE id = ?1",
        params![id, name, icon],
    )?;
    Ok(())
}

pub fn delete_course(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM courses WHERE id = ?1", [id])? > 0)
}

pub fn add_member(conn: &Connection, course_id: &str, teacher_id: &str, moderator: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO course_teachers (course_id, teacher_id, moderator, position)
         VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(position), -1) + 1 FROM course_teachers WHERE course_id = ?1))",
        params![course_id, teacher_id, moderator],
    )?;
    Ok(())
}

pub fn set_moderator(conn: &Connection, course_id: &str, teacher_id: &str, moderator: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE course_teachers SET moderator = ?3 WHERE course_id = ?1 AND teacher_id = ?2",
        params![course_id, teacher_id, moderator],
    )?;
    Ok(changed > 0)
}

pub fn remove_member(conn: &Connection, course_id: &str, teacher_id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM course_teachers WHERE course_id = ?1 AND teacher_id = ?2",
        params![course_id, teacher_id],
    )?;
    Ok(removed > 0)
}

// Groups

pub fn insert_group(
    conn: &Connection,
    id: &str,
    course_id: &str,
    name: &str,
    teacher_id: &str,
    created: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO course_groups (id, course_id, name, teacher_id, created)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, course_id, name, teacher_id, created.to_rfc3339()],
    )?;
    Ok(())
}

/// Whether another group of the course already uses `name`
pub fn group_name_taken(
    conn: &Connection,
    course_id: &str,
    name: &str,
    except_group: Option<&str>,
) -> Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM course_groups
                       WHERE course_id = ?1 AND name = ?2 AND id IS NOT ?3)",
        params![course_id, name, except_group],
        |r| r.get(0),
    )?;
    Ok(taken)
}

pub fn get_group(conn: &Connection, id: &str) -> Result<Option<Group>> {
    let head: Option<(String, String, String, String)> = conn
        .query_row(
            "SELECT id, course_id, name, teacher_id FROM course_groups WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;

    let Some((id, course_id, name, teacher_id)) = head else {
        return Ok(None);
    };

    Ok(Some(Group {
        students: students_of_group(conn, &id)?,
        rubric_ids: string_column(
            conn,
            "SELECT rubric_id FROM group_rubrics WHERE group_id = ?1 ORDER BY position, rubric_id",
            &id,
        )?,
        notas: notas::list(conn, &id)?,
        id,
        course_id,
        name,
        teacher_id,
    }))
}

/// Groups of a course, optionally only those created by `teacher_id`
pub fn groups_of_course(
    conn: &Connection,
    course_id: &str,
    teacher_id: Option<&str>,
) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM course_groups
         WHERE course_id = ?1 AND (?2 IS NULL OR teacher_id = ?2)
         ORDER BY created, id",
    )?;
    let ids = stmt
        .query_map(params![course_id, teacher_id], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut groups = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(group) = get_group(conn, &id)? {
            groups.push(group);
        }
    }
    Ok(groups)
}

pub fn rename_group(conn: &Connection, id: &str, name: &str) -> Result<()> {
    conn.execute(
        "UPDATE course_groups SET name = ?2 WHERE id = ?1",
        params![id, name],
    )?;
    Ok(())
}

pub fn delete_group(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM course_groups WHERE id = ?1", [id])? > 0)
}

// Students

pub fn insert_student(conn: &Connection, group_id: &str, student: &NewStudent) -> Result<()> {
    conn.execute(
        "INSERT INTO students (group_id, email, name, average, position)
         VALUES (?1, ?2, ?3, 0, (SELECT COALESCE(MAX(position), -1) + 1 FROM students WHERE group_id = ?1))",
        params![group_id, student.email, student.name],
    )?;
    Ok(())
}

pub fn student_exists(conn: &Connection, group_id: &str, email: &str) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE group_id = ?1 AND email = ?2)",
        params![group_id, email],
        |r| r.get(0),
    )?;
    Ok(found)
}

/// Rename a student or move them to a new email; grades follow the email
pub fn update_student(
    conn: &Connection,
    group_id: &str,
    email: &str,
    name: &str,
    new_email: &str,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE students SET name = ?3, email = ?4 WHERE group_id = ?1 AND email = ?2",
        params![group_id, email, name, new_email],
    )?;
    Ok(changed > 0)
}

pub fn delete_student(conn: &Connection, group_id: &str, email: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM students WHERE group_id = ?1 AND email = ?2",
        params![group_id, email],
    )?;
    Ok(removed > 0)
}

pub fn set_average(conn: &Connection, group_id: &str, email: &str, average: f64) -> Result<()> {
    conn.execute(
        "UPDATE students SET average = ?3 WHERE group_id = ?1 AND email = ?2",
        params![group_id, email, average],
    )?;
    Ok(())
}

pub fn get_student(conn: &Connection, group_id: &str, email: &str) -> Result<Option<Student>> {
    let head: Option<(String, String, f64)> = conn
        .query_row(
            "SELECT name, email, average FROM students WHERE group_id = ?1 AND email = ?2",
            params![group_id, email],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;

    let Some((name, email, average)) = head else {
        return Ok(None);
    };

    Ok(Some(Student {
        calificaciones: notas::calificaciones_of_student(conn, group_id, &email)?,
        name,
        email,
        average,
    }))
}

pub fn students_of_group(conn: &Connection, group_id: &str) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT name, email, average FROM students WHERE group_id = ?1 ORDER BY position, email",
    )?;
    let heads = stmt
        .query_map([group_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, f64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    heads
        .into_iter()
        .map(|(name, email, average)| {
            Ok(Student {
                calificaciones: notas::calificaciones_of_student(conn, group_id, &email)?,
                name,
                email,
                average,
            })
        })
        .collect()
}

/// Emails of every student in the group
pub fn student_emails(conn: &Connection, group_id: &str) -> Result<Vec<String>> {
    string_column(
        conn,
        "SELECT email FROM students WHERE group_id = ?1 ORDER BY position, email",
        group_id,
    )
}
