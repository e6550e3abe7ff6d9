//! Nota and calificacion rows

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_json, parse_timestamp};
use crate::error::Result;
use crate::roster::{Calificacion, Nota};

fn nota_from_row(row: &Row<'_>) -> rusqlite::Result<Nota> {
    let date: String = row.get(2)?;
    Ok(Nota {
        number: row.get(0)?,
        rubric_id: row.get(1)?,
        date: chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        percentage: row.get(3)?,
    })
}

pub fn insert(conn: &Connection, group_id: &str, nota: &Nota) -> Result<()> {
    conn.execute(
        "INSERT INTO notas (group_id, number, rubric_id, date, percentage)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            group_id,
            nota.number,
            nota.rubric_id,
            nota.date.format("%Y-%m-%d").to_string(),
            nota.percentage
        ],
    )?;
    Ok(())
}

pub fn list(conn: &Connection, group_id: &str) -> Result<Vec<Nota>> {
    let mut stmt = conn.prepare(
        "SELECT number, rubric_id, date, percentage FROM notas WHERE group_id = ?1 ORDER BY number",
    )?;
    let rows = stmt.query_map([group_id], nota_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get(conn: &Connection, group_id: &str, number: u32) -> Result<Option<Nota>> {
    let nota = conn
        .query_row(
            "SELECT number, rubric_id, date, percentage FROM notas WHERE group_id = ?1 AND number = ?2",
            params![group_id, number],
            nota_from_row,
        )
        .optional()?;
    Ok(nota)
}

/// Nota of the group backed by `rubric_id`, if any
pub fn by_rubric(conn: &Connection, group_id: &str, rubric_id: &str) -> Result<Option<Nota>> {
    let nota = conn
        .query_row(
            "SELECT number, rubric_id, date, percentage FROM notas WHERE group_id = ?1 AND rubric_id = ?2",
            params![group_id, rubric_id],
            nota_from_row,
        )
        .optional()?;
    Ok(nota)
}

pub fn set_percentage(conn: &Connection, group_id: &str, number: u32, percentage: f64) -> Result<()> {
    conn.execute(
        "UPDATE notas SET percentage = ?3 WHERE group_id = ?1 AND number = ?2",
        params![group_id, number, percentage],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, group_id: &str, number: u32) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM notas WHERE group_id = ?1 AND number = ?2",
        params![group_id, number],
    )?;
    Ok(removed > 0)
}

/// Sum of the group's nota percentages, optionally leaving one nota out
pub fn total_percentage(conn: &Connection, group_id: &str, except: Option<u32>) -> Result<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(percentage), 0) FROM notas WHERE group_id = ?1 AND number IS NOT ?2",
        params![group_id, except],
        |r| r.get(0),
    )?;
    Ok(total)
}

// Calificaciones

fn calificacion_from_row(row: &Row<'_>) -> rusqlite::Result<Calificacion> {
    let recorded: String = row.get(2)?;
    let topics_json: String = row.get(5)?;
    Ok(Calificacion {
        rubric_id: row.get(0)?,
        nota_number: row.get(1)?,
        recorded: parse_timestamp(&recorded)?,
        raw_score: row.get(3)?,
        final_score: row.get(4)?,
        topics: parse_json(&topics_json)?,
        remarks: row.get(6)?,
    })
}

const CALIFICACION_COLUMNS: &str =
    "rubric_id, nota_number, recorded, raw_score, final_score, topics_json, remarks";

/// Insert or fully replace the student's grade for the calificacion's rubric
pub fn upsert_calificacion(
    conn: &Connection,
    group_id: &str,
    student_email: &str,
    calificacion: &Calificacion,
) -> Result<()> {
    conn.execute(
        "INSERT INTO calificaciones
             (group_id, student_email, rubric_id, nota_number, recorded,
              raw_score, final_score, topics_json, remarks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (group_id, student_email, rubric_id) DO UPDATE SET
             nota_number = excluded.nota_number,
             recorded = excluded.recorded,
             raw_score = excluded.raw_score,
             final_score = excluded.final_score,
             topics_json = excluded.topics_json,
             remarks = excluded.remarks",
        params![
            group_id,
            student_email,
            calificacion.rubric_id,
            calificacion.nota_number,
            calificacion.recorded.to_rfc3339(),
            calificacion.raw_score,
            calificacion.final_score,
            serde_json::to_string(&calificacion.topics)?,
            calificacion.remarks,
        ],
    )?;
    Ok(())
}

pub fn calificaciones_of_student(
    conn: &Connection,
    group_id: &str,
    student_email: &str,
) -> Result<Vec<Calificacion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM calificaciones WHERE group_id = ?1 AND student_email = ?2
         ORDER BY nota_number, recorded",
        CALIFICACION_COLUMNS
    ))?;
    let rows = stmt.query_map(params![group_id, student_email], calificacion_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_calificacion(
    conn: &Connection,
    group_id: &str,
    student_email: &str,
    rubric_id: &str,
) -> Result<Option<Calificacion>> {
    let found = conn
        .query_row(
            &format!(
                "SELECT {} FROM calificaciones
                 WHERE group_id = ?1 AND student_email = ?2 AND rubric_id = ?3",
                CALIFICACION_COLUMNS
            ),
            params![group_id, student_email, rubric_id],
            calificacion_from_row,
        )
        .optional()?;
    Ok(found)
}

/// (student email, grade) for every grade recorded against `rubric_id` in the group
pub fn calificaciones_for_rubric(
    conn: &Connection,
    group_id: &str,
    rubric_id: &str,
) -> Result<Vec<(String, Calificacion)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, student_email FROM calificaciones
         WHERE group_id = ?1 AND rubric_id = ?2 ORDER BY student_email",
        CALIFICACION_COLUMNS
    ))?;
    let rows = stmt.query_map(params![group_id, rubric_id], |row| {
        Ok((row.get::<_, String>(7)?, calificacion_from_row(row)?))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn set_final_score(
    conn: &Connection,
    group_id: &str,
    student_email: &str,
    rubric_id: &str,
    raw_score: f64,
    final_score: f64,
) -> Result<()> {
    conn.execute(
        "UPDATE calificaciones SET raw_score = ?4, final_score = ?5
         WHERE group_id = ?1 AND student_email = ?2 AND rubric_id = ?3",
        params![group_id, student_email, rubric_id, raw_score, final_score],
    )?;
    Ok(())
}

/// Remove every grade recorded against `rubric_id` in the group.
///
/// Returns the emails of the students that lost a grade.
pub fn delete_calificaciones_for_rubric(
    conn: &Connection,
    group_id: &str,
    rubric_id: &str,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "DELETE FROM calificaciones WHERE group_id = ?1 AND rubric_id = ?2 RETURNING student_email",
    )?;
    let rows = stmt.query_map(params![group_id, rubric_id], |r| r.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

pub fn delete_calificacion(
    conn: &Connection,
    group_id: &str,
    student_email: &str,
    rubric_id: &str,
) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM calificaciones WHERE group_id = ?1 AND student_email = ?2 AND rubric_id = ?3",
        params![group_id, student_email, rubric_id],
    )?;
    Ok(removed > 0)
}
