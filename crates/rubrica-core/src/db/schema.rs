//! SQLite database schema for rubrica

use rusqlite::{Connection, OptionalExtension, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Result of schema creation
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaCreateResult {
    /// Fresh database, tables created
    Created,
    /// Existing database at the current version
    Current,
    /// Existing database written by a newer rubrica
    TooNew(i32),
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teachers (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL
);

-- Course membership with moderator flag
CREATE TABLE IF NOT EXISTS course_teachers (
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    teacher_id TEXT NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
    moderator INTEGER NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (course_id, teacher_id)
);
CREATE INDEX IF NOT EXISTS idx_course_teachers_teacher ON course_teachers(teacher_id);

-- Rubric templates; topics are stored as a JSON tree
CREATE TABLE IF NOT EXISTS rubrics (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    state TEXT NOT NULL DEFAULT 'draft',
    owner_id TEXT,
    topics_json TEXT NOT NULL DEFAULT '[]',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rubrics_owner ON rubrics(owner_id, state);

CREATE TABLE IF NOT EXISTS course_guides (
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    rubric_id TEXT NOT NULL REFERENCES rubrics(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (course_id, rubric_id)
);

CREATE TABLE IF NOT EXISTS course_groups (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    teacher_id TEXT NOT NULL REFERENCES teachers(id),
    created TEXT NOT NULL,
    UNIQUE (course_id, name)
);
CREATE INDEX IF NOT EXISTS idx_course_groups_teacher ON course_groups(teacher_id);

CREATE TABLE IF NOT EXISTS group_rubrics (
    group_id TEXT NOT NULL REFERENCES course_groups(id) ON DELETE CASCADE,
    rubric_id TEXT NOT NULL REFERENCES rubrics(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (group_id, rubric_id)
);

CREATE TABLE IF NOT EXISTS students (
    group_id TEXT NOT NULL REFERENCES course_groups(id) ON DELETE CASCADE,
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    average REAL NOT NULL DEFAULT 0,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (group_id, email)
);

CREATE TABLE IF NOT EXISTS notas (
    group_id TEXT NOT NULL REFERENCES course_groups(id) ON DELETE CASCADE,
    number INTEGER NOT NULL,
    rubric_id TEXT NOT NULL REFERENCES rubrics(id),
    date TEXT NOT NULL,
    percentage REAL NOT NULL,
    PRIMARY KEY (group_id, number),
    UNIQUE (group_id, rubric_id)
);

-- One recorded grade per (student, rubric) within a group
CREATE TABLE IF NOT EXISTS calificaciones (
    group_id TEXT NOT NULL,
    student_email TEXT NOT NULL,
    rubric_id TEXT NOT NULL,
    nota_number INTEGER,
    recorded TEXT NOT NULL,
    raw_score REAL NOT NULL,
    final_score REAL NOT NULL,
    topics_json TEXT NOT NULL DEFAULT '[]',
    remarks TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (group_id, student_email, rubric_id),
    FOREIGN KEY (group_id, student_email) REFERENCES students(group_id, email)
        ON DELETE CASCADE ON UPDATE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_calificaciones_rubric ON calificaciones(group_id, rubric_id);

-- One-time codes; expires_at is a unix timestamp
CREATE TABLE IF NOT EXISTS recovery_codes (
    email TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let has_meta: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'store_meta'",
        [],
        |row| row.get(0),
    )?;
    if !has_meta {
        return Ok(None);
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(value.and_then(|v| v.parse().ok()))
}

/// Create tables if needed and record the schema version
pub fn create_schema(conn: &Connection) -> Result<SchemaCreateResult> {
    let existing = stored_version(conn)?;

    if let Some(version) = existing {
        if version > CURRENT_SCHEMA_VERSION {
            return Ok(SchemaCreateResult::TooNew(version));
        }
    }

    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR REPLACE INTO store_meta (key, value) VALUES ('schema_version', ?1)",
        [CURRENT_SCHEMA_VERSION.to_string()],
    )?;

    Ok(match existing {
        None => SchemaCreateResult::Created,
        Some(_) => SchemaCreateResult::Current,
    })
}
