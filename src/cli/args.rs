//! Subcommand argument structures

use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::parse::{parse_member, parse_student};
use rubrica_core::roster::{MemberRequest, NewStudent};

/// Teacher accounts
#[derive(Subcommand, Debug)]
pub enum TeacherCommands {
    /// Register a teacher account
    Register {
        email: String,
        #[arg(long, env = "RUBRICA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Check credentials
    Login {
        email: String,
        #[arg(long, env = "RUBRICA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Mail a one-time recovery code
    Recover { email: String },

    /// Set a new password using a recovery code
    ResetPassword {
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "RUBRICA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Move an account to a new email using a recovery code
    ChangeEmail {
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        new_email: String,
    },
}

/// Courses and their teachers
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    /// Create a course; you join it as moderator
    Create {
        name: String,
        #[arg(long, default_value = "")]
        icon: String,
        /// Teacher to add, as `email` or `email:moderator` (repeatable)
        #[arg(long = "teacher", value_parser = parse_member, action = clap::ArgAction::Append)]
        teachers: Vec<MemberRequest>,
    },

    /// List your courses
    List,

    /// Show a course
    Show { id: String },

    /// Add teachers to a course
    AddTeacher {
        id: String,
        /// `email` or `email:moderator`
        #[arg(required = true, value_parser = parse_member)]
        teachers: Vec<MemberRequest>,
    },

    /// Grant or revoke the moderator flag
    SetModerator {
        id: String,
        email: String,
        #[arg(long)]
        revoke: bool,
    },

    /// Remove a teacher from a course
    RemoveTeacher { id: String, email: String },

    /// Rename a course or change its icon
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a course with its groups
    Delete { id: String },
}

/// Groups and students
#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group in a course
    Create {
        course_id: String,
        name: String,
        /// Student as `Name <email>` (repeatable)
        #[arg(long = "student", value_parser = parse_student, action = clap::ArgAction::Append)]
        students: Vec<NewStudent>,
    },

    /// List the groups of a course
    List {
        course_id: String,
        /// Only groups you own
        #[arg(long)]
        mine: bool,
    },

    /// Show a group with students and notas
    Show { id: String },

    /// Enrol students
    AddStudent {
        id: String,
        /// `Name <email>`
        #[arg(required = true, value_parser = parse_student)]
        students: Vec<NewStudent>,
    },

    /// Change a student's name or email
    UpdateStudent {
        id: String,
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_email: Option<String>,
    },

    /// Remove a student and their grades
    RemoveStudent { id: String, email: String },

    /// Rename a group
    Rename { id: String, name: String },

    /// Delete a group with its notas and grades
    Delete { id: String },
}

/// Rubric templates
#[derive(Subcommand, Debug)]
pub enum RubricCommands {
    /// Create a draft rubric from a JSON file (`-` for stdin)
    Create { input: String },

    /// Show a rubric
    Show { id: String },

    /// Replace a rubric's name and topics from JSON
    Update { id: String, input: String },

    /// Print a detached copy named `<name> (Copy)`
    Clone {
        id: String,
        /// Store the copy as a new draft
        #[arg(long)]
        save: bool,
    },

    /// Make a rubric the active guide of a course or group
    Assign(AssignArgs),

    /// List rubrics visible to you, or those of one group
    List {
        #[arg(long)]
        group: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    pub id: String,
    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Exactly one of `--course` or `--group`
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    #[arg(long)]
    pub course: Option<String>,
    #[arg(long)]
    pub group: Option<String>,
}

/// Notas and grades
#[derive(Subcommand, Debug)]
pub enum NotaCommands {
    /// Schedule a nota in a group
    Create(NotaCreateArgs),

    /// List the notas of a group
    List { group_id: String },

    /// Show one nota
    Show { group_id: String, number: u32 },

    /// Record a student's filled rubric from JSON (`-` for stdin)
    Grade {
        group_id: String,
        number: u32,
        input: String,
        /// Student email, overriding the one in the JSON
        #[arg(long)]
        student: Option<String>,
    },

    /// Change a nota's percentage and reweight its grades
    Reweight {
        group_id: String,
        number: u32,
        percentage: f64,
    },

    /// Delete a nota and its grades
    Delete { group_id: String, number: u32 },

    /// Drop one student's grade for a nota
    Revert {
        group_id: String,
        number: u32,
        email: String,
    },

    /// Show a student's grade for a nota
    StudentGrade {
        group_id: String,
        number: u32,
        email: String,
    },

    /// Per-student finals and averages of a group
    Summary { group_id: String },
}

#[derive(Args, Debug)]
pub struct NotaCreateArgs {
    pub group_id: String,
    #[arg(long)]
    pub number: Option<u32>,
    #[arg(long)]
    pub rubric: Option<String>,
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub percentage: Option<f64>,
}

/// Grade reports
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Mail a student their grades
    Send {
        group_id: String,
        email: String,
        /// File to attach
        #[arg(long)]
        attach: Option<PathBuf>,
    },
}
