//! CLI argument parsing for rubrica
//!
//! Global flags: --root, --store, --as, --format, --quiet, --verbose

pub mod args;
pub mod output;
pub mod parse;
pub mod paths;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{
    CourseCommands, GroupCommands, NotaCommands, ReportCommands, RubricCommands, TeacherCommands,
};
pub use output::OutputFormat;

/// Rubrica - weighted grading rubrics, notas and student averages
#[derive(Parser, Debug)]
#[command(name = "rubrica")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base directory for resolving the store
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Explicit store path
    #[arg(long, global = true, env = "RUBRICA_STORE")]
    pub store: Option<PathBuf>,

    /// Email of the teacher acting
    #[arg(long = "as", global = true, env = "RUBRICA_AS", value_name = "EMAIL")]
    pub actor: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `debug`, `rubrica_core=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new rubrica store
    Init,

    /// Show store location, schema version and row counts
    Status,

    /// Teacher accounts
    Teacher {
        #[command(subcommand)]
        command: TeacherCommands,
    },

    /// Courses and membership
    Course {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Groups and students
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Rubric templates and guides
    Rubric {
        #[command(subcommand)]
        command: RubricCommands,
    },

    /// Notas and grades
    Nota {
        #[command(subcommand)]
        command: NotaCommands,
    },

    /// Grade reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_assign_needs_one_scope() {
        assert!(Cli::try_parse_from(["rubrica", "rubric", "assign", "rb-1"]).is_err());
        assert!(Cli::try_parse_from([
            "rubrica", "rubric", "assign", "rb-1", "--course", "cu-1", "--group", "gr-1"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["rubrica", "rubric", "assign", "rb-1", "--group", "gr-1"]).is_ok());
    }

    #[test]
    fn test_global_actor_flag() {
        let cli = Cli::try_parse_from(["rubrica", "course", "list", "--as", "a@x.edu"]).unwrap();
        assert_eq!(cli.actor.as_deref(), Some("a@x.edu"));
    }
}
