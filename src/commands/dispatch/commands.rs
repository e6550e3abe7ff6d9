//! Routing of parsed subcommands to their implementations

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{course, group, init, nota, report, rubric, status, teacher};
use rubrica_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Init => init::execute(ctx),
            Commands::Status => status::execute(ctx),
            Commands::Teacher { command } => teacher::execute(ctx, command),
            Commands::Course { command } => course::execute(ctx, command),
            Commands::Group { command } => group::execute(ctx, command),
            Commands::Rubric { command } => rubric::execute(ctx, command),
            Commands::Nota { command } => nota::execute(ctx, command),
            Commands::Report { command } => report::execute(ctx, command),
        }
    }
}
