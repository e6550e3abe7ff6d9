//! Command trait and context for dispatching commands

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::macros::trace_command;
use crate::cli::paths::resolve_store_path;
use crate::cli::Cli;
use rubrica_core::error::Result;
use rubrica_core::roster::Teacher;
use rubrica_core::store::Store;

/// Discover or open a store based on CLI configuration
pub fn discover_or_open_store(cli: &Cli, root: &Path) -> Result<Store> {
    match &cli.store {
        Some(path) => Store::open(&resolve_store_path(root, path)),
        None => Store::discover(root),
    }
}

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a PathBuf,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a PathBuf, start: Instant) -> Self {
        Self { cli, root, start }
    }

    pub fn discover_or_open_store(&self) -> Result<Store> {
        let store = discover_or_open_store(self.cli, self.root)?;
        trace_command!(self.cli, self.start, "open_store");
        Ok(store)
    }

    /// Open the store and resolve the teacher named by `--as`
    pub fn store_and_actor(&self) -> Result<(Store, Teacher)> {
        let Some(email) = self.cli.actor.as_deref() else {
            rubrica_core::bail_usage!("this command acts on behalf of a teacher; pass --as <email>");
        };
        let store = self.discover_or_open_store()?;
        let actor = store.teacher_by_email(email)?;
        tracing::debug!(actor = %actor.id, "resolved_actor");
        Ok((store, actor))
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("rubrica {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Weighted grading rubrics, notas and student averages.");
        println!();
        println!("Run `rubrica --help` for usage information.");
        Ok(())
    }
}
