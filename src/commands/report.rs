//! `rubrica report` commands - grade reports by email

use std::fs;

use crate::cli::output::{print_json, score};
use crate::cli::ReportCommands;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::{RubricaError, Result};
use rubrica_core::mail::Attachment;

pub fn execute(ctx: &CommandContext, command: &ReportCommands) -> Result<()> {
    let (store, actor) = ctx.store_and_actor()?;

    match command {
        ReportCommands::Send {
            group_id,
            email,
            attach,
        } => {
            let attachment = match attach {
                Some(path) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .ok_or_else(|| RubricaError::invalid_value("attachment", path.display()))?;
                    Some(Attachment::from_bytes(filename, fs::read(path)?))
                }
                None => None,
            };

            let delivery = store.send_grade_report(&actor, group_id, email, attachment)?;
            output_by_format!(ctx.cli.format,
                json => print_json(&delivery),
                human => {
                    println!("Sent \"{}\" to {} (average {})", delivery.subject, delivery.to, score(delivery.average));
                    if let Some(name) = &delivery.attachment {
                        println!("  attached {}", name);
                    }
                }
            )
        }
    }
}
