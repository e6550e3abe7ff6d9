//! `rubrica status` command - store location, schema and row counts

use crate::cli::output::print_json;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::Result;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = ctx.discover_or_open_store()?;
    let schema_version = store.db().schema_version()?;
    let counts = store.db().counts()?;
    let mail = &store.config().mail;
    let mail_target = if mail.endpoint.is_empty() {
        store.outbox_dir().display().to_string()
    } else {
        mail.endpoint.clone()
    };

    output_by_format!(ctx.cli.format,
        json => {
            let counts: serde_json::Map<String, serde_json::Value> = counts
                .iter()
                .map(|(table, count)| (table.to_string(), (*count).into()))
                .collect();
            print_json(&serde_json::json!({
                "store": store.root().display().to_string(),
                "schema_version": schema_version,
                "strict_weights": store.config().grading.strict_weights,
                "mail": mail_target,
                "counts": counts,
            }))
        },
        human => {
            println!("Store: {}", store.root().display());
            println!("Schema version: {}", schema_version);
            println!("Mail: {}", mail_target);
            for (table, count) in &counts {
                println!("  {:<16} {}", table, count);
            }
        }
    )
}
