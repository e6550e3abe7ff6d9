//! `rubrica init` command - create a new store
//!
//! Idempotent: an existing store and its config are left as they are.

use crate::cli::output::print_json;
use crate::cli::paths::resolve_store_path;
use crate::commands::dispatch::CommandContext;
use crate::output_by_format;
use rubrica_core::error::Result;
use rubrica_core::store::Store;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = match &ctx.cli.store {
        Some(path) => Store::init_at(&resolve_store_path(ctx.root, path))?,
        None => Store::init(ctx.root)?,
    };

    output_by_format!(ctx.cli.format,
        json => print_json(&serde_json::json!({
            "status": "ok",
            "store": store.root().display().to_string(),
            "message": "Store initialized"
        })),
        human => {
            println!("Initialized rubrica store at {}", store.root().display());
            if !ctx.cli.quiet {
                println!();
                println!("Run `rubrica teacher register <email>` to create the first account.");
            }
        }
    )
}
