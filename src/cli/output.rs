//! Output format selection and rendering helpers

use clap::ValueEnum;
use serde::Serialize;

use rubrica_core::error::Result;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Human,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Dispatch output by format.
///
/// The json arm is an expression returning `Result<()>`; the human arm is a
/// block that prints and cannot fail.
///
/// ```rust,ignore
/// output_by_format!(cli.format,
///     json => print_json(&course),
///     human => { println!("{}", course.name); }
/// )?;
/// ```
#[macro_export]
macro_rules! output_by_format {
    ($format:expr, json => $json:expr, human => $human:block) => {
        match $format {
            $crate::cli::OutputFormat::Json => $json,
            $crate::cli::OutputFormat::Human => {
                $human;
                Ok::<(), rubrica_core::error::RubricaError>(())
            }
        }
    };
}

/// Format a score with two decimals
pub fn score(value: f64) -> String {
    format!("{:.2}", value)
}
