//! Reading JSON documents from a file or stdin

use std::fs;
use std::io::{self, Read};

use serde::de::DeserializeOwned;

use rubrica_core::error::{RubricaError, Result};

/// Read `source` (a path, or `-` for stdin) and parse it as JSON
pub fn read_json<T: DeserializeOwned>(source: &str) -> Result<T> {
    let text = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(source)?
    };

    serde_json::from_str(&text).map_err(|e| RubricaError::invalid_value("JSON input", e))
}
