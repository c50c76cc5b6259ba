//! JSON I/O handling for CLI
//!
//! - Input: raw keys read from files
//! - Output: single JSON object per command via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a raw key from a JSON file
pub fn read_key_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read key {:?}: {}", path, e)))?;

    if content.trim().is_empty() {
        return Err(CliError::io_error(format!("Key file {:?} is empty", path)));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_key_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("key.json");
        fs::write(&path, r#"{"id": "k1", "taxa": []}"#).unwrap();
        assert_eq!(read_key_file(&path).unwrap()["id"], "k1");

        fs::write(&path, "  \n").unwrap();
        assert_eq!(read_key_file(&path).unwrap_err().code_str(), "TAXAKEY_CLI_IO_ERROR");
        assert!(read_key_file(&dir.path().join("missing.json")).is_err());
    }
}
