//! Init config command for the operator CLI.

use crate::config::OpsConfig;
use crate::errors::CliError;
use std::path::{Path, PathBuf};

/// Writes the default configuration and returns where it went.
///
/// An existing file is left untouched.
pub async fn run(output: Option<&Path>) -> Result<PathBuf, CliError> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => OpsConfig::default_path()
            .ok_or_else(|| CliError::ConfigError("no configuration directory".to_string()))?,
    };

    if path.exists() {
        return Err(CliError::ConfigError(format!(
            "{} already exists",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    OpsConfig::default().to_file(&path)?;
    Ok(path)
}
