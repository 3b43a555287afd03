//! Plain-text word and domain lists
//!
//! One entry per line; lines are trimmed and blank lines ignored.

use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Reads a required list
pub fn read_list(path: &Path) -> ConfigResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::WordList {
        path: path.display().to_string(),
        source,
    })?;

    Ok(parse_list(&content))
}

/// Reads a list that may be absent; a missing file is an empty list
pub fn read_optional_list(path: &Path) -> ConfigResult<Vec<String>> {
    if !path.exists() {
        tracing::debug!("{} not found, using an empty list", path.display());
        return Ok(Vec::new());
    }

    read_list(path)
}

fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
