//! Roster file validation. Runs before anything is sent to the store.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please upload a JSON file")]
    NotJsonFile,
    #[error("Invalid JSON format")]
    InvalidJson,
    #[error("File must contain a JSON array")]
    NotAnArray,
    #[error("Portfolio array cannot be empty")]
    Empty,
    #[error("Item at index {0} must be a string")]
    NotAString(usize),
    #[error("Item at index {0} cannot be empty")]
    BlankItem(usize),
    #[error("Duplicate portfolios found")]
    Duplicates,
}

pub fn parse_roster(file_name: &str, contents: &str) -> Result<Vec<String>, UploadError> {
    if !file_name.ends_with(".json") {
        return Err(UploadError::NotJsonFile);
    }
    let value: Value = serde_json::from_str(contents).map_err(|_| UploadError::InvalidJson)?;
    validate_roster(&value)
}

/// Returns the trimmed names in file order.
pub fn validate_roster(value: &Value) -> Result<Vec<String>, UploadError> {
    let items = value.as_array().ok_or(UploadError::NotAnArray)?;
    if items.is_empty() {
        return Err(UploadError::Empty);
    }

    let mut names = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let name = item.as_str().ok_or(UploadError::NotAString(index))?.trim();
        if name.is_empty() {
            return Err(UploadError::BlankItem(index));
        }
        names.push(name.to_string());
    }

    let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
    if unique.len() != names.len() {
        return Err(UploadError::Duplicates);
    }

    Ok(names)
}

pub fn read_roster_file(path: &Path) -> Result<Vec<String>> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading roster file {}", path.display()))?;
    let names = parse_roster(file_name, &contents)?;
    Ok(names)
}
