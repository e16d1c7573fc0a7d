//! External bibliography loading.
//!
//! Reads bibliography entries from a file given on the command line, so an
//! article can cite records that are not embedded in its own bibliography
//! script block. Supported formats:
//! - BibTeX (`.bib`)
//! - a JSON array of entries, each with an `id`
//! - a JSON object keyed by citation key
//! - JSONL (one entry object with an `id` per line)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::bibtex::{self, BibtexError};
use crate::data::{BibliographyEntry, CitationKey};

/// Errors that can occur when loading references.
#[derive(Error, Debug)]
pub enum RefsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSONL at line {line}: {message}")]
    JsonlError { line: usize, message: String },

    #[error("Reference #{index} has no string \"id\"")]
    MissingId { index: usize },

    #[error(transparent)]
    Bibtex(#[from] BibtexError),

    #[error("References must be a JSON array or object")]
    NotACollection,
}

/// Loads a bibliography map from a BibTeX, JSON or JSONL file.
///
/// The format is chosen from the `.bib` extension; anything else is read
/// as JSON or JSONL.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_refs(path: &Path) -> Result<HashMap<CitationKey, BibliographyEntry>, RefsError> {
    let content = fs::read_to_string(path)?;
    let is_bibtex = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("bib"));

    if is_bibtex {
        Ok(bibtex::parse_bibliography(&content)?)
    } else {
        parse_json_refs(&content)
    }
}

/// Parses JSON or JSONL reference content into a bibliography map.
pub fn parse_json_refs(content: &str) -> Result<HashMap<CitationKey, BibliographyEntry>, RefsError> {
    let trimmed = content.trim();

    // Empty content returns an empty bibliography
    if trimmed.is_empty() {
        return Ok(HashMap::new());
    }

    if trimmed.starts_with('{') {
        // A single object is either a keyed map or the first line of JSONL
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            if map.values().all(Value::is_object) {
                let mut refs = HashMap::new();
                for (key, value) in map {
                    refs.insert(key, serde_json::from_value(value)?);
                }
                return Ok(refs);
            }
            return keyed_by_id(vec![Value::Object(map)]);
        }
        return keyed_by_id(parse_jsonl(content)?);
    }

    match serde_json::from_str::<Value>(trimmed)? {
        Value::Array(items) => keyed_by_id(items),
        _ => Err(RefsError::NotACollection),
    }
}

/// Parses each non-empty line as one JSON value.
fn parse_jsonl(content: &str) -> Result<Vec<Value>, RefsError> {
    let mut refs = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => refs.push(value),
            Err(e) => {
                return Err(RefsError::JsonlError {
                    line: line_num + 1, // 1-indexed line numbers
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(refs)
}

fn keyed_by_id(items: Vec<Value>) -> Result<HashMap<CitationKey, BibliographyEntry>, RefsError> {
    let mut refs = HashMap::new();
    for (index, item) in items.into_iter().enumerate() {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(RefsError::MissingId { index })?;
        refs.insert(id, serde_json::from_value(item)?);
    }
    Ok(refs)
}
