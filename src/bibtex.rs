//! BibTeX reader.
//!
//! Parses the BibTeX embedded in an article's bibliography script block (or
//! a standalone `.bib` file) into [`BibliographyEntry`] values. Supports:
//! - `@string` macros and `#` concatenation
//! - braced, quoted, numeric and macro field values
//! - nested braces inside values
//!
//! `@comment` and `@preamble` blocks are skipped.

use std::collections::HashMap;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::data::{BibliographyEntry, CitationKey};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Errors that can occur when reading BibTeX.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BibtexError {
    #[error("Invalid BibTeX at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// One parsed `@type{key, ...}` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexRecord {
    pub entry_type: String,
    pub key: CitationKey,
    pub fields: Vec<(String, String)>,
}

impl From<BibtexRecord> for BibliographyEntry {
    fn from(record: BibtexRecord) -> Self {
        BibliographyEntry::from_fields(Some(record.entry_type), record.fields)
    }
}

/// Parses BibTeX into a key-to-entry map. Later duplicates win.
pub fn parse_bibliography(input: &str) -> Result<HashMap<CitationKey, BibliographyEntry>, BibtexError> {
    Ok(parse_records(input)?
        .into_iter()
        .map(|record| (record.key.clone(), BibliographyEntry::from(record)))
        .collect())
}

/// Parses BibTeX into records, in source order.
///
/// # Errors
///
/// Returns `BibtexError::Syntax` with the 1-based line of the first
/// malformed `@` block.
pub fn parse_records(input: &str) -> Result<Vec<BibtexRecord>, BibtexError> {
    let mut records = Vec::new();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut remaining = input;

    while let Some(at) = remaining.find('@') {
        remaining = &remaining[at..];
        let line = line_of(input, remaining);

        let parsed = parse_at_block(remaining, &strings).map_err(|e| BibtexError::Syntax {
            line,
            message: describe(&e),
        })?;
        let (rest, block) = parsed;
        match block {
            AtBlock::Record(record) => records.push(record),
            AtBlock::StringMacro(name, value) => {
                strings.insert(name.to_ascii_lowercase(), value);
            }
            AtBlock::Skipped => {}
        }
        remaining = rest;
    }

    Ok(records)
}

enum AtBlock {
    Record(BibtexRecord),
    StringMacro(String, String),
    Skipped,
}

fn line_of(input: &str, remaining: &str) -> usize {
    let offset = input.len() - remaining.len();
    input[..offset].matches('\n').count() + 1
}

fn describe(err: &nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Incomplete(_) => "unexpected end of input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near: String = e.input.chars().take(20).collect();
            format!("expected {:?} near {:?}", e.code, near)
        }
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(input)
}

fn parse_at_block<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;

    match entry_type.to_ascii_lowercase().as_str() {
        "comment" | "preamble" => {
            let (rest, _) = braced(rest)?;
            Ok((rest, AtBlock::Skipped))
        }
        "string" => {
            let (rest, _) = char('{')(rest)?;
            let (rest, (name, value)) = field(rest, strings)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char('}')(rest)?;
            Ok((rest, AtBlock::StringMacro(name, value)))
        }
        _ => {
            let (rest, _) = char('{')(rest)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, key) = identifier(rest)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, fields) = fields(rest, strings)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char('}')(rest)?;
            Ok((
                rest,
                AtBlock::Record(BibtexRecord {
                    entry_type: entry_type.to_ascii_lowercase(),
                    key: key.to_string(),
                    fields,
                }),
            ))
        }
    }
}

/// Zero or more `, name = value` pairs; a trailing comma is allowed.
fn fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let Some(rest) = rest.strip_prefix(',') else {
            return Ok((rest, fields));
        };
        let (rest, _) = multispace0(rest)?;
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }
        let (rest, pair) = field(rest, strings)?;
        fields.push(pair);
        remaining = rest;
    }
}

fn field<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) = identifier(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = value(rest, strings)?;
    Ok((rest, (name.to_ascii_lowercase(), clean(&value))))
}

/// A value with optional `#` concatenation.
fn value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            map(braced, |s: &str| s[1..s.len() - 1].to_string()),
            quoted,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(identifier, |name: &str| {
                strings
                    .get(&name.to_ascii_lowercase())
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;
        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(next) => remaining = next,
            None => return Ok((rest, result)),
        }
    }
}

/// `{...}` with nesting, returned including the outer braces.
fn braced(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0usize;
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::TakeUntil,
    )))
}

/// `"..."`, where braces may protect inner quotes.
fn quoted(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('"')(input)?;
    let mut depth = 0usize;
    for (pos, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => return Ok((&rest[pos + 1..], rest[..pos].to_string())),
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Drops protective braces and collapses runs of whitespace.
fn clean(value: &str) -> String {
    let unbraced: String = value.chars().filter(|c| *c != '{' && *c != '}').collect();
    WHITESPACE.replace_all(unbraced.trim(), " ").into_owned()
}
