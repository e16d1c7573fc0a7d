//! Bibliographic record model and the shared render context.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of one bibliography entry.
pub type CitationKey = String;

/// One bibliographic record.
///
/// `author` holds one or more `"Last, First Middle"` names joined by
/// `" and "`, the way BibTeX writes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographyEntry {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub author: String,
    #[serde(deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booktitle: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BibliographyEntry {
    /// Builds an entry from BibTeX-style `(field, value)` pairs.
    ///
    /// Field names are matched case-insensitively; unknown fields are dropped.
    pub fn from_fields<I, K, V>(entry_type: Option<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entry = Self {
            entry_type,
            ..Self::default()
        };
        for (name, value) in fields {
            let value = value.into();
            match name.as_ref().to_ascii_lowercase().as_str() {
                "author" => entry.author = value,
                "year" => entry.year = Some(value),
                "title" => entry.title = Some(value),
                "journal" => entry.journal = Some(value),
                "booktitle" => entry.booktitle = Some(value),
                "volume" => entry.volume = Some(value),
                "issue" => entry.issue = Some(value),
                "number" => entry.number = Some(value),
                "pages" => entry.pages = Some(value),
                "doi" => entry.doi = Some(value),
                "url" => entry.url = Some(value),
                _ => {}
            }
        }
        entry
    }

    /// The individual author names, split on `" and "` and trimmed.
    pub fn author_names(&self) -> Vec<&str> {
        self.author.split(" and ").map(str::trim).collect()
    }

    /// Family names only: the text before each name's first comma.
    pub fn surnames(&self) -> Vec<&str> {
        self.author_names()
            .into_iter()
            .map(|name| name.split(',').next().unwrap_or(name).trim())
            .collect()
    }
}

/// Context shared by every stage of one render.
///
/// Extractors fill it from the document; transforms only read it.
#[derive(Debug, Clone, Default)]
pub struct Data {
    /// Citation keys in order of first appearance. This order numbers the
    /// inline markers and the bibliography list.
    pub citations: Vec<CitationKey>,
    pub bibliography: HashMap<CitationKey, BibliographyEntry>,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a render context from an already loaded bibliography.
    pub fn with_bibliography(bibliography: HashMap<CitationKey, BibliographyEntry>) -> Self {
        Self {
            citations: Vec::new(),
            bibliography,
        }
    }

    /// Records `key` unless it has already been cited.
    pub fn add_citation(&mut self, key: &str) {
        if !self.citations.iter().any(|k| k == key) {
            self.citations.push(key.to_string());
        }
    }

    /// 1-based first-appearance number of `key`.
    pub fn citation_number(&self, key: &str) -> Option<usize> {
        self.citations.iter().position(|k| k == key).map(|i| i + 1)
    }

    pub fn entry(&self, key: &str) -> Option<&BibliographyEntry> {
        self.bibliography.get(key)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_citation_keeps_first_appearance() {
        // Given: keys cited with repeats
        let mut data = Data::new();

        // When: we record them in reading order
        for key in ["b", "a", "b", "c", "a"] {
            data.add_citation(key);
        }

        // Then: only first appearances are kept, in order
        assert_eq!(data.citations, vec!["b", "a", "c"]);
        assert_eq!(data.citation_number("b"), Some(1));
        assert_eq!(data.citation_number("c"), Some(3));
        assert_eq!(data.citation_number("zzz"), None);
    }

    #[test]
    fn test_entry_deserializes_numbers_as_strings() {
        let json = r#"{"author": "Smith, John", "year": 2020, "volume": 5, "title": "A Study"}"#;

        let entry: BibliographyEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.year.as_deref(), Some("2020"));
        assert_eq!(entry.volume.as_deref(), Some("5"));
        assert_eq!(entry.issue, None);
        assert_eq!(entry.title.as_deref(), Some("A Study"));
    }

    #[test]
    fn test_from_fields_is_case_insensitive() {
        let entry = BibliographyEntry::from_fields(
            Some("article".to_string()),
            [("Author", "Doe, Jane"), ("YEAR", "1999"), ("keywords", "ignored")],
        );

        assert_eq!(entry.author, "Doe, Jane");
        assert_eq!(entry.year.as_deref(), Some("1999"));
        assert_eq!(entry.entry_type.as_deref(), Some("article"));
    }

    #[test]
    fn test_surnames_tolerate_irregular_spacing() {
        let entry = BibliographyEntry {
            author: "  Smith , John and Doe,Jane and Plato ".to_string(),
            ..Default::default()
        };

        assert_eq!(entry.surnames(), vec!["Smith", "Doe", "Plato"]);
    }
}
