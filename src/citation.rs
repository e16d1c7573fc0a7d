//! Citation formatting.
//!
//! Turns bibliography entries into the three textual forms an article uses:
//! a numeric inline marker (`[1, 3]`), an author-year inline marker
//! (`Smith & Doe, 2020`) and a full bibliography line.
//!
//! A key without a bibliography entry never fails the render. It formats as
//! the `?` placeholder, carried as [`CiteRef::Missing`] so callers can detect
//! degraded output without matching on strings.

use std::fmt;

use crate::data::{BibliographyEntry, Data};

/// Placeholder rendered for a key that cannot be resolved.
pub const MISSING_PLACEHOLDER: &str = "?";

/// Search endpoint used by [`lookup_url`].
const LOOKUP_ENDPOINT: &str = "http://search.labs.crossref.org/dois?";

/// One formatted reference, or the placeholder when it could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CiteRef<T> {
    Resolved(T),
    Missing,
}

impl<T> CiteRef<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, CiteRef::Missing)
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            CiteRef::Resolved(value) => Some(value),
            CiteRef::Missing => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for CiteRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CiteRef::Resolved(value) => value.fmt(f),
            CiteRef::Missing => f.write_str(MISSING_PLACEHOLDER),
        }
    }
}

/// A numeric inline marker such as `[1, ?]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericCitation {
    pub refs: Vec<CiteRef<usize>>,
}

impl NumericCitation {
    /// True when at least one key rendered as the placeholder.
    pub fn is_degraded(&self) -> bool {
        self.refs.iter().any(CiteRef::is_missing)
    }
}

impl fmt::Display for NumericCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.refs, ", "))
    }
}

/// An author-year inline marker such as `Smith, et al., 2020, ?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorYearCitation {
    pub refs: Vec<CiteRef<String>>,
}

impl AuthorYearCitation {
    pub fn is_degraded(&self) -> bool {
        self.refs.iter().any(CiteRef::is_missing)
    }
}

impl fmt::Display for AuthorYearCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.refs, ", "))
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Formats `keys` as a bracketed list of first-appearance numbers.
///
/// A key resolves when it has a bibliography entry; its number is its
/// 1-based position in `data.citations`, so numbering never depends on the
/// bibliography map's iteration order.
///
/// # Examples
///
/// ```
/// use distill_render::{short_inline_citation, BibliographyEntry, Data};
///
/// let mut data = Data::new();
/// data.add_citation("a");
/// data.add_citation("b");
/// data.bibliography.insert("b".into(), BibliographyEntry::default());
///
/// let cite = short_inline_citation(&["b", "nope"], &data);
/// assert_eq!(cite.to_string(), "[2, ?]");
/// assert!(cite.is_degraded());
/// ```
pub fn short_inline_citation<K: AsRef<str>>(keys: &[K], data: &Data) -> NumericCitation {
    let refs = keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            if data.entry(key).is_none() {
                return CiteRef::Missing;
            }
            match data.citation_number(key) {
                Some(n) => CiteRef::Resolved(n),
                None => {
                    tracing::warn!(key, "Citation key has an entry but was never cited");
                    CiteRef::Missing
                }
            }
        })
        .collect();
    NumericCitation { refs }
}

/// Formats `keys` as author-year references joined by `", "`.
///
/// One author gives `"Smith, 2020"`, two give `"Smith & Doe, 2020"` and
/// three or more give `"Smith, et al., 2020"`.
pub fn long_inline_citation<K: AsRef<str>>(keys: &[K], data: &Data) -> AuthorYearCitation {
    let refs = keys
        .iter()
        .map(|key| match data.entry(key.as_ref()) {
            Some(entry) => CiteRef::Resolved(author_year(entry)),
            None => CiteRef::Missing,
        })
        .collect();
    AuthorYearCitation { refs }
}

fn author_year(entry: &BibliographyEntry) -> String {
    let surnames = entry.surnames();
    let year = entry.year.as_deref().unwrap_or_default();
    match surnames.as_slice() {
        [only] => format!("{}, {}", only, year),
        [first, second] => format!("{} & {}, {}", first, second, year),
        [first, ..] => format!("{}, et al., {}", first, year),
        [] => year.to_string(),
    }
}

/// Formats one full bibliography line.
///
/// # Examples
///
/// ```
/// use distill_render::{bibliography_citation, BibliographyEntry};
///
/// let entry = BibliographyEntry {
///     author: "Smith, John".into(),
///     year: Some("2020".into()),
///     title: Some("A Study".into()),
///     journal: Some("J. Things".into()),
///     volume: Some("5".into()),
///     issue: Some("2".into()),
///     pages: Some("10-20".into()),
///     ..Default::default()
/// };
/// assert_eq!(
///     bibliography_citation(Some(&entry)).to_string(),
///     "Smith, J., 2020. A Study. J. Things, Vol 5(2), pp. 10-20. "
/// );
/// assert_eq!(bibliography_citation(None).to_string(), "?");
/// ```
pub fn bibliography_citation(entry: Option<&BibliographyEntry>) -> CiteRef<String> {
    let Some(entry) = entry else {
        return CiteRef::Missing;
    };

    let names: Vec<String> = entry.author_names().into_iter().map(initialed_name).collect();
    let mut cite = match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    };

    cite.push_str(&format!(", {}. ", entry.year.as_deref().unwrap_or_default()));
    cite.push_str(&format!("{}. ", entry.title.as_deref().unwrap_or_default()));

    // The venue is emitted even when empty; its punctuation stays.
    let venue = non_empty(&entry.journal)
        .or_else(|| non_empty(&entry.booktitle))
        .unwrap_or_default();
    cite.push_str(venue);

    if let Some(volume) = &entry.volume {
        let issue = non_empty(&entry.issue)
            .or_else(|| non_empty(&entry.number))
            .map(|issue| format!("({})", issue))
            .unwrap_or_default();
        cite.push_str(&format!(", Vol {}{}", volume, issue));
    }
    if let Some(pages) = &entry.pages {
        cite.push_str(&format!(", pp. {}", pages));
    }
    cite.push_str(". ");

    CiteRef::Resolved(cite)
}

/// `"Last, First Middle"` becomes `"Last, F.M."`; a bare surname stays bare.
fn initialed_name(name: &str) -> String {
    let mut parts = name.split(',');
    let last = parts.next().unwrap_or_default().trim();
    let initials: String = parts
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|given| given.chars().next())
        .map(|initial| format!("{}.", initial))
        .collect();

    if initials.is_empty() {
        last.to_string()
    } else {
        format!("{}, {}", last, initials)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Builds a metadata search URL for an entry from its surnames and title.
///
/// Not used by the default render; kept for callers that link references to
/// an external lookup service.
pub fn lookup_url(entry: Option<&BibliographyEntry>) -> Option<String> {
    let entry = entry?;
    let title = entry
        .title
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let query = format!("{} {}", entry.surnames().join(" "), title);

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query.trim())
        .finish();
    Some(format!("{}{}", LOOKUP_ENDPOINT, encoded))
}
