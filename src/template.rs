//! Template generation probe.
//!
//! Articles load the Distill runtime with a `<script src=".../template.vN.js">`
//! tag. The probe classifies the document by that source before rendering.

use thiserror::Error;

use crate::dom::{Document, DomError};

/// Errors raised when the template generation cannot be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Does not seem to use the Distill template at all")]
    NoMarkers,

    #[error("Uses the Distill template, but an unknown version: {0}")]
    UnknownMarker(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateGeneration {
    /// `template.v1.js`
    Legacy,
    /// `template.v2.js`
    Current,
}

impl TemplateGeneration {
    pub fn is_current(self) -> bool {
        self == TemplateGeneration::Current
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateGeneration::Legacy => "v1",
            TemplateGeneration::Current => "v2",
        }
    }
}

/// Classifies `document` by its template script sources.
///
/// When several scripts match, the last one decides.
///
/// # Errors
///
/// `TemplateError::UnknownMarker` as soon as a `template.` source is neither
/// v1 nor v2; `TemplateError::NoMarkers` when no script matched.
pub fn detect_template(document: &Document) -> Result<TemplateGeneration, TemplateError> {
    let mut generation = None;
    for script in document.query_selector_all("script")? {
        let src = script.attribute("src").unwrap_or_default();
        if src.contains("template.v1.js") {
            generation = Some(TemplateGeneration::Legacy);
        } else if src.contains("template.v2.js") {
            generation = Some(TemplateGeneration::Current);
        } else if src.contains("template.") {
            return Err(TemplateError::UnknownMarker(src));
        }
    }
    generation.ok_or(TemplateError::NoMarkers)
}

/// Whether the document targets the current template generation.
pub fn uses_template_v2(document: &Document) -> Result<bool, TemplateError> {
    detect_template(document).map(TemplateGeneration::is_current)
}
