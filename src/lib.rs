//! distill-render: prerender Distill article HTML.
//!
//! This library provides functionality to:
//! - Extract citations and BibTeX bibliographies from an article document
//! - Format numeric, author-year and full bibliography citations
//! - Rewrite citation markers and fill the bibliography placeholder
//! - Inject publish-time header, appendix and footer elements
//! - Detect which template generation a document was written against

pub mod bibtex;
pub mod citation;
pub mod config;
pub mod data;
pub mod dom;
pub mod extractors;
pub mod pipeline;
pub mod refs;
pub mod template;
pub mod transforms;

pub use citation::{
    bibliography_citation, long_inline_citation, lookup_url, short_inline_citation, CiteRef,
};
pub use config::RenderConfig;
pub use data::{BibliographyEntry, CitationKey, Data};
pub use dom::{Document, Element};
pub use pipeline::{distillify, render, Pipeline, PipelineError};
pub use refs::load_refs;
pub use template::{detect_template, uses_template_v2, TemplateError, TemplateGeneration};
