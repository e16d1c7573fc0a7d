//! Extraction stages: read the document, fill [`Data`](crate::Data).

mod bibliography;
mod citations;

pub use bibliography::ExtractBibliography;
pub use citations::{split_keys, ExtractCitations};
