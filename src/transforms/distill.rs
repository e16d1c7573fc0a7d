//! Publish-time chrome for articles hosted on the Distill site.
//!
//! Each transform inserts its element once; a document that already has one
//! is left alone.

use crate::data::Data;
use crate::dom::{Document, DomError};
use crate::pipeline::{StageError, Transform};

/// Where an injected element goes inside `<body>`.
enum Position {
    First,
    Last,
}

fn inject(document: &Document, tag: &str, position: Position, verbose: bool) -> Result<(), StageError> {
    if document.query_selector(tag)?.is_some() {
        if verbose {
            tracing::info!(tag, "Element already present");
        }
        return Ok(());
    }

    let body = document.body().ok_or(DomError::MissingBody)?;
    let element = document.create_element(tag)?;
    match position {
        Position::First => body.prepend_child(&element),
        Position::Last => body.append_child(&element),
    }
    Ok(())
}

/// Prepends `<distill-header>` to the body.
pub struct DistillHeader;

impl Transform for DistillHeader {
    fn name(&self) -> &str {
        "DistillHeader"
    }

    fn transform(&self, document: &mut Document, _data: &Data, verbose: bool) -> Result<(), StageError> {
        inject(document, "distill-header", Position::First, verbose)
    }
}

/// Appends `<distill-appendix>` to the body.
pub struct DistillAppendix;

impl Transform for DistillAppendix {
    fn name(&self) -> &str {
        "DistillAppendix"
    }

    fn transform(&self, document: &mut Document, _data: &Data, verbose: bool) -> Result<(), StageError> {
        inject(document, "distill-appendix", Position::Last, verbose)
    }
}

/// Appends `<distill-footer>` to the body.
pub struct DistillFooter;

impl Transform for DistillFooter {
    fn name(&self) -> &str {
        "DistillFooter"
    }

    fn transform(&self, document: &mut Document, _data: &Data, verbose: bool) -> Result<(), StageError> {
        inject(document, "distill-footer", Position::Last, verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_all(document: &mut Document) {
        let data = Data::new();
        DistillHeader.transform(document, &data, false).unwrap();
        DistillAppendix.transform(document, &data, false).unwrap();
        DistillFooter.transform(document, &data, false).unwrap();
    }

    #[test]
    fn test_chrome_wraps_article() {
        // Given: a body with only an article
        let mut doc = Document::parse("<body><dt-article>Text</dt-article></body>");

        // When: the publish transforms run in order
        run_all(&mut doc);

        // Then: header first, appendix and footer after the article
        let html = doc.to_html();
        assert!(html.contains(
            "<body><distill-header></distill-header><dt-article>Text</dt-article>\
             <distill-appendix></distill-appendix><distill-footer></distill-footer></body>"
        ));
    }

    #[test]
    fn test_existing_elements_are_not_duplicated() {
        let mut doc = Document::parse("<body><distill-header>Custom</distill-header></body>");

        run_all(&mut doc);
        run_all(&mut doc);

        assert_eq!(doc.query_selector_all("distill-header").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("distill-footer").unwrap().len(), 1);
        assert_eq!(
            doc.query_selector("distill-header").unwrap().unwrap().text(),
            "Custom"
        );
    }
}
