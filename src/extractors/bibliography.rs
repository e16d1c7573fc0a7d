use crate::bibtex;
use crate::config::RenderConfig;
use crate::data::Data;
use crate::dom::Document;
use crate::pipeline::{Extractor, StageError};

/// Reads BibTeX from the document's bibliography script blocks.
///
/// Entries are merged into `data.bibliography`; an entry replaces any
/// previously loaded entry with the same key.
pub struct ExtractBibliography {
    selector: String,
}

impl ExtractBibliography {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            selector: config.bibliography_script.clone(),
        }
    }
}

impl Extractor for ExtractBibliography {
    fn name(&self) -> &str {
        "ExtractBibliography"
    }

    fn extract(&self, document: &Document, data: &mut Data, verbose: bool) -> Result<(), StageError> {
        for script in document.query_selector_all(&self.selector)? {
            let entries = bibtex::parse_bibliography(&script.text())?;
            if verbose {
                tracing::info!(entries = entries.len(), "Parsed bibliography block");
            }
            data.bibliography.extend(entries);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::BibtexError;
    use crate::data::BibliographyEntry;

    #[test]
    fn test_extract_bibliography_from_script() {
        // Given: a document with an embedded BibTeX block
        let doc = Document::parse(
            r#"<script type="text/bibliography">
                @article{olah2016, author={Olah, Chris and Carter, Shan}, title={Attention}, year={2016}}
            </script>
            <p>Body</p>"#,
        );
        let mut data = Data::new();

        // When: we run the extractor
        ExtractBibliography::new(&RenderConfig::default())
            .extract(&doc, &mut data, false)
            .unwrap();

        // Then: the entry is available under its key
        let entry = data.entry("olah2016").unwrap();
        assert_eq!(entry.author, "Olah, Chris and Carter, Shan");
        assert_eq!(entry.year.as_deref(), Some("2016"));
    }

    #[test]
    fn test_document_entries_replace_preloaded_ones() {
        let doc = Document::parse(
            r#"<script type="text/bibliography">@misc{k, author={Doc, D}}</script>"#,
        );
        let mut data = Data::new();
        data.bibliography.insert(
            "k".to_string(),
            BibliographyEntry {
                author: "File, F".to_string(),
                ..Default::default()
            },
        );
        data.bibliography.insert("other".to_string(), BibliographyEntry::default());

        ExtractBibliography::new(&RenderConfig::default())
            .extract(&doc, &mut data, false)
            .unwrap();

        assert_eq!(data.entry("k").unwrap().author, "Doc, D");
        assert!(data.entry("other").is_some());
    }

    #[test]
    fn test_malformed_bibtex_fails_the_stage() {
        let doc = Document::parse(
            r#"<script type="text/bibliography">@article{broken, title={x}</script>"#,
        );
        let mut data = Data::new();

        let err = ExtractBibliography::new(&RenderConfig::default())
            .extract(&doc, &mut data, false)
            .unwrap_err();

        assert!(matches!(err, StageError::Bibtex(BibtexError::Syntax { .. })));
    }
}
