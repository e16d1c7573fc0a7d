use crate::config::RenderConfig;
use crate::data::{CitationKey, Data};
use crate::dom::Document;
use crate::pipeline::{Extractor, StageError};

/// Records cited keys in order of first appearance.
pub struct ExtractCitations {
    cite_tag: String,
}

impl ExtractCitations {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            cite_tag: config.cite_tag.clone(),
        }
    }
}

impl Extractor for ExtractCitations {
    fn name(&self) -> &str {
        "ExtractCitations"
    }

    fn extract(&self, document: &Document, data: &mut Data, verbose: bool) -> Result<(), StageError> {
        let markers = document.query_selector_all(&self.cite_tag)?;
        for marker in &markers {
            let keys = marker.attribute("key").map(|k| split_keys(&k)).unwrap_or_default();
            for key in keys {
                data.add_citation(&key);
            }
        }

        if verbose {
            tracing::info!(
                markers = markers.len(),
                keys = data.citations.len(),
                "Collected citations"
            );
        }
        Ok(())
    }
}

/// Splits a marker's comma-separated `key` attribute, trimming each key and
/// dropping empty ones.
pub fn split_keys(attribute: &str) -> Vec<CitationKey> {
    attribute
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keys_trims() {
        assert_eq!(split_keys("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_keys(" , "), Vec::<String>::new());
    }

    #[test]
    fn test_extract_citations_first_appearance_order() {
        // Given: markers citing keys with repeats across the document
        let doc = Document::parse(
            r#"<p>Intro <dt-cite key="olah2016, gregor2015"></dt-cite></p>
               <p>Again <dt-cite key="gregor2015"></dt-cite> and <dt-cite key="mercier2011"></dt-cite></p>
               <p>Unkeyed <dt-cite></dt-cite></p>"#,
        );
        let mut data = Data::new();

        // When: we run the extractor
        ExtractCitations::new(&RenderConfig::default())
            .extract(&doc, &mut data, false)
            .unwrap();

        // Then: keys are numbered by first appearance
        assert_eq!(data.citations, vec!["olah2016", "gregor2015", "mercier2011"]);
    }
}
