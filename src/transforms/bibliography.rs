use crate::citation::{bibliography_citation, short_inline_citation};
use crate::config::RenderConfig;
use crate::data::Data;
use crate::dom::Document;
use crate::extractors::split_keys;
use crate::pipeline::{StageError, Transform};

/// Resolves inline citation markers and fills the bibliography placeholder.
///
/// Each marker's content becomes its numeric citation (`[1, 3]`). When the
/// document has a placeholder, one `<ol>` with an `<li>` per cited key, in
/// citation order, is appended to it. Running this twice appends a second
/// list; nothing is removed.
pub struct Bibliography {
    cite_tag: String,
    bibliography_tag: String,
}

impl Bibliography {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            cite_tag: config.cite_tag.clone(),
            bibliography_tag: config.bibliography_tag.clone(),
        }
    }
}

impl Transform for Bibliography {
    fn name(&self) -> &str {
        "Bibliography"
    }

    fn transform(&self, document: &mut Document, data: &Data, verbose: bool) -> Result<(), StageError> {
        let mut degraded = 0;
        for marker in document.query_selector_all(&self.cite_tag)? {
            let keys = match marker.attribute("key") {
                Some(attribute) => split_keys(&attribute),
                None => Vec::new(),
            };
            let cite = if keys.is_empty() {
                // A marker without keys still shows a visible placeholder.
                short_inline_citation(&[""], data)
            } else {
                short_inline_citation(&keys, data)
            };
            if cite.is_degraded() {
                degraded += 1;
                tracing::warn!(keys = ?keys, "Unresolved citation rendered as placeholder");
            }
            marker.set_text(&cite.to_string());
        }

        if let Some(placeholder) = document.query_selector(&self.bibliography_tag)? {
            let list = document.create_element("ol")?;
            for key in &data.citations {
                let item = document.create_element("li")?;
                item.set_text(&bibliography_citation(data.entry(key)).to_string());
                list.append_child(&item);
            }
            placeholder.append_child(&list);
        }

        if verbose {
            tracing::info!(
                references = data.citations.len(),
                degraded,
                "Rendered citations"
            );
        }
        Ok(())
    }
}
