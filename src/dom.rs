//! Document tree access.
//!
//! A thin DOM-like layer over `kuchikikiki` exposing exactly what the render
//! stages need: selector lookup, element creation, attributes, text content
//! and child insertion.

use kuchikikiki::traits::TendrilSink;
use kuchikikiki::NodeRef;
use thiserror::Error;

/// Errors raised by document tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("Document has no <body> element")]
    MissingBody,
}

/// A parsed HTML document.
///
/// Nodes are reference counted, so elements returned by queries stay
/// attached to this document and mutations through them are visible here.
#[derive(Clone)]
pub struct Document {
    root: NodeRef,
}

impl Document {
    /// Parses an HTML string. Missing `<html>`, `<head>` and `<body>`
    /// elements are synthesised by the parser.
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikikiki::parse_html().one(html),
        }
    }

    /// Returns the first element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Returns every element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let matches = self
            .root
            .select(selector)
            .map_err(|()| DomError::InvalidSelector(selector.to_string()))?;
        Ok(matches
            .map(|data| Element::new(data.as_node().clone()))
            .collect())
    }

    /// Creates a detached element with the given tag name.
    ///
    /// # Errors
    ///
    /// Returns `DomError::InvalidTagName` unless the name is non-empty and
    /// made of ASCII alphanumerics and `-`.
    pub fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        let valid = !tag.is_empty()
            && tag.starts_with(|c: char| c.is_ascii_alphabetic())
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }

        // Let the parser build the element so names and namespaces match
        // what parsed documents contain.
        let scratch = kuchikikiki::parse_html().one(format!("<{tag}></{tag}>"));
        let node = scratch
            .select_first(tag)
            .map_err(|()| DomError::InvalidTagName(tag.to_string()))?
            .as_node()
            .clone();
        node.detach();
        Ok(Element::new(node))
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<Element> {
        self.root
            .select_first("body")
            .ok()
            .map(|data| Element::new(data.as_node().clone()))
    }

    /// Sets the prerendered boundary marker on `<body>`.
    pub fn mark_prerendered(&self, attribute: &str) -> Result<(), DomError> {
        let body = self.body().ok_or(DomError::MissingBody)?;
        body.set_attribute(attribute, "");
        Ok(())
    }

    /// Whether `<body>` carries the prerendered boundary marker.
    pub fn is_prerendered(&self, attribute: &str) -> bool {
        self.body()
            .map(|body| body.has_attribute(attribute))
            .unwrap_or(false)
    }

    /// Serializes the whole document back to HTML.
    pub fn to_html(&self) -> String {
        self.root.to_string()
    }
}

/// An element node inside a [`Document`].
#[derive(Clone)]
pub struct Element {
    node: NodeRef,
}

impl Element {
    fn new(node: NodeRef) -> Self {
        Self { node }
    }

    /// Lowercase local tag name.
    pub fn tag_name(&self) -> String {
        self.node
            .as_element()
            .map(|data| data.name.local.to_string())
            .unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let data = self.node.as_element()?;
        let attributes = data.attributes.borrow();
        attributes.get(name).map(str::to_owned)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.node
            .as_element()
            .map(|data| data.attributes.borrow().contains(name))
            .unwrap_or(false)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Some(data) = self.node.as_element() {
            data.attributes
                .borrow_mut()
                .insert(name, value.to_string());
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.node.text_contents()
    }

    /// Replaces every child with a single text node.
    pub fn set_text(&self, text: &str) {
        let children: Vec<NodeRef> = self.node.children().collect();
        for child in children {
            child.detach();
        }
        self.node.append(NodeRef::new_text(text));
    }

    pub fn append_child(&self, child: &Element) {
        self.node.append(child.node.clone());
    }

    pub fn prepend_child(&self, child: &Element) {
        self.node.prepend(child.node.clone());
    }

    /// Number of direct child nodes, text nodes included.
    pub fn child_count(&self) -> usize {
        self.node.children().count()
    }

    /// Serializes this element and its subtree.
    pub fn outer_html(&self) -> String {
        self.node.to_string()
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag_name())
            .finish()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}
