//! In-memory HTML document with selector queries and form control state.
//!
//! # Example
//!
//! ```
//! use themeform::dom::parse_html;
//!
//! let doc = parse_html(r#"<form><input name="a" value="1rem"></form>"#);
//! let input = doc.query_selector("input[name=a]").unwrap().unwrap();
//! assert_eq!(doc.value_of(input), "1rem");
//! ```

mod arena;
mod controls;
mod element_ref;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Document, Node, NodeData, NodeId, attr_name, html_name};
pub use controls::FormEntry;
pub use element_ref::{ElementRef, FormSelectors, NonTSPseudoClass};

use cssparser::{Parser, ParserInput};
use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, SelectorList};

use crate::error::{Error, Result};
use tree_sink::DocumentSink;

/// Parse an HTML string into a [`Document`].
pub fn parse_html(html: &str) -> Document {
    let sink = DocumentSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    let mut doc = result.into_document();
    doc.rebuild_id_map();
    doc
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(selector: &str) -> Result<SelectorList<FormSelectors>> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    SelectorList::parse(&FormSelectors, &mut parser, ParseRelative::No)
        .map_err(|_| Error::InvalidSelector(selector.to_string()))
}

/// Check an element against a parsed selector list.
pub fn matches_selector(doc: &Document, node: NodeId, list: &SelectorList<FormSelectors>) -> bool {
    if !doc.is_element(node) {
        return false;
    }
    let elem = ElementRef::new(doc, node);
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        selectors::matching::MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        selectors::matching::NeedsSelectorFlags::No,
        selectors::matching::MatchingForInvalidation::No,
    );
    list.slice()
        .iter()
        .any(|selector| selectors::matching::matches_selector(selector, 0, None, &elem, &mut context))
}

impl Document {
    /// All attached elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = parse_selector_list(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .filter(|node| matches_selector(self, *node, &list))
            .collect())
    }

    /// First attached element matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let list = parse_selector_list(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .find(|node| matches_selector(self, *node, &list)))
    }

    /// Check a single element against `selector`.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        let list = parse_selector_list(selector)?;
        Ok(matches_selector(self, node, &list))
    }

    /// Attached elements carrying `attr`, whatever its value.
    pub fn elements_with_attr(&self, attr: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|node| self.has_attr(*node, attr))
            .collect()
    }

    /// Replace an element's children with parsed markup.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        let fragment = parse_html(&format!("<!DOCTYPE html><html><body>{html}</body></html>"));
        if let Some(body) = fragment.find_by_tag("body") {
            for child in fragment.children(body).collect::<Vec<_>>() {
                self.import_node(&fragment, child, node);
            }
        }
        self.rebuild_id_map();
    }

    /// Deep-copy `source` from another document under `parent`.
    fn import_node(&mut self, other: &Document, source: NodeId, parent: NodeId) {
        let Some(node) = other.get(source) else {
            return;
        };
        let copy = match &node.data {
            NodeData::Element { name, attrs, .. } => self.create_element(name.clone(), attrs.clone()),
            NodeData::Text(text) => self.create_text(text.clone()),
            NodeData::Comment(text) => self.create_comment(text.clone()),
            NodeData::Document | NodeData::Doctype { .. } => return,
        };
        self.append(parent, copy);
        for child in other.children(source).collect::<Vec<_>>() {
            self.import_node(other, child, copy);
        }
    }
}
