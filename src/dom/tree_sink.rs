//! html5ever `TreeSink` that parses straight into the arena.
//!
//! Nodes are linked with [`Document::unlink`] during parsing; the id lookup
//! is rebuilt once by [`parse_html`](super::parse_html) afterwards.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as ParsedAttribute, LocalName, Namespace, QualName, local_name, ns};

use super::arena::{Attribute, Document, NodeData, NodeId};

/// Element name handed back to the tree builder.
///
/// Names are cloned out of the arena; atoms make this a refcount bump.
#[derive(Debug)]
pub struct SinkName(QualName);

impl ElemName for SinkName {
    fn ns(&self) -> &Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

pub struct DocumentSink {
    doc: RefCell<Document>,
}

impl DocumentSink {
    pub fn new() -> Self {
        Self {
            doc: RefCell::new(Document::new()),
        }
    }

    pub fn into_document(self) -> Document {
        self.doc.into_inner()
    }

    fn insert(doc: &mut Document, parent: NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(node) => {
                doc.unlink(node);
                doc.append(parent, node);
            }
            NodeOrText::AppendText(text) => doc.append_text(parent, &text),
        }
    }
}

fn convert_attrs(attrs: Vec<ParsedAttribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|a| Attribute {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

impl TreeSink for DocumentSink {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a>
        = SinkName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    // Browsers recover from malformed markup; so do we.
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> NodeId {
        self.doc.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> SinkName {
        let doc = self.doc.borrow();
        match doc.get(*target).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => SinkName(name.clone()),
            _ => SinkName(QualName::new(None, ns!(), local_name!(""))),
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<ParsedAttribute>, _flags: ElementFlags) -> NodeId {
        self.doc.borrow_mut().create_element(name, convert_attrs(attrs))
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(data.to_string())
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        Self::insert(&mut self.doc.borrow_mut(), *parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let mut doc = self.doc.borrow_mut();
        let parent = doc.parent(*element).unwrap_or(*prev_element);
        Self::insert(&mut doc, parent, child);
    }

    fn append_doctype_to_document(&self, name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {
        let mut doc = self.doc.borrow_mut();
        let root = doc.root();
        let doctype = doc.create_doctype(name.to_string());
        doc.append(root, doctype);
    }

    // Template contents are kept inline; forms never live inside templates.
    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    // Selector matching always runs in no-quirks mode.
    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => {
                doc.unlink(node);
                node
            }
            NodeOrText::AppendText(text) => doc.create_text(text.to_string()),
        };
        doc.insert_before(*sibling, node);
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<ParsedAttribute>) {
        let mut doc = self.doc.borrow_mut();
        for attr in attrs {
            let local = attr.name.local.as_ref();
            if !doc.has_attr(*target, local) {
                doc.set_attr(*target, local, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.doc.borrow_mut().unlink(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        let children: Vec<NodeId> = doc.children(*node).collect();
        for child in children {
            doc.unlink(child);
            doc.append(*new_parent, child);
        }
    }
}
