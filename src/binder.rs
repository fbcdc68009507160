//! Registry of bound forms.
//!
//! The binder replaces a global form-to-controller lookup: it owns every
//! [`ThemeEditor`], keyed by form node, and is told explicitly when forms
//! appear and disappear.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::EditorOptions;
use crate::dom::{Document, NodeId};
use crate::editor::{FieldEvent, ThemeEditor};
use crate::error::{Error, Result};

/// Selector for forms that opt into theme editing.
pub const THEME_FORM_SELECTOR: &str = "form[data-theme-editor]";

/// Owns one [`ThemeEditor`] per bound form.
#[derive(Debug, Default)]
pub struct ThemeBinder {
    editors: HashMap<NodeId, ThemeEditor>,
    options: EditorOptions,
}

impl ThemeBinder {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            editors: HashMap::new(),
            options,
        }
    }

    /// Bind every `form[data-theme-editor]` not bound yet.
    ///
    /// Returns the newly bound forms in document order. A form that fails to
    /// bind is logged and skipped.
    pub fn bind_all(&mut self, doc: &mut Document) -> Result<Vec<NodeId>> {
        let mut bound = Vec::new();
        for form in doc.query_selector_all(THEME_FORM_SELECTOR)? {
            if self.editors.contains_key(&form) {
                continue;
            }
            match self.form_inserted(doc, form) {
                Ok(_) => bound.push(form),
                Err(err) => warn!("could not bind form: {err}"),
            }
        }
        Ok(bound)
    }

    /// Bind a form that was just inserted into the document.
    pub fn form_inserted(&mut self, doc: &mut Document, form: NodeId) -> Result<&mut ThemeEditor> {
        if self.editors.contains_key(&form) {
            return Err(Error::AlreadyBound);
        }
        let editor = ThemeEditor::bind(doc, form, self.options.clone())?;
        debug!("registered editor for {form:?}");
        Ok(self.editors.entry(form).or_insert(editor))
    }

    /// Dispose the editor of a form that left the document.
    pub fn form_removed(&mut self, doc: &mut Document, form: NodeId) -> Result<()> {
        let editor = self.editors.remove(&form).ok_or(Error::NotBound)?;
        editor.dispose(doc);
        debug!("unregistered editor for {form:?}");
        Ok(())
    }

    /// Route a field event to every editor that owns `node`: the editor of
    /// its enclosing form, plus any editor that captured it through
    /// `data-sync`. Returns how many editors handled it.
    pub fn handle_field_event(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        event: FieldEvent,
    ) -> Result<usize> {
        let enclosing = doc.closest_by_tag(node, "form");
        let mut owners: Vec<NodeId> = self
            .editors
            .iter()
            .filter(|(form, editor)| Some(**form) == enclosing || editor.form().field(node).is_some())
            .map(|(form, _)| *form)
            .collect();
        if owners.is_empty() {
            let name = doc.get_attr(node, "name").or_else(|| doc.element_id(node));
            return Err(Error::UnknownField(name.unwrap_or("<unnamed>").to_string()));
        }
        owners.sort();

        for form in &owners {
            if let Some(editor) = self.editors.get_mut(form) {
                editor.handle_field_event(doc, node, event);
            }
        }
        Ok(owners.len())
    }

    pub fn editor(&self, form: NodeId) -> Option<&ThemeEditor> {
        self.editors.get(&form)
    }

    pub fn editor_mut(&mut self, form: NodeId) -> Option<&mut ThemeEditor> {
        self.editors.get_mut(&form)
    }

    /// Bound forms in node order.
    pub fn forms(&self) -> Vec<NodeId> {
        let mut forms: Vec<NodeId> = self.editors.keys().copied().collect();
        forms.sort();
        forms
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Dispose every editor.
    pub fn dispose_all(&mut self, doc: &mut Document) {
        for (_, editor) in self.editors.drain() {
            editor.dispose(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const PAGE: &str = r#"<body>
        <form id="a" data-theme-editor>
            <input id="a-color" name="selector(.a)::property(color)" value="red">
        </form>
        <form id="b" data-theme-editor>
            <input id="b-color" name="selector(.b)::property(color)" value="blue">
        </form>
        <form id="plain"><input id="p" name="q"></form>
    </body>"#;

    #[test]
    fn test_bind_all_binds_theme_forms_once() {
        let mut doc = parse_html(PAGE);
        let mut binder = ThemeBinder::default();

        let bound = binder.bind_all(&mut doc).unwrap();
        assert_eq!(bound.len(), 2);
        assert!(binder.editor(doc.get_by_id("plain").unwrap()).is_none());

        assert!(binder.bind_all(&mut doc).unwrap().is_empty());
        assert_eq!(binder.len(), 2);
    }

    #[test]
    fn test_double_insert_is_rejected() {
        let mut doc = parse_html(PAGE);
        let mut binder = ThemeBinder::default();
        let a = doc.get_by_id("a").unwrap();

        binder.form_inserted(&mut doc, a).unwrap();
        assert!(matches!(
            binder.form_inserted(&mut doc, a),
            Err(Error::AlreadyBound)
        ));
    }

    #[test]
    fn test_events_route_to_owning_form_only() {
        let mut doc = parse_html(PAGE);
        let mut binder = ThemeBinder::default();
        binder.bind_all(&mut doc).unwrap();
        let a = doc.get_by_id("a").unwrap();
        let b = doc.get_by_id("b").unwrap();

        let input = doc.get_by_id("a-color").unwrap();
        doc.set_value(input, "green");
        assert_eq!(binder.handle_field_event(&mut doc, input, FieldEvent::Input).unwrap(), 1);

        assert_eq!(binder.editor(a).unwrap().css(), ".a {\n    color: green;\n}\n");
        assert_eq!(binder.editor(b).unwrap().css(), ".b {\n    color: blue;\n}\n");

        let stray = doc.get_by_id("p").unwrap();
        assert!(matches!(
            binder.handle_field_event(&mut doc, stray, FieldEvent::Change),
            Err(Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_removal_disposes_editor() {
        let mut doc = parse_html(PAGE);
        let mut binder = ThemeBinder::default();
        binder.bind_all(&mut doc).unwrap();
        let a = doc.get_by_id("a").unwrap();
        let style_id = binder.editor(a).unwrap().stylesheet_id().to_string();

        binder.form_removed(&mut doc, a).unwrap();
        assert!(doc.get_by_id(&style_id).is_none());
        assert!(matches!(binder.form_removed(&mut doc, a), Err(Error::NotBound)));

        binder.dispose_all(&mut doc);
        assert!(binder.is_empty());
        assert_eq!(doc.query_selector_all("style").unwrap().len(), 0);
    }
}
