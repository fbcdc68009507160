//! The per-form controller.
//!
//! A [`ThemeEditor`] owns one bound form: its captured model, the initial
//! value snapshot and the dedicated `<style>` element it regenerates. Every
//! field event runs to completion: synchronize the field's group, then
//! project the whole form again.

use log::{debug, info};

use crate::config::EditorOptions;
use crate::css::UnitConverter;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::form::{Form, SyncOutcome, set_css_value};
use crate::project::{
    InitialValues, code_output, collect_assets, project_attributes, render_css, update_visibility,
    write_code_slots,
};
use crate::util::unique_id;

/// Prefix of generated `<style>` element ids.
pub const STYLESHEET_ID_PREFIX: &str = "dynamic-stylesheet";

/// The DOM event that reached a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Input,
    Change,
}

/// Controller for one bound theme form.
#[derive(Debug)]
pub struct ThemeEditor {
    form: Form,
    initial: InitialValues,
    options: EditorOptions,
    stylesheet_id: String,
    css: String,
}

impl ThemeEditor {
    /// Bind a `<form>`.
    ///
    /// Captures the form, snapshots initial values from existing
    /// stylesheets and writes them into their controls, synchronizes every
    /// named field, then creates the dedicated `<style>` element and
    /// projects once.
    pub fn bind(doc: &mut Document, form: NodeId, options: EditorOptions) -> Result<Self> {
        let captured = Form::capture(doc, form)?;
        let initial = InitialValues::scan(doc, &captured, &options);
        apply_initial_values(doc, form, &initial);

        {
            let units = UnitConverter::new(&options.config.layout, options.config.rem_base);
            let named: Vec<NodeId> = captured.named_fields().map(|f| f.node).collect();
            for node in named {
                captured.synchronize(doc, node, &units);
            }
        }

        let mut stylesheet_id = unique_id(STYLESHEET_ID_PREFIX);
        while doc.get_by_id(&stylesheet_id).is_some() {
            stylesheet_id = unique_id(STYLESHEET_ID_PREFIX);
        }

        let mut editor = Self {
            form: captured,
            initial,
            options,
            stylesheet_id,
            css: String::new(),
        };
        editor.project(doc);

        info!(
            "bound form with {} field(s), {} initial value(s), {} binding error(s)",
            editor.form.fields().len(),
            editor.initial.len(),
            editor.form.binding_errors().len()
        );
        Ok(editor)
    }

    /// React to an input or change event on `node`.
    ///
    /// Synchronizes the node's group when it is a captured field, then
    /// regenerates the stylesheet. Returns the generated CSS.
    pub fn handle_field_event(&mut self, doc: &mut Document, node: NodeId, event: FieldEvent) -> &str {
        debug!("{event:?} on {node:?}");
        self.synchronize(doc, node);
        self.project(doc)
    }

    /// Synchronize `node`'s group without projecting.
    pub fn synchronize(&self, doc: &mut Document, node: NodeId) -> Option<SyncOutcome> {
        let units = UnitConverter::new(&self.options.config.layout, self.options.config.rem_base);
        self.form.synchronize(doc, node, &units)
    }

    /// Regenerate the stylesheet, bound attributes, visibility and code
    /// slots from the form's current values.
    pub fn project(&mut self, doc: &mut Document) -> &str {
        let form = self.form.node();
        let css = render_css(doc, form, &self.initial);

        let style = self.ensure_style_element(doc);
        doc.set_text_content(style, &css);

        project_attributes(doc, form);
        update_visibility(doc);

        let assets = collect_assets(doc, &self.options);
        write_code_slots(doc, form, &code_output(&assets, &css));

        self.css = css;
        &self.css
    }

    fn ensure_style_element(&self, doc: &mut Document) -> NodeId {
        if let Some(node) = doc.get_by_id(&self.stylesheet_id) {
            return node;
        }
        let style = doc.create_html_element("style", &[("id", self.stylesheet_id.as_str())]);
        let parent = doc.find_by_tag("body").unwrap_or_else(|| doc.root());
        doc.append(parent, style);
        style
    }

    /// Tear down: remove the generated `<style>` element.
    pub fn dispose(self, doc: &mut Document) {
        if let Some(style) = doc.get_by_id(&self.stylesheet_id) {
            doc.detach(style);
        }
        debug!("disposed editor {}", self.stylesheet_id);
    }

    /// The generated CSS from the last projection.
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn stylesheet_id(&self) -> &str {
        &self.stylesheet_id
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn initial_values(&self) -> &InitialValues {
        &self.initial
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }
}

/// Write snapshot values into their controls. Names shared by several
/// controls are left alone.
fn apply_initial_values(doc: &mut Document, form: NodeId, initial: &InitialValues) {
    let pending: Vec<(String, String)> = initial
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    for (name, value) in pending {
        let controls = doc.named_controls(form, &name);
        let [control] = controls.as_slice() else {
            continue;
        };
        let control = *control;
        if doc.is_tag(control, "select") {
            doc.select_option(control, &value);
        } else if doc
            .input_type(control)
            .is_some_and(|t| t == "checkbox" || t == "radio")
        {
            let on = doc.value_of(control) == value;
            doc.set_flag(control, "checked", on);
        } else {
            set_css_value(doc, control, &value);
        }
    }
}
