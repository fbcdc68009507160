//! Form model: bindable controls, sync groups, validation and synchronization.
//!
//! A [`Form`] is captured once when a form is bound. Capturing records each
//! control's capability tag, binding name, sync key and declared bounds, so
//! later synchronization passes can rewrite native `min`/`max`/`step`
//! attributes without losing the declared constraints.

mod group;
mod sync;
mod validate;

pub use group::MergedConstraints;
pub use sync::SyncOutcome;
pub use validate::{INVALID_CLASS, INVALID_VALUE, Validation, check, messages};

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::binding::BindingName;
use crate::css::{extract_unit, format_number, is_unit_token, parse_number};
use crate::dom::{Document, NodeId, parse_selector_list};
use crate::error::{Error, Result};

/// What kind of control a field is, and therefore how values reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Number,
    Range,
    Text,
    Hidden,
    Color,
    Select,
    TextArea,
    Checkable,
    OtherInput,
    /// A non-form element, e.g. a feedback display. Has no validity.
    Display,
}

impl ControlKind {
    pub fn of(doc: &Document, node: NodeId) -> Self {
        if let Some(kind) = doc.input_type(node) {
            return match kind.as_str() {
                "number" => Self::Number,
                "range" => Self::Range,
                "text" | "search" | "email" | "url" | "tel" | "password" => Self::Text,
                "hidden" => Self::Hidden,
                "color" => Self::Color,
                "checkbox" | "radio" => Self::Checkable,
                _ => Self::OtherInput,
            };
        }
        if doc.is_tag(node, "select") {
            Self::Select
        } else if doc.is_tag(node, "textarea") {
            Self::TextArea
        } else {
            Self::Display
        }
    }

    /// Whether the control takes part in constraint validation.
    pub fn has_validity(self) -> bool {
        self != Self::Display
    }

    /// Whether the control receives `min`/`max`/`step` during sync.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }

    /// Controls whose value is a free-form string.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Hidden | Self::TextArea)
    }
}

/// Semantic value kind used for format validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Color,
    Number,
    Other,
}

impl ValueKind {
    /// `data-type`, else the input `type`, else the tag name.
    pub fn of(doc: &Document, node: NodeId) -> Self {
        let declared = doc
            .get_attr(node, "data-type")
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .or_else(|| doc.input_type(node))
            .or_else(|| doc.element_name(node).map(|n| n.to_string()));
        match declared.as_deref() {
            Some("color") => Self::Color,
            Some("number") => Self::Number,
            _ => Self::Other,
        }
    }
}

/// A declared `min`, `max` or `step` with the unit it was declared in.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub unit: String,
}

/// Where a field sends validation feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    None,
    /// Elements matching a selector (`data-feedback="#msg"`).
    Selector(String),
    /// The field itself displays feedback.
    Itself,
}

/// One captured control.
#[derive(Debug, Clone)]
pub struct FormField {
    pub node: NodeId,
    pub control: ControlKind,
    pub kind: ValueKind,
    pub binding: Option<BindingName>,
    pub sync_key: Option<String>,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub step: Option<Bound>,
    pub feedback: Feedback,
}

impl FormField {
    pub fn is_unit_select(&self, doc: &Document) -> bool {
        self.control == ControlKind::Select
            && doc
                .options(self.node)
                .into_iter()
                .any(|option| is_unit_token(&doc.option_value(option)))
    }
}

/// A per-field problem found while capturing.
#[derive(Debug)]
pub struct BindingError {
    pub node: NodeId,
    pub error: Error,
}

/// The captured model of one bound form.
#[derive(Debug)]
pub struct Form {
    node: NodeId,
    fields: Vec<FormField>,
    by_node: HashMap<NodeId, usize>,
    binding_errors: Vec<BindingError>,
}

impl Form {
    /// Capture the bindable controls of `form`.
    ///
    /// Includes every control inside the form named with a binding name, and
    /// every `[data-sync]` element in the document, in document order.
    /// Malformed names and feedback selectors are collected as
    /// [`BindingError`]s without affecting the other fields.
    pub fn capture(doc: &Document, form: NodeId) -> Result<Self> {
        if !doc.is_tag(form, "form") {
            let what = doc
                .element_name(form)
                .map(|n| n.to_string())
                .unwrap_or_else(|| "#non-element".to_string());
            return Err(Error::NotAForm(what));
        }

        let inside: HashSet<NodeId> = doc.descendants(form).into_iter().collect();
        let mut binding_errors = Vec::new();
        let mut candidates = Vec::new();

        for node in doc.elements() {
            let sync_key = doc
                .get_attr(node, "data-sync")
                .filter(|key| !key.is_empty())
                .map(str::to_string);
            let has_sync = doc.has_attr(node, "data-sync");

            let mut binding = None;
            if inside.contains(&node)
                && let Some(name) = doc.get_attr(node, "name")
                && BindingName::is_binding(name)
            {
                match BindingName::parse(name) {
                    Ok(parsed) => binding = Some(parsed),
                    Err(error) => {
                        warn!("skipping field binding: {error}");
                        binding_errors.push(BindingError { node, error });
                    }
                }
            }

            if binding.is_some() || has_sync {
                candidates.push((node, binding, sync_key));
            }
        }

        let group_units = bind_time_units(doc, &candidates);

        let mut fields = Vec::with_capacity(candidates.len());
        for (node, binding, sync_key) in candidates {
            let group_unit = sync_key
                .as_ref()
                .and_then(|key| group_units.get(key).cloned())
                .or_else(|| reported_unit(doc, node))
                .unwrap_or_default();

            let feedback = match doc.get_attr(node, "data-feedback") {
                Some(selector) if !selector.trim().is_empty() => {
                    match parse_selector_list(selector) {
                        Ok(_) => Feedback::Selector(selector.to_string()),
                        Err(error) => {
                            warn!("ignoring feedback target: {error}");
                            binding_errors.push(BindingError { node, error });
                            Feedback::None
                        }
                    }
                }
                Some(_) => Feedback::Itself,
                None if doc.get_attr(node, "data-type") == Some("feedback") => Feedback::Itself,
                None => Feedback::None,
            };

            fields.push(FormField {
                node,
                control: ControlKind::of(doc, node),
                kind: ValueKind::of(doc, node),
                min: capture_bound(doc, node, "min", &group_unit),
                max: capture_bound(doc, node, "max", &group_unit),
                step: capture_bound(doc, node, "step", &group_unit),
                binding,
                sync_key,
                feedback,
            });
        }

        let by_node = fields.iter().enumerate().map(|(i, f)| (f.node, i)).collect();

        Ok(Self {
            node: form,
            fields,
            by_node,
            binding_errors,
        })
    }

    /// The `<form>` element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, node: NodeId) -> Option<&FormField> {
        self.by_node.get(&node).map(|&i| &self.fields[i])
    }

    /// Fields carrying a well-formed binding name.
    pub fn named_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.binding.is_some())
    }

    pub fn binding_errors(&self) -> &[BindingError] {
        &self.binding_errors
    }
}

/// Unit a control currently reports: `data-unit`, else the suffix of a
/// numeric value, else the value of a unit select.
pub(crate) fn reported_unit(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(unit) = doc.get_attr(node, "data-unit").filter(|u| !u.is_empty()) {
        return Some(unit.to_string());
    }
    let value = doc.value_of(node);
    if doc.is_tag(node, "select") {
        return is_unit_token(&value).then_some(value);
    }
    value_unit(&value).map(str::to_string)
}

/// Value a control contributes to CSS. Number and range controls hold a
/// bare number and carry its unit in `data-unit`.
pub fn css_value(doc: &Document, node: NodeId) -> String {
    let value = doc.value_of(node);
    if ControlKind::of(doc, node).is_numeric()
        && parse_number(&value).is_some()
        && value_unit(&value).is_none()
        && let Some(unit) = doc.get_attr(node, "data-unit").filter(|u| !u.is_empty())
    {
        return format!("{value}{unit}");
    }
    value
}

/// Write a CSS value into a control. A number or range control receives
/// the numeric part and records the unit in `data-unit`.
pub fn set_css_value(doc: &mut Document, node: NodeId, value: &str) {
    if ControlKind::of(doc, node).is_numeric()
        && let Some(unit) = value_unit(value)
        && let Some(number) = parse_number(value)
    {
        doc.set_value(node, &format_number(number));
        doc.set_attr(node, "data-unit", unit);
        return;
    }
    doc.set_value(node, value);
}

/// Unit suffix of a numeric value such as `1.5rem`.
pub(crate) fn value_unit(value: &str) -> Option<&str> {
    parse_number(value)?;
    Some(extract_unit(value)).filter(|u| !u.is_empty())
}

/// Running unit of every sync group at bind time: later members that
/// report a unit override earlier ones.
fn bind_time_units(
    doc: &Document,
    candidates: &[(NodeId, Option<BindingName>, Option<String>)],
) -> HashMap<String, String> {
    let mut units = HashMap::new();
    for (node, _, key) in candidates {
        if let Some(key) = key
            && let Some(unit) = reported_unit(doc, *node)
        {
            units.insert(key.clone(), unit);
        }
    }
    units
}

/// Read a declared bound. `data-<name>` beats the native attribute.
fn capture_bound(doc: &Document, node: NodeId, name: &str, group_unit: &str) -> Option<Bound> {
    let explicit = doc.get_attr(node, &format!("data-{name}"));
    let explicit_value = explicit.and_then(parse_number);
    let value = explicit_value.or_else(|| doc.get_attr(node, name).and_then(parse_number))?;

    let unit = doc
        .get_attr(node, &format!("data-{name}-unit"))
        .filter(|u| !u.is_empty())
        .or_else(|| explicit_value.and(explicit).and_then(value_unit))
        .or_else(|| doc.get_attr(node, "data-unit").filter(|u| !u.is_empty()))
        .map(str::to_string)
        .or_else(|| value_unit(&doc.value_of(node)).map(str::to_string))
        .unwrap_or_else(|| group_unit.to_string());

    Some(Bound { value, unit })
}
