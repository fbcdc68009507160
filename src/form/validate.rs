//! Constraint validation for sync groups.

use super::{Form, FormField, MergedConstraints, ValueKind};
use crate::css::{UnitConverter, format_number, is_valid_css_color, is_valid_css_value, parse_number};
use crate::dom::{Document, NodeId};

/// Class toggled on invalid controls and feedback targets.
pub const INVALID_CLASS: &str = "is-invalid";

/// Custom validity message set on every invalid group member.
pub const INVALID_VALUE: &str = "Invalid value";

/// Human-readable feedback text.
pub mod messages {
    pub const REQUIRED: &str = "This field is required";
    pub const INVALID_COLOR: &str = "Please select a valid color";
    pub const INVALID_VALUE: &str = "Please enter a valid CSS value";

    pub fn below_min(min: &str, unit: &str) -> String {
        format!("Value must be greater than or equal to {min}{unit}")
    }

    pub fn above_max(max: &str, unit: &str) -> String {
        format!("Value must be less than or equal to {max}{unit}")
    }
}

/// Outcome of checking one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Feedback text, empty when valid.
    pub fn message(&self) -> &str {
        match self {
            Self::Valid => "",
            Self::Invalid(message) => message,
        }
    }
}

/// Check one field without touching the document.
///
/// Runs the required, format and range checks in that order and stops at
/// the first failure. `numeric` overrides the number parsed from the
/// field's own value.
pub fn check(
    doc: &Document,
    field: &FormField,
    numeric: Option<f64>,
    constraints: &MergedConstraints,
) -> Validation {
    if !field.control.has_validity() {
        return Validation::Valid;
    }
    let value = doc.value_of(field.node);

    if doc.has_attr(field.node, "required") && value.is_empty() {
        return Validation::Invalid(messages::REQUIRED.to_string());
    }

    match field.kind {
        ValueKind::Color if !is_valid_css_color(&value) => {
            return Validation::Invalid(messages::INVALID_COLOR.to_string());
        }
        ValueKind::Number if !is_valid_css_value(&value) => {
            return Validation::Invalid(messages::INVALID_VALUE.to_string());
        }
        _ => {}
    }

    let Some(number) = numeric.or_else(|| parse_number(&value)) else {
        return Validation::Valid;
    };
    if number.is_nan() {
        return Validation::Valid;
    }
    if let Some(min) = constraints.min
        && number < min
    {
        return Validation::Invalid(messages::below_min(&format_number(min), &constraints.min_unit));
    }
    if let Some(max) = constraints.max
        && number > max
    {
        return Validation::Invalid(messages::above_max(&format_number(max), &constraints.max_unit));
    }
    Validation::Valid
}

impl Form {
    /// Validate `field` together with its sync group and update the page.
    ///
    /// The group is valid only when every member passes; the first failing
    /// member's message is shown. When `constraints` is `None` they are
    /// merged from the group in its running unit.
    pub fn validate(
        &self,
        doc: &mut Document,
        field: &FormField,
        numeric: Option<f64>,
        constraints: Option<&MergedConstraints>,
        units: &UnitConverter<'_>,
    ) -> bool {
        if !field.control.has_validity() {
            return true;
        }
        let group = self.resolve_group(field);
        let merged;
        let constraints = match constraints {
            Some(constraints) => constraints,
            None => {
                merged = self.merge_constraints(doc, &group, None, units);
                &merged
            }
        };

        let outcome = group
            .iter()
            .map(|member| check(doc, member, numeric, constraints))
            .find(|outcome| !outcome.is_valid())
            .unwrap_or(Validation::Valid);

        let members: Vec<NodeId> = group
            .iter()
            .filter(|f| f.control.has_validity())
            .map(|f| f.node)
            .collect();
        apply_validity(doc, &members, &constraints.feedback, &outcome);
        outcome.is_valid()
    }
}

/// Reflect a group's outcome on its members and feedback targets.
pub(crate) fn apply_validity(
    doc: &mut Document,
    members: &[NodeId],
    feedback: &[NodeId],
    outcome: &Validation,
) {
    let valid = outcome.is_valid();
    for &node in members {
        doc.toggle_class(node, INVALID_CLASS, !valid);
        doc.set_custom_validity(node, if valid { "" } else { INVALID_VALUE });
    }
    for &node in feedback {
        doc.set_style_property(node, "display", if valid { "none" } else { "block" });
        doc.toggle_class(node, INVALID_CLASS, !valid);
        doc.set_text_content(node, outcome.message());
    }
}
