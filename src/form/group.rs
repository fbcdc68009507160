//! Sync group resolution and constraint merging.

use log::warn;

use super::{Bound, Feedback, Form, FormField, reported_unit};
use crate::css::UnitConverter;
use crate::dom::{Document, NodeId};

/// Constraints shared by a sync group, expressed in one unit.
///
/// Derived fresh for every synchronization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConstraints {
    pub unit: String,
    pub min: Option<f64>,
    pub min_unit: String,
    pub max: Option<f64>,
    pub max_unit: String,
    pub step: Option<f64>,
    pub step_unit: String,
    pub feedback: Vec<NodeId>,
}

impl Form {
    /// Fields sharing `field`'s sync key in document order, or just `field`.
    pub fn resolve_group<'a>(&'a self, field: &'a FormField) -> Vec<&'a FormField> {
        match &field.sync_key {
            Some(key) => self
                .fields
                .iter()
                .filter(|f| f.sync_key.as_ref() == Some(key))
                .collect(),
            None => vec![field],
        }
    }

    /// The group member with a binding name, else `target`.
    pub fn source_of<'a>(&'a self, group: &[&'a FormField], target: &'a FormField) -> &'a FormField {
        group
            .iter()
            .copied()
            .find(|f| f.binding.is_some())
            .unwrap_or(target)
    }

    /// Running unit of a group: every member reporting a unit overrides the
    /// ones before it.
    pub fn running_unit(&self, doc: &Document, group: &[&FormField]) -> String {
        group
            .iter()
            .filter_map(|f| reported_unit(doc, f.node))
            .last()
            .unwrap_or_default()
    }

    /// Fold a group's declared constraints into one set.
    ///
    /// `min`, `max` and `step` come from the first member declaring each.
    /// They are converted into `target_unit`, or into the group's running
    /// unit when no target is given. Feedback targets are the deduplicated
    /// union over all members.
    pub fn merge_constraints(
        &self,
        doc: &Document,
        group: &[&FormField],
        target_unit: Option<&str>,
        units: &UnitConverter<'_>,
    ) -> MergedConstraints {
        let unit = match target_unit.filter(|u| !u.is_empty()) {
            Some(unit) => unit.to_string(),
            None => self.running_unit(doc, group),
        };

        let first = |pick: fn(&FormField) -> Option<&Bound>| group.iter().find_map(|f| pick(*f));
        let resolve = |bound: Option<&Bound>| -> (Option<f64>, String) {
            match bound {
                Some(b) if !unit.is_empty() => (Some(units.convert(b.value, &b.unit, &unit)), unit.clone()),
                Some(b) => (Some(b.value), b.unit.clone()),
                None => (None, unit.clone()),
            }
        };

        let (min, min_unit) = resolve(first(|f| f.min.as_ref()));
        let (max, max_unit) = resolve(first(|f| f.max.as_ref()));
        let (step, step_unit) = resolve(first(|f| f.step.as_ref()));

        let mut feedback: Vec<NodeId> = Vec::new();
        for field in group {
            let found = match &field.feedback {
                Feedback::None => continue,
                Feedback::Itself => vec![field.node],
                Feedback::Selector(selector) => match doc.query_selector_all(selector) {
                    Ok(nodes) => nodes,
                    Err(err) => {
                        warn!("feedback selector failed: {err}");
                        continue;
                    }
                },
            };
            for node in found {
                if !feedback.contains(&node) {
                    feedback.push(node);
                }
            }
        }

        MergedConstraints {
            unit,
            min,
            min_unit,
            max,
            max_unit,
            step,
            step_unit,
            feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::css::{StaticLayout, UnitConverter};
    use crate::dom::parse_html;
    use crate::form::Form;

    const GROUP: &str = r#"
        <form id="f">
            <input type="hidden" id="pad" name="selector(.card)::property(padding)" value="1rem" data-sync="pad" data-feedback=".msg">
            <input type="number" id="num" min="0" max="10" value="1" data-sync="pad" data-feedback=".msg">
            <input type="range" id="slider" min="2" max="4" data-sync="pad">
            <select id="unit" data-sync="pad"><option>rem</option><option>px</option></select>
            <input type="text" id="alone" value="3em">
            <p class="msg" id="m1"></p><p class="msg" id="m2"></p>
        </form>"#;

    #[test]
    fn test_group_in_document_order() {
        let doc = parse_html(GROUP);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let num = form.field(doc.get_by_id("num").unwrap()).unwrap();

        let group: Vec<_> = form.resolve_group(num).iter().map(|f| f.node).collect();
        let expected: Vec<_> = ["pad", "num", "slider", "unit"]
            .iter()
            .map(|id| doc.get_by_id(id).unwrap())
            .collect();
        assert_eq!(group, expected);

        let source = form.source_of(&form.resolve_group(num), num);
        assert_eq!(source.node, doc.get_by_id("pad").unwrap());
    }

    #[test]
    fn test_first_declared_bound_wins() {
        let doc = parse_html(GROUP);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let num = form.field(doc.get_by_id("num").unwrap()).unwrap();
        let group = form.resolve_group(num);

        let merged = form.merge_constraints(&doc, &group, None, &units);
        assert_eq!(merged.unit, "rem");
        assert_eq!(merged.min, Some(0.0));
        assert_eq!(merged.max, Some(10.0));
        assert_eq!(merged.step, None);

        let in_px = form.merge_constraints(&doc, &group, Some("px"), &units);
        assert_eq!(in_px.max, Some(160.0));
        assert_eq!(in_px.max_unit, "px");
    }

    #[test]
    fn test_feedback_targets_are_deduplicated() {
        let doc = parse_html(GROUP);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let pad = form.field(doc.get_by_id("pad").unwrap()).unwrap();

        let merged = form.merge_constraints(&doc, &form.resolve_group(pad), None, &units);
        let ids: Vec<_> = merged.feedback.iter().map(|n| doc.element_id(*n).unwrap()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn test_field_without_key_is_its_own_group() {
        let doc = parse_html(GROUP);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        // Unnamed and unsynced controls are not captured at all.
        assert!(form.field(doc.get_by_id("alone").unwrap()).is_none());

        let pad = form.field(doc.get_by_id("pad").unwrap()).unwrap();
        let mut single = pad.clone();
        single.sync_key = None;
        assert_eq!(form.resolve_group(&single).len(), 1);
    }
}
