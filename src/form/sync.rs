//! Value propagation across a sync group.

use log::debug;

use super::{ControlKind, Form, FormField, MergedConstraints, reported_unit, value_unit};
use crate::css::{UnitConverter, format_number, is_valid_css_color, parse_number, sanitize_property_value};
use crate::dom::{Document, NodeId};

/// Result of one synchronization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// Canonical number in `unit`; NaN when the value did not parse.
    pub numeric: f64,
    pub unit: String,
    pub valid: bool,
}

impl Form {
    /// Propagate a changed control's value to the rest of its group, then
    /// validate the group.
    ///
    /// Returns `None` when `target` is not a captured field.
    pub fn synchronize(
        &self,
        doc: &mut Document,
        target: NodeId,
        units: &UnitConverter<'_>,
    ) -> Option<SyncOutcome> {
        let field = self.field(target)?;
        let group = self.resolve_group(field);
        let source = self.source_of(&group, field);

        let target_value = doc.value_of(target);
        let source_value = doc.value_of(source.node);
        let source_unit = value_unit(&source_value)
            .map(str::to_string)
            .or_else(|| reported_unit(doc, source.node))
            .unwrap_or_else(|| self.running_unit(doc, &group));

        let unit_select = field.is_unit_select(doc);
        let (unit, numeric) = if unit_select {
            let numeric = parse_number(&source_value)
                .map(|n| units.convert(n, &source_unit, &target_value))
                .unwrap_or(f64::NAN);
            (target_value.clone(), numeric)
        } else {
            let unit = value_unit(&target_value)
                .map(str::to_string)
                .unwrap_or(source_unit);
            (unit, parse_number(&target_value).unwrap_or(f64::NAN))
        };

        let merged = self.merge_constraints(doc, &group, Some(&unit), units);
        debug!(
            "sync {:?}: {} member(s), value {numeric} {unit:?}",
            target,
            group.len()
        );

        for member in group.iter().filter(|m| m.node != target) {
            propagate(doc, member, &target_value, numeric, &unit, &merged);
        }
        // The marker holds the unit the group's numbers are written in.
        if unit_select {
            doc.set_attr(target, "data-unit", &unit);
        }

        let valid = self.validate(doc, field, Some(numeric), Some(&merged), units);
        Some(SyncOutcome {
            numeric,
            unit,
            valid,
        })
    }
}

/// Write the canonical value into one member according to its control kind.
fn propagate(
    doc: &mut Document,
    member: &FormField,
    raw: &str,
    numeric: f64,
    unit: &str,
    constraints: &MergedConstraints,
) {
    let node = member.node;
    match member.control {
        kind if kind.is_numeric() => {
            for (attr, bound) in [
                ("min", constraints.min),
                ("max", constraints.max),
                ("step", constraints.step),
            ] {
                match bound {
                    Some(value) => doc.set_attr(node, attr, &format_number(value)),
                    None => doc.remove_attr(node, attr),
                }
            }
            doc.set_value(node, &format_number(numeric));
            if !unit.is_empty() && (member.binding.is_some() || doc.has_attr(node, "data-unit")) {
                doc.set_attr(node, "data-unit", unit);
            }
        }
        kind if kind.is_textual() => {
            if unit.is_empty() || numeric.is_nan() {
                doc.set_value(node, raw);
            } else {
                doc.set_value(node, &format!("{}{unit}", format_number(numeric)));
            }
        }
        ControlKind::Color => {
            let value = if is_valid_css_color(raw) {
                sanitize_property_value(raw)
            } else {
                String::new()
            };
            doc.set_value(node, &value);
        }
        ControlKind::Select if member.is_unit_select(doc) => {
            doc.select_option(node, unit);
            doc.set_attr(node, "data-unit", unit);
        }
        ControlKind::Select => doc.set_value(node, raw),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StaticLayout;
    use crate::dom::parse_html;

    const SPACING: &str = r#"
        <form id="f">
            <input type="hidden" id="pad" name="selector(.card)::property(padding)" value="1rem" data-sync="pad">
            <input type="number" id="num" min="0" max="10" value="1" data-sync="pad">
            <select id="unit" data-sync="pad">
                <option>rem</option><option>px</option><option>em</option>
            </select>
        </form>"#;

    fn value(doc: &Document, id: &str) -> String {
        doc.value_of(doc.get_by_id(id).unwrap())
    }

    #[test]
    fn test_unit_switch_reconverts_value_and_bounds() {
        let mut doc = parse_html(SPACING);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let pad = doc.get_by_id("pad").unwrap();
        let num = doc.get_by_id("num").unwrap();
        let select = doc.get_by_id("unit").unwrap();

        let initial = form.synchronize(&mut doc, pad, &units).unwrap();
        assert_eq!(initial.unit, "rem");
        assert!(initial.valid);
        assert_eq!(doc.get_attr(select, "data-unit"), Some("rem"));

        doc.set_value(select, "px");
        let switched = form.synchronize(&mut doc, select, &units).unwrap();

        assert_eq!(switched.numeric, 16.0);
        assert_eq!(value(&doc, "num"), "16");
        assert_eq!(doc.get_attr(num, "max"), Some("160"));
        assert_eq!(doc.get_attr(num, "min"), Some("0"));
        assert_eq!(value(&doc, "pad"), "16px");
        assert!(switched.valid);
    }

    #[test]
    fn test_edit_after_unit_switch_uses_selected_unit() {
        let mut doc = parse_html(
            r#"<form id="f">
                <input type="number" id="num" name="selector(.card)::property(padding)" min="0" max="10" value="1" data-sync="p">
                <select id="unit" data-sync="p"><option>rem</option><option>px</option></select>
            </form>"#,
        );
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let num = doc.get_by_id("num").unwrap();
        let select = doc.get_by_id("unit").unwrap();
        form.synchronize(&mut doc, num, &units).unwrap();

        doc.set_value(select, "px");
        form.synchronize(&mut doc, select, &units).unwrap();
        assert_eq!(value(&doc, "num"), "16");
        assert_eq!(doc.get_attr(num, "max"), Some("160"));
        assert_eq!(doc.get_attr(select, "data-unit"), Some("px"));
        assert_eq!(doc.get_attr(num, "data-unit"), Some("px"));

        doc.set_value(num, "20");
        let outcome = form.synchronize(&mut doc, num, &units).unwrap();
        assert_eq!(outcome.unit, "px");
        assert_eq!(outcome.numeric, 20.0);
        assert!(outcome.valid);
        assert_eq!(value(&doc, "unit"), "px");
    }

    #[test]
    fn test_editing_number_keeps_group_unit() {
        let mut doc = parse_html(SPACING);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let num = doc.get_by_id("num").unwrap();

        doc.set_value(num, "2.5");
        let outcome = form.synchronize(&mut doc, num, &units).unwrap();

        assert_eq!(outcome.unit, "rem");
        assert_eq!(value(&doc, "pad"), "2.5rem");
        assert_eq!(value(&doc, "unit"), "rem");
    }

    #[test]
    fn test_out_of_range_marks_every_member() {
        let mut doc = parse_html(SPACING);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let num = doc.get_by_id("num").unwrap();

        doc.set_value(num, "10.0001");
        let outcome = form.synchronize(&mut doc, num, &units).unwrap();

        assert!(!outcome.valid);
        for id in ["pad", "num", "unit"] {
            assert!(!doc.is_valid(doc.get_by_id(id).unwrap()), "{id}");
        }

        doc.set_value(num, "10");
        assert!(form.synchronize(&mut doc, num, &units).unwrap().valid);
        for id in ["pad", "num", "unit"] {
            assert!(doc.is_valid(doc.get_by_id(id).unwrap()), "{id}");
        }
    }

    #[test]
    fn test_unparseable_value_propagates_empty_number() {
        let mut doc = parse_html(SPACING);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let pad = doc.get_by_id("pad").unwrap();

        doc.set_value(pad, "auto");
        let outcome = form.synchronize(&mut doc, pad, &units).unwrap();

        assert!(outcome.numeric.is_nan());
        assert_eq!(value(&doc, "num"), "");
        // An empty number field fails the CSS value check.
        assert!(!outcome.valid);
    }

    #[test]
    fn test_color_group_sanitizes() {
        let mut doc = parse_html(
            r##"<form id="f">
                <input type="text" id="t" name="selector(a)::property(color)" value="#abc" data-sync="c">
                <input type="color" id="c" data-sync="c">
            </form>"##,
        );
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let text = doc.get_by_id("t").unwrap();

        form.synchronize(&mut doc, text, &units).unwrap();
        assert_eq!(value(&doc, "c"), "#aabbcc");

        doc.set_value(text, "not a color");
        form.synchronize(&mut doc, text, &units).unwrap();
        assert_eq!(value(&doc, "c"), "");
    }

    #[test]
    fn test_uncaptured_target_is_ignored() {
        let mut doc = parse_html(r#"<form id="f"><input id="x" name="plain"></form>"#);
        let form = Form::capture(&doc, doc.get_by_id("f").unwrap()).unwrap();
        let layout = StaticLayout::default();
        let units = UnitConverter::new(&layout, 16.0);
        let x = doc.get_by_id("x").unwrap();
        assert_eq!(form.synchronize(&mut doc, x, &units), None);
    }
}
