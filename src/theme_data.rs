//! Export and import of a form's theme values.
//!
//! Theme data groups every property-bound control by CSS property, tags it
//! with a category from [`EditorConfig`] and records each selector's value.

use log::warn;

use crate::binding::BindingName;
use crate::config::{EditorConfig, ThemeCategory};
use crate::css::parse_number;
use crate::dom::{Document, NodeId};
use crate::form::{css_value, set_css_value};

/// Category for properties no keyword matches.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One selector's value for a property.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeMember {
    pub selector: String,
    /// `light` when the field name mentions it, else `dark`.
    pub theme: String,
    pub value: String,
}

/// All members bound to one CSS property.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeProperty {
    pub property: String,
    pub category: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub members: Vec<ThemeMember>,
}

/// Theme data for one form, properties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(transparent))]
pub struct ThemeData {
    pub properties: Vec<ThemeProperty>,
}

impl ThemeData {
    pub fn property(&self, name: &str) -> Option<&ThemeProperty> {
        self.properties.iter().find(|p| p.property == name)
    }
}

/// Collect theme data from the named controls of `form`.
pub fn get_theme_data(doc: &Document, form: NodeId, config: &EditorConfig) -> ThemeData {
    let mut data = ThemeData::default();

    for node in doc.descendants(form) {
        let Some(name) = doc.get_attr(node, "name") else {
            continue;
        };
        let Ok(binding) = BindingName::parse(name) else {
            continue;
        };
        let Some(property) = binding.property() else {
            continue;
        };

        let index = match data.properties.iter().position(|p| p.property == property) {
            Some(index) => index,
            None => {
                data.properties.push(ThemeProperty {
                    property: property.to_string(),
                    category: determine_category(property, &config.categories),
                    min: None,
                    max: None,
                    members: Vec::new(),
                });
                data.properties.len() - 1
            }
        };
        let entry = &mut data.properties[index];

        entry.members.push(ThemeMember {
            selector: binding.selector().to_string(),
            theme: if name.contains("light") { "light" } else { "dark" }.to_string(),
            value: css_value(doc, node),
        });

        if let Some(min) = doc.get_attr(node, "data-min").and_then(parse_number)
            && entry.min.is_none_or(|current| min < current)
        {
            entry.min = Some(min);
        }
        if let Some(max) = doc.get_attr(node, "data-max").and_then(parse_number)
            && entry.max.is_none_or(|current| max > current)
        {
            entry.max = Some(max);
        }
    }

    data
}

/// Write theme data back into `form`. Returns how many controls were set.
pub fn set_theme_data(doc: &mut Document, form: NodeId, data: &ThemeData) -> usize {
    let mut written = 0;
    for property in &data.properties {
        for member in &property.members {
            let name = BindingName::for_property(&member.selector, &property.property);
            let target = doc
                .descendants(form)
                .into_iter()
                .find(|node| doc.get_attr(*node, "name") == Some(name.raw()));
            match target {
                Some(node) => {
                    set_css_value(doc, node, &member.value);
                    written += 1;
                }
                None => warn!("no element named {name}"),
            }
        }
    }
    written
}

/// Pick the category whose keyword tokens hit the most tokens of
/// `property`. Ties keep the earlier category.
pub fn determine_category(property: &str, categories: &[ThemeCategory]) -> String {
    let tokens = tokenize(property);
    let mut best = UNKNOWN_CATEGORY;
    let mut best_score = 0;

    for category in categories {
        let score = category
            .keywords
            .iter()
            .flat_map(|keyword| tokenize(keyword))
            .filter(|token| tokens.contains(token))
            .count();
        if score > best_score {
            best = category.name.as_str();
            best_score = score;
        }
    }
    best.to_string()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | ':'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const FORM: &str = r##"<form id="f">
        <input name="selector(.light .btn)::property(background-color)" value="#fff">
        <input name="selector(.dark .btn)::property(background-color)" value="#000">
        <input name="selector(.card)::property(padding)" value="1rem" data-min="0" data-max="4">
        <input name="selector(.box)::property(padding)" value="2rem" data-min="-1" data-max="3">
        <input name="selector(html)::attribute(data-theme)" value="dark">
        <input name="selector(.x)::property(z-index)" value="2">
    </form>"##;

    #[test]
    fn test_get_theme_data_groups_by_property() {
        let doc = parse_html(FORM);
        let data = get_theme_data(&doc, doc.get_by_id("f").unwrap(), &EditorConfig::default());

        let names: Vec<_> = data.properties.iter().map(|p| p.property.as_str()).collect();
        assert_eq!(names, vec!["background-color", "padding", "z-index"]);

        let bg = data.property("background-color").unwrap();
        assert_eq!(bg.category, "colors");
        assert_eq!(bg.members[0].theme, "light");
        assert_eq!(bg.members[1].theme, "dark");
        assert_eq!(bg.members[1].value, "#000");

        let padding = data.property("padding").unwrap();
        assert_eq!(padding.category, "spacing");
        assert_eq!(padding.min, Some(-1.0));
        assert_eq!(padding.max, Some(4.0));

        assert_eq!(data.property("z-index").unwrap().category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_set_theme_data_round_trips() {
        let mut doc = parse_html(FORM);
        let form = doc.get_by_id("f").unwrap();
        let mut data = get_theme_data(&doc, form, &EditorConfig::default());
        data.properties[1].members[0].value = "3rem".into();
        data.properties[1].members.push(ThemeMember {
            selector: ".missing".into(),
            theme: "dark".into(),
            value: "1px".into(),
        });

        assert_eq!(set_theme_data(&mut doc, form, &data), 5);

        let card = doc
            .query_selector(r#"[name="selector(.card)::property(padding)"]"#)
            .unwrap()
            .unwrap();
        assert_eq!(doc.value_of(card), "3rem");
    }

    #[test]
    fn test_category_ties_keep_earlier() {
        let categories = vec![
            ThemeCategory::new("first", &["border"]),
            ThemeCategory::new("second", &["border"]),
        ];
        assert_eq!(determine_category("border-width", &categories), "first");
        assert_eq!(determine_category("opacity", &categories), UNKNOWN_CATEGORY);
    }
}
