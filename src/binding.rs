//! Binding names: `selector(<selector list>)::property(<name>)` or
//! `selector(<selector list>)::attribute(<name>)`.

use std::fmt;

use crate::css::split_selector_list;
use crate::error::{Error, Result};

const SELECTOR_PREFIX: &str = "selector(";
const PROPERTY_MARKER: &str = "::property(";
const ATTRIBUTE_MARKER: &str = "::attribute(";

/// What a bound field writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingTarget {
    /// A CSS property in the generated stylesheet.
    Property(String),
    /// A DOM attribute on every element matching the selector.
    Attribute(String),
}

/// A parsed field binding name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingName {
    raw: String,
    selector: String,
    target: BindingTarget,
}

impl BindingName {
    /// Whether `name` uses the binding grammar at all.
    pub fn is_binding(name: &str) -> bool {
        name.starts_with(SELECTOR_PREFIX)
    }

    /// Parse a binding name.
    ///
    /// ```
    /// use themeform::{BindingName, BindingTarget};
    ///
    /// let binding = BindingName::parse("selector(.btn, .link)::property(color)").unwrap();
    /// assert_eq!(binding.selector(), ".btn, .link");
    /// assert_eq!(binding.target(), &BindingTarget::Property("color".into()));
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || Error::InvalidBindingName(name.to_string());

        let rest = name.strip_prefix(SELECTOR_PREFIX).ok_or_else(invalid)?;
        let (marker_at, is_property) = match (rest.rfind(PROPERTY_MARKER), rest.rfind(ATTRIBUTE_MARKER)) {
            (Some(p), Some(a)) if a > p => (a, false),
            (Some(p), _) => (p, true),
            (None, Some(a)) => (a, false),
            (None, None) => return Err(invalid()),
        };
        let marker_len = if is_property {
            PROPERTY_MARKER.len()
        } else {
            ATTRIBUTE_MARKER.len()
        };

        let selector = rest[..marker_at].trim();
        let selector = selector.strip_suffix(')').ok_or_else(invalid)?.trim();
        let target = rest[marker_at + marker_len..].trim();
        let target = target.strip_suffix(')').ok_or_else(invalid)?.trim();
        if selector.is_empty() || target.is_empty() {
            return Err(invalid());
        }

        let target = if is_property {
            BindingTarget::Property(target.to_string())
        } else {
            BindingTarget::Attribute(target.to_string())
        };

        Ok(Self {
            raw: name.to_string(),
            selector: selector.to_string(),
            target,
        })
    }

    /// Build the binding name for a selector/property pair.
    pub fn for_property(selector: &str, property: &str) -> Self {
        Self {
            raw: format!("{SELECTOR_PREFIX}{selector}){PROPERTY_MARKER}{property})"),
            selector: selector.to_string(),
            target: BindingTarget::Property(property.to_string()),
        }
    }

    /// The full name as written on the field.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The selector text, trimmed but not split.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Individual selectors, trimmed and quote-normalized.
    pub fn selector_list(&self) -> Vec<String> {
        split_selector_list(&self.selector)
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    /// The bound CSS property, if this is a property binding.
    pub fn property(&self) -> Option<&str> {
        match &self.target {
            BindingTarget::Property(p) => Some(p),
            BindingTarget::Attribute(_) => None,
        }
    }

    /// The bound attribute, if this is an attribute binding.
    pub fn attribute(&self) -> Option<&str> {
        match &self.target {
            BindingTarget::Attribute(a) => Some(a),
            BindingTarget::Property(_) => None,
        }
    }
}

impl fmt::Display for BindingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_binding() {
        let b = BindingName::parse("selector(.btn)::property(background-color)").unwrap();
        assert_eq!(b.selector(), ".btn");
        assert_eq!(b.property(), Some("background-color"));
        assert_eq!(b.attribute(), None);
    }

    #[test]
    fn test_parse_attribute_binding() {
        let b = BindingName::parse("selector( html )::attribute( data-theme )").unwrap();
        assert_eq!(b.selector(), "html");
        assert_eq!(b.attribute(), Some("data-theme"));
    }

    #[test]
    fn test_selector_list_is_split_and_unquoted() {
        let b = BindingName::parse(r#"selector(.a, [data-x="y"] .b)::property(color)"#).unwrap();
        assert_eq!(b.selector_list(), vec![".a", "[data-x=y] .b"]);
    }

    #[test]
    fn test_pseudo_elements_in_selector() {
        let b = BindingName::parse("selector(p::first-line)::property(color)").unwrap();
        assert_eq!(b.selector(), "p::first-line");
    }

    #[test]
    fn test_malformed_names() {
        for name in [
            "color",
            "selector(.a)",
            "selector(.a)::property()",
            "selector()::property(color)",
            "selector(.a)::property(color",
            "selector(.a::property(color)",
        ] {
            assert!(
                matches!(BindingName::parse(name), Err(Error::InvalidBindingName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_for_property_round_trips() {
        let built = BindingName::for_property(".card", "padding");
        assert_eq!(BindingName::parse(built.raw()).unwrap(), built);
    }
}
