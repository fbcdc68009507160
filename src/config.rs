//! Editor configuration.
//!
//! [`EditorConfig`] carries the tunables that can live in a JSON file
//! (the `rem` base, the layout used for unit conversion and the theme
//! categories). [`EditorOptions`] adds what only the embedding program
//! knows: the text of linked stylesheets and the document base URL.

#[cfg(feature = "cli")]
use std::path::Path;

use crate::css::StaticLayout;
use crate::css::units::DEFAULT_REM_BASE;
#[cfg(feature = "cli")]
use crate::error::{Error, Result};

/// A theme category and the keywords that select it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ThemeCategory {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Tunables shared by every bound form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct EditorConfig {
    /// Pixels per `rem` when converting into `rem`.
    pub rem_base: f64,
    pub layout: StaticLayout,
    pub categories: Vec<ThemeCategory>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rem_base: DEFAULT_REM_BASE,
            layout: StaticLayout::default(),
            categories: vec![
                ThemeCategory::new("colors", &["color", "background", "fill", "stroke", "accent"]),
                ThemeCategory::new(
                    "typography",
                    &["font", "font-size", "font-weight", "font-family", "line-height", "letter-spacing", "text"],
                ),
                ThemeCategory::new("spacing", &["margin", "padding", "gap", "spacing", "inset"]),
                ThemeCategory::new("borders", &["border", "border-width", "border-radius", "outline", "radius"]),
                ThemeCategory::new("effects", &["shadow", "box-shadow", "opacity", "transition", "filter"]),
                ThemeCategory::new("layout", &["width", "height", "max-width", "min-height", "display"]),
            ],
        }
    }
}

impl EditorConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    #[cfg(feature = "cli")]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    #[cfg(feature = "cli")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "cli")]
    fn validate(&self) -> Result<()> {
        if !(self.rem_base.is_finite() && self.rem_base > 0.0) {
            return Err(Error::Config(format!("rem_base must be positive, got {}", self.rem_base)));
        }
        let layout = &self.layout;
        for (name, value) in [
            ("root_font_px", layout.root_font_px),
            ("parent_font_px", layout.parent_font_px),
            ("viewport_width", layout.viewport_width),
            ("viewport_height", layout.viewport_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("layout.{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

/// The text of a stylesheet the document links to.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalStylesheet {
    pub href: String,
    pub css: String,
}

/// Everything [`ThemeEditor::bind`](crate::ThemeEditor::bind) needs besides the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorOptions {
    pub config: EditorConfig,
    /// Linked stylesheets, scanned after the document's `<style>` elements.
    pub stylesheets: Vec<ExternalStylesheet>,
    /// Base for resolving asset `href`s into `@import` URLs.
    pub base_url: Option<String>,
}

impl EditorOptions {
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Stylesheet text for a linked `href`, if provided.
    pub fn stylesheet(&self, href: &str) -> Option<&str> {
        self.stylesheets
            .iter()
            .find(|sheet| sheet.href == href)
            .map(|sheet| sheet.css.as_str())
    }
}
