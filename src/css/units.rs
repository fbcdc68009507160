//! Length unit conversion.
//!
//! Conversions go through an absolute pixel measurement taken by a
//! [`LayoutHost`], the stand-in for the probe element a browser would insert
//! into the layout tree. Viewport and percentage conversions depend on the
//! host's state at call time, so nothing here is cached.

use std::fmt;
use std::str::FromStr;

/// CSS pixels per typographic point (96 / 72).
pub const PX_PER_PT: f64 = 96.0 / 72.0;
/// CSS pixels per inch.
pub const PX_PER_IN: f64 = 96.0;
/// Default root font size used for `rem` conversions.
pub const DEFAULT_REM_BASE: f64 = 16.0;

/// A length unit understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Percent,
    Vh,
    Vw,
    Pt,
    Cm,
    Mm,
    In,
    Pc,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 11] = [
        LengthUnit::Px,
        LengthUnit::Em,
        LengthUnit::Rem,
        LengthUnit::Percent,
        LengthUnit::Vh,
        LengthUnit::Vw,
        LengthUnit::Pt,
        LengthUnit::Cm,
        LengthUnit::Mm,
        LengthUnit::In,
        LengthUnit::Pc,
    ];

    /// The unit's CSS token.
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Em => "em",
            LengthUnit::Rem => "rem",
            LengthUnit::Percent => "%",
            LengthUnit::Vh => "vh",
            LengthUnit::Vw => "vw",
            LengthUnit::Pt => "pt",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::In => "in",
            LengthUnit::Pc => "pc",
        }
    }

    /// Absolute units have a fixed pixel ratio.
    pub fn px_per_unit(&self) -> Option<f64> {
        match self {
            LengthUnit::Px => Some(1.0),
            LengthUnit::Pt => Some(PX_PER_PT),
            LengthUnit::In => Some(PX_PER_IN),
            LengthUnit::Cm => Some(PX_PER_IN / 2.54),
            LengthUnit::Mm => Some(PX_PER_IN / 25.4),
            LengthUnit::Pc => Some(PX_PER_IN / 6.0),
            _ => None,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        LengthUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == lower)
            .ok_or(())
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of layout measurements for unit conversion.
pub trait LayoutHost {
    /// Pixel size of a probe element sized `value` in `unit`.
    fn resolve_px(&self, value: f64, unit: LengthUnit) -> f64;

    /// Computed font size of a synthetic parent probe (`1em`).
    fn parent_font_px(&self) -> f64;

    /// Current viewport as `(width, height)` in pixels.
    fn viewport(&self) -> (f64, f64);
}

/// Deterministic layout with fixed font sizes and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct StaticLayout {
    pub root_font_px: f64,
    pub parent_font_px: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for StaticLayout {
    fn default() -> Self {
        Self {
            root_font_px: DEFAULT_REM_BASE,
            parent_font_px: DEFAULT_REM_BASE,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

impl LayoutHost for StaticLayout {
    fn resolve_px(&self, value: f64, unit: LengthUnit) -> f64 {
        if let Some(ratio) = unit.px_per_unit() {
            return value * ratio;
        }
        match unit {
            LengthUnit::Rem => value * self.root_font_px,
            LengthUnit::Em => value * self.parent_font_px,
            LengthUnit::Percent => value * self.parent_font_px / 100.0,
            LengthUnit::Vh => value * self.viewport_height / 100.0,
            LengthUnit::Vw => value * self.viewport_width / 100.0,
            _ => value,
        }
    }

    fn parent_font_px(&self) -> f64 {
        self.parent_font_px
    }

    fn viewport(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }
}

/// Convert `value` from one unit token to another.
///
/// Identical tokens return the input untouched. When either side is empty
/// or not a length unit the value is also returned unchanged, since there is
/// no measurement to anchor it to.
pub fn convert_units(
    value: f64,
    from: &str,
    to: &str,
    host: &dyn LayoutHost,
    rem_base: f64,
) -> f64 {
    if from == to {
        return value;
    }
    let (Ok(from), Ok(to)) = (from.parse::<LengthUnit>(), to.parse::<LengthUnit>()) else {
        return value;
    };
    convert_length(value, from, to, host, rem_base)
}

/// Convert between two known length units.
pub fn convert_length(
    value: f64,
    from: LengthUnit,
    to: LengthUnit,
    host: &dyn LayoutHost,
    rem_base: f64,
) -> f64 {
    if from == to {
        return value;
    }
    let px = host.resolve_px(value, from);
    if let Some(ratio) = to.px_per_unit() {
        return px / ratio;
    }
    match to {
        LengthUnit::Rem => px / rem_base,
        LengthUnit::Em => px / host.parent_font_px(),
        LengthUnit::Percent => px / (host.parent_font_px() / 100.0),
        LengthUnit::Vh => px / (host.viewport().1 / 100.0),
        LengthUnit::Vw => px / (host.viewport().0 / 100.0),
        _ => px,
    }
}

/// A layout host paired with the root font size used for `rem`.
#[derive(Clone, Copy)]
pub struct UnitConverter<'a> {
    host: &'a dyn LayoutHost,
    rem_base: f64,
}

impl<'a> UnitConverter<'a> {
    pub fn new(host: &'a dyn LayoutHost, rem_base: f64) -> Self {
        Self { host, rem_base }
    }

    /// See [`convert_units`].
    pub fn convert(&self, value: f64, from: &str, to: &str) -> f64 {
        convert_units(value, from, to, self.host, self.rem_base)
    }
}
