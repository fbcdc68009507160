//! CSS value handling: units, value extraction and stylesheet scanning.

pub mod stylesheet;
pub mod units;
pub mod values;

pub use stylesheet::{Stylesheet, StyleRule, minimize_css, normalize_selector, split_selector_list};
pub use units::{LayoutHost, LengthUnit, StaticLayout, UnitConverter, convert_length, convert_units};
pub use values::{
    extract_unit, format_number, is_unit_token, is_valid_css_color, is_valid_css_value,
    parse_number, sanitize_property_value,
};
