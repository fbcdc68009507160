//! Value and unit extraction helpers.
//!
//! These mirror how form controls report their values: plain strings that
//! may carry a unit suffix, a hex color, or nothing parseable at all.

use cssparser::{ParseError, Parser, ParserInput, Token};

use super::units::LengthUnit;

/// Units accepted by [`is_valid_css_value`].
pub const CSS_VALUE_UNITS: &[&str] = &["px", "em", "rem", "%", "vh", "vw", "pt", "cm", "mm", "in", "pc"];

/// Named colors accepted by [`is_valid_css_color`].
pub const NAMED_COLORS: &[&str] = &[
    "black", "white", "red", "green", "blue", "yellow", "cyan", "magenta", "gray", "grey",
    "silver", "maroon", "olive", "purple", "teal", "navy", "aqua", "fuchsia", "lime", "orange",
];

/// Trailing unit of a value, or `""` for colors and bare numbers.
pub fn extract_unit(value: &str) -> &str {
    if contains_hex_color(value) {
        return "";
    }
    let start = value
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic() || *c == '%')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    &value[start..]
}

fn contains_hex_color(value: &str) -> bool {
    value.match_indices('#').any(|(i, _)| {
        value[i + 1..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .count()
            >= 3
    })
}

/// Whether `value` is a hex, `rgb()`/`rgba()` or named color.
pub fn is_valid_css_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if NAMED_COLORS.iter().any(|name| name.eq_ignore_ascii_case(value)) {
        return true;
    }
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    parser
        .parse_entirely(parse_rgb_function)
        .is_ok()
}

fn parse_rgb_function<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    let name = input.expect_function()?.clone();
    if !name.eq_ignore_ascii_case("rgb") && !name.eq_ignore_ascii_case("rgba") {
        return Err(input.new_custom_error(()));
    }
    input.parse_nested_block(|input| {
        parse_channel(input)?;
        input.expect_comma()?;
        parse_channel(input)?;
        input.expect_comma()?;
        parse_channel(input)?;
        if input.try_parse(|i| i.expect_comma()).is_ok() {
            let alpha = input.expect_number()?;
            if !(0.0..=1.0).contains(&alpha) {
                return Err(input.new_custom_error(()));
            }
        }
        Ok(())
    })
}

fn parse_channel<'i>(input: &mut Parser<'i, '_>) -> Result<u8, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match input.next()? {
        Token::Number {
            int_value: Some(v),
            has_sign: false,
            ..
        } if (0..=255).contains(v) => Ok(*v as u8),
        _ => Err(location.new_custom_error(())),
    }
}

/// Whether `value` is a number with an optional whitelisted unit.
pub fn is_valid_css_value(value: &str) -> bool {
    let unit = CSS_VALUE_UNITS
        .iter()
        .filter(|unit| value.ends_with(*unit))
        .max_by_key(|unit| unit.len())
        .copied()
        .unwrap_or("");
    is_numeric_literal(&value[..value.len() - unit.len()])
}

fn is_numeric_literal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    match frac {
        Some(frac) => digits(int) && !frac.is_empty() && digits(frac),
        None => !int.is_empty() && digits(int),
    }
}

/// Whether `value` names a length unit (used to spot unit selectors).
pub fn is_unit_token(value: &str) -> bool {
    value.parse::<LengthUnit>().is_ok()
}

/// Leading number of a string, with `parseFloat` semantics.
pub fn parse_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits |= frac_end > frac_start;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].trim_end_matches('.').parse().ok()
}

/// Format a number for a control value; non-finite numbers become `""`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Normalize a property value for comparison: `#rgb` expands to `#rrggbb`.
pub fn sanitize_property_value(value: &str) -> String {
    if let Some(hex) = value.strip_prefix('#')
        && hex.len() == 3
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        let mut out = String::with_capacity(7);
        out.push('#');
        for c in hex.chars() {
            out.push(c);
            out.push(c);
        }
        return out;
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_unit() {
        assert_eq!(extract_unit("1.5rem"), "rem");
        assert_eq!(extract_unit("50%"), "%");
        assert_eq!(extract_unit("12"), "");
        assert_eq!(extract_unit("#fff"), "");
        assert_eq!(extract_unit("#abcdef"), "");
        assert_eq!(extract_unit("rgb(0, 0, 0)"), "");
    }

    #[test]
    fn test_colors() {
        assert!(is_valid_css_color("#fff"));
        assert!(is_valid_css_color("#A0b1C2"));
        assert!(!is_valid_css_color("#ffff"));
        assert!(!is_valid_css_color("#ggg"));
        assert!(is_valid_css_color("rgb(255, 0, 12)"));
        assert!(is_valid_css_color("rgba(0,0,0,0.5)"));
        assert!(is_valid_css_color("rgba(0, 0, 0, 1)"));
        assert!(!is_valid_css_color("rgb(256, 0, 0)"));
        assert!(!is_valid_css_color("rgba(0, 0, 0, 1.5)"));
        assert!(!is_valid_css_color("rgb(0, 0)"));
        assert!(is_valid_css_color("Fuchsia"));
        assert!(!is_valid_css_color("rebeccapurple"));
        assert!(!is_valid_css_color(""));
    }

    #[test]
    fn test_css_values() {
        assert!(is_valid_css_value("16"));
        assert!(is_valid_css_value("1.25rem"));
        assert!(is_valid_css_value("50%"));
        assert!(is_valid_css_value("-2px"));
        assert!(is_valid_css_value(".5em"));
        assert!(!is_valid_css_value(""));
        assert!(!is_valid_css_value("px"));
        assert!(!is_valid_css_value("12deg"));
        assert!(!is_valid_css_value("1.rem"));
        assert!(!is_valid_css_value("auto"));
    }

    #[test]
    fn test_parse_number_matches_parse_float() {
        assert_eq!(parse_number("16px"), Some(16.0));
        assert_eq!(parse_number("  -0.5em"), Some(-0.5));
        assert_eq!(parse_number(".75"), Some(0.75));
        assert_eq!(parse_number("3."), Some(3.0));
        assert_eq!(parse_number("1e2px"), Some(100.0));
        assert_eq!(parse_number("2em"), Some(2.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("#fff"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(0.8), "0.8");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "");
    }

    #[test]
    fn test_sanitize_expands_short_hex() {
        assert_eq!(sanitize_property_value("#fff"), "#ffffff");
        assert_eq!(sanitize_property_value("#A1b"), "#AA11bb");
        assert_eq!(sanitize_property_value("#123456"), "#123456");
        assert_eq!(sanitize_property_value("1rem"), "1rem");
    }
}
