//! Utility functions with platform-specific implementations.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

/// Get a time-based seed value for pseudo-random number generation.
///
/// On native platforms, uses `SystemTime::now()`.
/// On WASM, uses `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

#[cfg(target_arch = "wasm32")]
pub fn time_seed_nanos() -> u64 {
    // js_sys::Date::now() returns milliseconds as f64
    (js_sys::Date::now() * 1_000_000.0) as u64
}

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate an element id like `dynamic-stylesheet-1718000000000-4821`.
///
/// Combines the current time in milliseconds with a pseudo-random suffix.
/// A process-wide counter is mixed in so ids taken within the same
/// millisecond still differ.
pub fn unique_id(prefix: &str) -> String {
    let nanos = time_seed_nanos();
    let millis = nanos / 1_000_000;
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed) as u64;
    let suffix = (nanos.wrapping_add(count.wrapping_mul(7919))) % 10_000;
    format!("{prefix}-{millis}-{suffix}{count}")
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from a `<meta charset>` or the command line)
/// 3. Falls back to Windows-1252 (common in older hand-written pages)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
///
/// # Examples
///
/// ```
/// use themeform::util::decode_text;
///
/// assert_eq!(decode_text("<form></form>".as_bytes(), None), "<form></form>");
/// assert_eq!(decode_text(b"caf\xe9", None), "café");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    // Fallback: Windows-1252 (superset of ISO-8859-1)
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the `charset` declared by a `<meta>` tag in the first kilobyte.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(1024)];
    let text = std::str::from_utf8(head)
        .or_else(|e| std::str::from_utf8(&head[..e.valid_up_to()]))
        .ok()?;
    let lower = text.to_ascii_lowercase();
    let at = lower.find("charset=")? + "charset=".len();
    let rest = &text[at..];
    let rest = rest.trim_start_matches(['"', '\'']);
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_differ() {
        let a = unique_id("dynamic-stylesheet");
        let b = unique_id("dynamic-stylesheet");
        assert!(a.starts_with("dynamic-stylesheet-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_with_hint() {
        let bytes = b"\xe4\xf6\xfc";
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "äöü");
    }

    #[test]
    fn test_sniff_meta_charset() {
        let html = br#"<html><head><meta charset="windows-1252"><title>x</title>"#;
        assert_eq!(sniff_meta_charset(html), Some("windows-1252"));
        assert_eq!(
            sniff_meta_charset(br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#),
            Some("ISO-8859-1")
        );
        assert_eq!(sniff_meta_charset(b"<p>plain</p>"), None);
    }
}
