//! Byte decoding and href helpers shared by the loader and the indexer.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>` or `<meta charset>`)
/// 3. Falls back to Windows-1252
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
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

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding declared in an XML declaration.
///
/// Only the first 100 bytes are checked.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    quoted_value(&after_xml[enc_pos + 9..])
}

/// Extract the charset declared by a `<meta charset=...>` tag.
///
/// Browsers only honour a declaration in the first 1024 bytes, so that is
/// all we look at.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];

    if let Some(value) = quoted_value(after) {
        return Some(value);
    }

    // Unquoted, as in content="text/html; charset=iso-8859-1"
    let end = after
        .iter()
        .position(|&b| b == b'"' || b == b'\'' || b == b'>' || b == b';' || b.is_ascii_whitespace())
        .unwrap_or(after.len());
    if end == 0 {
        return None;
    }
    std::str::from_utf8(&after[..end]).ok()
}

/// Encoding hint for an HTML file: XML declaration first, then meta charset.
pub fn sniff_encoding(bytes: &[u8]) -> Option<&str> {
    extract_xml_encoding(bytes).or_else(|| extract_meta_charset(bytes))
}

fn quoted_value(bytes: &[u8]) -> Option<&str> {
    let quote = *bytes.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = bytes[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&bytes[1..value_end]).ok()
}

/// Target id of an in-document href (`#id`), percent-decoded.
///
/// Returns `None` for anything that is not a bare fragment link
/// (other documents, external URLs, empty fragments).
pub fn fragment_target(href: &str) -> Option<Cow<'_, str>> {
    let fragment = href.trim().strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    Some(percent_decode_str(fragment).decode_utf8_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Hello, Wörld".as_bytes(), None), "Hello, Wörld");
    }

    #[test]
    fn test_decode_falls_back_to_hint() {
        // "café" in ISO-8859-1
        let bytes = b"caf\xe9";
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0x93/0x94 are curly quotes in CP1252
        let bytes = b"\x93quoted\x94";
        assert_eq!(decode_text(bytes, None), "\u{201c}quoted\u{201d}");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><html/>"#;
        assert_eq!(extract_xml_encoding(bytes), Some("ISO-8859-1"));
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
    }

    #[test]
    fn test_extract_meta_charset() {
        let quoted = br#"<html><head><meta charset="windows-1250"></head>"#;
        assert_eq!(extract_meta_charset(quoted), Some("windows-1250"));

        let http_equiv =
            br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-2">"#;
        assert_eq!(extract_meta_charset(http_equiv), Some("iso-8859-2"));

        assert_eq!(extract_meta_charset(b"<p>no charset here</p>"), None);
    }

    #[test]
    fn test_sniff_prefers_xml_declaration() {
        let bytes = br#"<?xml version="1.0" encoding="utf-8"?><meta charset="latin1">"#;
        assert_eq!(sniff_encoding(bytes), Some("utf-8"));
    }

    #[test]
    fn test_fragment_target() {
        assert_eq!(fragment_target("#_intro").as_deref(), Some("_intro"));
        assert_eq!(fragment_target("#caf%C3%A9").as_deref(), Some("café"));
        assert_eq!(fragment_target(" #padded ").as_deref(), Some("padded"));
        assert_eq!(fragment_target("#"), None);
        assert_eq!(fragment_target("other.html#x"), None);
        assert_eq!(fragment_target("https://example.com/#x"), None);
    }
}
