//! Shared text and encoding helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// Tries UTF-8 first (BOM handled automatically by encoding_rs), then the
/// hint encoding (from `<?xml encoding="..."?>`), then falls back to
/// Windows-1252, which is common in old ebooks.
pub(crate) fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
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

/// Extract the encoding name from an XML declaration, if any.
///
/// Only the first ~100 bytes are checked for `<?xml ... encoding="..."?>`.
pub(crate) fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    if after_enc.is_empty() {
        return None;
    }

    let quote = after_enc[0];
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_start = 1;
    let value_end = after_enc[value_start..].iter().position(|&b| b == quote)? + value_start;

    std::str::from_utf8(&after_enc[value_start..value_end]).ok()
}

/// Strip UTF-8 BOM if present.
pub(crate) fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Turn a spine item id into a human-readable title:
/// separators become spaces, each word is capitalized.
pub(crate) fn titleize(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Final path segment of an href, used as an attachment filename.
pub(crate) fn filename_from_href(href: &str) -> String {
    href.rsplit('/').next().unwrap_or(href).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("Hello, World!".as_bytes(), None), "Hello, World!");
    }

    #[test]
    fn test_decode_text_windows_1252_fallback() {
        // 0x92 is a right single quote in CP1252, invalid as UTF-8
        let bytes = b"Don\x92t";
        assert_eq!(decode_text(bytes, None), "Don\u{2019}t");
    }

    #[test]
    fn test_decode_text_with_hint() {
        let bytes = b"caf\xe9";
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let xml = br#"<?xml version="1.0" encoding="ISO-8859-1"?><root/>"#;
        assert_eq!(extract_xml_encoding(xml), Some("ISO-8859-1"));

        let no_decl = b"<root/>";
        assert_eq!(extract_xml_encoding(no_decl), None);
    }

    #[test]
    fn test_strip_bom() {
        let with_bom = &[0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(strip_bom(with_bom), b"hi");

        let without_bom = b"hello";
        assert_eq!(strip_bom(without_bom), b"hello");

        assert_eq!(strip_bom(&[]), &[]);

        // Partial BOM (not stripped)
        let partial = &[0xEF, 0xBB, b'x'];
        assert_eq!(strip_bom(partial), partial);
    }

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("chapter_1"), "Chapter 1");
        assert_eq!(titleize("copyright-page"), "Copyright Page");
        assert_eq!(titleize("ch01"), "Ch01");
        assert_eq!(titleize("__a__b"), "A B");
        assert_eq!(titleize(""), "");
    }

    #[test]
    fn test_filename_from_href() {
        assert_eq!(filename_from_href("images/cover.jpg"), "cover.jpg");
        assert_eq!(filename_from_href("cover.png"), "cover.png");
        assert_eq!(filename_from_href("a/b/c.gif"), "c.gif");
    }
}
