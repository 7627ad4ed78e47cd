//! Text normalization applied to every extracted chapter.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());
static RE_BREAK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Canonicalize extracted text.
///
/// Applies the configured literal replacements in order (fixing mis-encoded
/// punctuation and similar artifacts), collapses runs of horizontal
/// whitespace to a single space, trims every line, caps line-break runs at a
/// single blank line (`\n\n`, the canonical paragraph separator) and trims
/// the whole result. Line trimming happens before the break-run collapse so
/// whitespace-only lines cannot recreate triple breaks; that ordering is
/// what makes the function idempotent.
pub fn normalize(text: &str, replacements: &[(String, String)]) -> String {
    let mut result = text.to_string();
    for (from, to) in replacements {
        if from.is_empty() {
            continue;
        }
        result = result.replace(from.as_str(), to);
    }

    let result = RE_HORIZONTAL_WS.replace_all(&result, " ");
    let result = result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let result = RE_BREAK_RUNS.replace_all(&result, "\n\n");
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plain(text: &str) -> String {
        normalize(text, &[])
    }

    #[test]
    fn test_collapses_horizontal_whitespace() {
        assert_eq!(plain("a  b\t\tc"), "a b c");
        assert_eq!(plain("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_preserves_single_and_double_breaks() {
        assert_eq!(plain("line one\nline two"), "line one\nline two");
        assert_eq!(plain("para one\n\npara two"), "para one\n\npara two");
    }

    #[test]
    fn test_collapses_break_runs() {
        assert_eq!(plain("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trims_lines_and_result() {
        assert_eq!(plain("  a  \n  b  "), "a\nb");
        assert_eq!(plain("\n\n  text  \n\n"), "text");
    }

    #[test]
    fn test_whitespace_only_lines_become_paragraph_break() {
        // The blank-ish middle lines must not survive as a triple break
        assert_eq!(plain("a\n \n \n \nb"), "a\n\nb");
    }

    #[test]
    fn test_replacements_fix_mojibake() {
        let replacements = vec![("â€™".to_string(), "'".to_string())];
        assert_eq!(normalize("donâ€™t", &replacements), "don't");
    }

    #[test]
    fn test_replacements_applied_in_order() {
        // Earlier replacements feed later ones
        let replacements = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ];
        assert_eq!(normalize("a", &replacements), "c");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(plain("a\r\nb\r\n\r\nc"), "a\nb\n\nc");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(plain(""), "");
        assert_eq!(plain("   \n\t\n  "), "");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in any::<String>()) {
            let once = normalize(&text, &[]);
            let twice = normalize(&once, &[]);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_no_triple_breaks_or_edge_whitespace(text in "[ a-z\n\t]{0,120}") {
            let out = normalize(&text, &[]);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
