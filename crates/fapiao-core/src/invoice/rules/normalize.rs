//! Text normalization applied before any field matching.

use super::patterns::WHITESPACE_RUN;

/// Canonicalize whitespace and punctuation in raw invoice text.
///
/// Whitespace runs (including U+00A0) become one ASCII space, the result is
/// trimmed, and full-width `：`/`，` become `:`/`,`. Idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified: String = text
        .chars()
        .map(|c| match c {
            '：' => ':',
            '，' => ',',
            other => other,
        })
        .collect();

    WHITESPACE_RUN.replace_all(&unified, " ").trim().to_string()
}

/// [`normalize`] for input that may be missing.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Take at most `max_chars` characters from the start of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  发票号码：\n\t12345678\u{00a0}\u{00a0}x  "), "发票号码: 12345678 x");
    }

    #[test]
    fn test_unifies_punctuation() {
        assert_eq!(normalize("名称：甲，乙"), "名称:甲,乙");
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\u{00a0} "), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" a ")), "a");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "  a\u{00a0} b ",
            "合 计：100.00\r\n13.00",
            "名称：\u{3000}滴滴，出行 ",
            "\t\t",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn test_char_prefix_counts_chars() {
        assert_eq!(char_prefix("发票号码", 2), "发票");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_prefix("", 3), "");
    }
}
