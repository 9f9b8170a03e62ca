//! Size-bounded text helpers.
//!
//! Lengths are counted in `char`s. Truncated output always ends with
//! [`CONTINUATION`] and never exceeds the requested limit, marker included.

/// Marker appended to truncated text.
pub const CONTINUATION: &str = "...";

/// Truncate `text` to at most `limit` characters.
///
/// Text already within the limit is returned unchanged. Otherwise the cut is
/// made at the last whitespace boundary inside the budget (falling back to a
/// hard cut for a single oversized word) and [`CONTINUATION`] is appended.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let marker_len = CONTINUATION.chars().count();
    if limit <= marker_len {
        return text.chars().take(limit).collect();
    }

    let budget = limit - marker_len;
    let (head, next) = match text.char_indices().nth(budget) {
        Some((idx, ch)) => (&text[..idx], Some(ch)),
        None => (text, None),
    };

    let cut = if next.is_some_and(char::is_whitespace) {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) if idx > 0 => &head[..idx],
            _ => head,
        }
    };

    format!("{}{CONTINUATION}", cut.trim_end())
}

/// Collapse every run of whitespace (including newlines) into one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace, then truncate. Returns an empty string for blank input.
pub fn summarize(text: &str, limit: usize) -> String {
    truncate(&collapse_whitespace(text), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate("hello world", 50), "hello world");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn cuts_at_word_boundary() {
        let out = truncate("the quick brown fox jumps", 15);
        assert_eq!(out, "the quick...");
        assert!(out.chars().count() <= 15);
    }

    #[test]
    fn keeps_whole_word_when_boundary_falls_on_space() {
        // budget = 9 chars: "the quick", next char is a space
        assert_eq!(truncate("the quick brown", 12), "the quick...");
    }

    #[test]
    fn hard_cuts_single_long_word() {
        let out = truncate("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(out, "abcdefg...");
    }

    #[test]
    fn tiny_limits_never_overflow() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let text = "Chủ đề trọng tâm của bài toán hôm nay";
        let out = truncate(text, 12);
        assert!(out.chars().count() <= 12);
        assert!(out.ends_with(CONTINUATION));
    }

    #[test]
    fn truncation_is_idempotent() {
        let samples = [
            "",
            "short",
            "a somewhat longer sentence that needs trimming",
            "ünïcödé wörds everywhere in this line",
            "nospacesatallinthisverylongtoken",
        ];
        for text in samples {
            for limit in 0..60 {
                let once = truncate(text, limit);
                assert!(once.chars().count() <= limit, "{text:?} @ {limit}");
                assert_eq!(truncate(&once, limit), once, "{text:?} @ {limit}");
            }
        }
    }

    #[test]
    fn summarize_collapses_whitespace() {
        let out = summarize("Given an array\n\n  of integers\tnums", 100);
        assert_eq!(out, "Given an array of integers nums");
        assert_eq!(summarize("   \n\t ", 10), "");
    }
}
