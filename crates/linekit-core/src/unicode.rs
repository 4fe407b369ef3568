//! Unicode helpers shared by the document model and the renderer.
//!
//! Cursor offsets are counted in runes (Unicode scalar values), while the
//! renderer needs terminal cell widths. Wide characters such as CJK take two
//! cells; control characters take none.

use unicode_width::UnicodeWidthChar;

/// Count the runes in a string.
///
/// # Examples
///
/// ```
/// use linekit_core::unicode::rune_count;
///
/// assert_eq!(rune_count("hello"), 5);
/// assert_eq!(rune_count("こんにちは"), 5);
/// ```
pub fn rune_count(s: &str) -> usize {
    s.chars().count()
}

/// Terminal cell width of a single character.
pub fn char_width(c: char) -> usize {
    if c.is_control() {
        return 0;
    }
    c.width().unwrap_or(0)
}

/// Terminal cell width of a string.
///
/// # Examples
///
/// ```
/// use linekit_core::unicode::display_width;
///
/// assert_eq!(display_width("hello"), 5);
/// assert_eq!(display_width("こんにちは"), 10);
/// assert_eq!(display_width("a\nb"), 2);
/// ```
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Substring by rune range `start..end`. Out-of-range bounds are clamped.
pub fn rune_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start_byte = byte_index_from_rune_index(s, start);
    let end_byte = byte_index_from_rune_index(s, end);
    &s[start_byte..end_byte]
}

/// Byte offset of the rune at `rune_index`, or `s.len()` past the end.
pub fn byte_index_from_rune_index(s: &str, rune_index: usize) -> usize {
    s.char_indices()
        .nth(rune_index)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

pub fn char_at_rune_index(s: &str, index: usize) -> Option<char> {
    s.chars().nth(index)
}

/// Cut `s` so that it fits in `width` cells including `tail`.
///
/// Strings that already fit are returned unchanged. The result can be
/// narrower than `width` when a wide character would straddle the limit, so
/// callers that need an exact width pad with [`fill_right`].
///
/// # Examples
///
/// ```
/// use linekit_core::unicode::truncate_with_tail;
///
/// assert_eq!(truncate_with_tail("abcdefgh", 6, "..."), "abc...");
/// assert_eq!(truncate_with_tail("abc", 6, "..."), "abc");
/// assert_eq!(truncate_with_tail("您好xxx您好xxx", 11, "..."), "您好xxx...");
/// ```
pub fn truncate_with_tail(s: &str, width: usize, tail: &str) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    let limit = width.saturating_sub(display_width(tail));
    let mut used = 0;
    let mut end = s.len();
    for (i, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > limit {
            end = i;
            break;
        }
        used += w;
    }
    let mut out = String::with_capacity(end + tail.len());
    out.push_str(&s[..end]);
    out.push_str(tail);
    out
}

/// Pad `s` with spaces on the right up to `width` cells.
pub fn fill_right(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - current));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rune_count() {
        assert_eq!(rune_count(""), 0);
        assert_eq!(rune_count("hello"), 5);
        assert_eq!(rune_count("世界"), 2);
        assert_eq!(rune_count("🦀🚀"), 2);
        assert_eq!(rune_count("café"), 4);
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("世界"), 4);
        assert_eq!(display_width("a世b"), 4);
        assert_eq!(display_width("\n\r\t"), 0);
    }

    #[test]
    fn test_rune_slice() {
        assert_eq!(rune_slice("hello", 1, 4), "ell");
        assert_eq!(rune_slice("こんにちは", 1, 3), "んに");
        assert_eq!(rune_slice("hello", 3, 100), "lo");
        assert_eq!(rune_slice("hello", 4, 2), "");
    }

    #[test]
    fn test_byte_index_from_rune_index() {
        assert_eq!(byte_index_from_rune_index("hello", 2), 2);
        assert_eq!(byte_index_from_rune_index("こんにちは", 2), 6);
        assert_eq!(byte_index_from_rune_index("abc", 10), 3);
    }

    #[test]
    fn test_char_at_rune_index() {
        assert_eq!(char_at_rune_index("hello", 1), Some('e'));
        assert_eq!(char_at_rune_index("こんにちは", 1), Some('ん'));
        assert_eq!(char_at_rune_index("hello", 10), None);
    }

    #[test]
    fn test_truncate_with_tail_wide_chars() {
        let truncated = truncate_with_tail("您好xxx您好xxx", 11, "...");
        assert_eq!(truncated, "您好xxx...");
        assert_eq!(display_width(&truncated), 10);
        assert_eq!(display_width(&fill_right(&truncated, 11)), 11);
    }

    #[test]
    fn test_truncate_with_tail_narrower_than_tail() {
        assert_eq!(truncate_with_tail("abcdef", 2, "..."), "...");
    }

    #[test]
    fn test_fill_right() {
        assert_eq!(fill_right("ab", 4), "ab  ");
        assert_eq!(fill_right("abcd", 2), "abcd");
        assert_eq!(fill_right("世", 3), "世 ");
    }
}
