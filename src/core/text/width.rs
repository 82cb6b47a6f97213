//! Grapheme width and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::strip_ansi;

pub fn grapheme_width(grapheme: &str) -> usize {
    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Terminal columns occupied by `input`, ignoring ANSI control sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }

    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}
