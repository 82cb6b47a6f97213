//! Grapheme stepping helpers used by the line buffer.

use unicode_segmentation::UnicodeSegmentation;

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

/// Byte length of the grapheme that ends at `text`'s end.
pub fn last_grapheme_len(text: &str) -> usize {
    grapheme_segments(text)
        .next_back()
        .map(|segment| segment.len())
        .unwrap_or(0)
}

/// Byte length of the grapheme that starts `text`.
pub fn first_grapheme_len(text: &str) -> usize {
    grapheme_segments(text)
        .next()
        .map(|segment| segment.len())
        .unwrap_or(0)
}
