//! Editable line with a fixed prompt margin.
//!
//! Invariant: `margin <= cursor <= text.len()`, and both `margin` and `cursor`
//! sit on grapheme boundaries. Everything before `margin` is the plain-text
//! prompt and is never edited.

use crate::core::text::utils::{first_grapheme_len, last_grapheme_len};
use crate::core::text::width::visible_width;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
    margin: usize,
}

impl LineBuffer {
    /// Starts a line after `plain_prompt` plus one separating space.
    pub fn with_prompt(plain_prompt: &str) -> Self {
        let mut text = String::with_capacity(plain_prompt.len() + 32);
        text.push_str(plain_prompt);
        text.push(' ');
        let margin = text.len();
        Self {
            text,
            cursor: margin,
            margin,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Operator input: everything after the prompt margin.
    pub fn input(&self) -> &str {
        &self.text[self.margin..]
    }

    /// Text right of the cursor.
    pub fn tail(&self) -> &str {
        &self.text[self.cursor..]
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.text.len()
    }

    /// One-based terminal column of the cursor.
    pub fn cursor_column(&self) -> usize {
        visible_width(&self.text[..self.cursor]) + 1
    }

    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Removes the grapheme left of the cursor. Returns false at the margin.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor <= self.margin {
            return false;
        }
        let len = last_grapheme_len(&self.text[self.margin..self.cursor]);
        let start = self.cursor - len;
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Removes the grapheme right of the cursor. Returns false at end of line.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        let len = first_grapheme_len(&self.text[self.cursor..]);
        self.text.replace_range(self.cursor..self.cursor + len, "");
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor <= self.margin {
            return false;
        }
        self.cursor -= last_grapheme_len(&self.text[self.margin..self.cursor]);
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.cursor += first_grapheme_len(&self.text[self.cursor..]);
        true
    }

    pub fn move_home(&mut self) {
        self.cursor = self.margin;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Removes the input between the margin and the cursor, keeping the tail.
    pub fn kill_to_margin(&mut self) {
        self.text.replace_range(self.margin..self.cursor, "");
        self.cursor = self.margin;
    }

    /// Replaces all input with `input` and moves the cursor to the end.
    pub fn replace_input(&mut self, input: &str) {
        self.text.truncate(self.margin);
        self.text.push_str(input);
        self.cursor = self.text.len();
    }

    /// Spaces needed to reach the next tab stop relative to the margin.
    pub fn tab_fill(&self, tab_width: usize) -> String {
        let tab_width = tab_width.max(1);
        let offset = visible_width(&self.text[self.margin..self.cursor]);
        " ".repeat(tab_width - offset % tab_width)
    }
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;

    fn assert_invariant(buffer: &LineBuffer) {
        assert!(buffer.margin() <= buffer.cursor(), "cursor left of margin");
        assert!(buffer.cursor() <= buffer.text().len(), "cursor past end");
        assert!(buffer.text().is_char_boundary(buffer.cursor()));
        assert!(buffer.text().starts_with(">> "));
    }

    #[test]
    fn starts_with_cursor_at_margin() {
        let buffer = LineBuffer::with_prompt(">>");
        assert_eq!(buffer.text(), ">> ");
        assert_eq!(buffer.margin(), 3);
        assert_eq!(buffer.cursor(), 3);
        assert_eq!(buffer.input(), "");
        assert_eq!(buffer.cursor_column(), 4);
    }

    #[test]
    fn insert_and_delete_stay_right_of_margin() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("ab");
        assert!(buffer.delete_backward());
        assert!(buffer.delete_backward());
        assert!(!buffer.delete_backward());
        assert_eq!(buffer.text(), ">> ");
        assert_invariant(&buffer);
    }

    #[test]
    fn delete_forward_is_noop_at_end() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("xy");
        assert!(!buffer.delete_forward());
        buffer.move_home();
        assert!(buffer.delete_forward());
        assert_eq!(buffer.input(), "y");
        assert_eq!(buffer.cursor(), buffer.margin());
    }

    #[test]
    fn moves_clamp_to_margin_and_end() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("abc");
        assert!(!buffer.move_right());
        buffer.move_home();
        assert!(!buffer.move_left());
        assert!(buffer.move_right());
        assert_eq!(buffer.tail(), "bc");
        buffer.move_end();
        assert!(buffer.is_at_end());
    }

    #[test]
    fn moves_step_over_whole_graphemes() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("e\u{301}日");
        assert!(buffer.move_left());
        assert_eq!(buffer.tail(), "日");
        assert!(buffer.move_left());
        assert_eq!(buffer.cursor(), buffer.margin());
        buffer.move_end();
        assert_eq!(buffer.cursor_column(), 4 + 1 + 2);
        assert!(buffer.delete_backward());
        assert_eq!(buffer.input(), "e\u{301}");
    }

    #[test]
    fn kill_to_margin_keeps_tail() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("rpc list");
        buffer.move_left();
        buffer.move_left();
        buffer.kill_to_margin();
        assert_eq!(buffer.input(), "st");
        assert_eq!(buffer.cursor(), buffer.margin());
        assert_invariant(&buffer);
    }

    #[test]
    fn replace_input_moves_cursor_to_end() {
        let mut buffer = LineBuffer::with_prompt(">>");
        buffer.insert("draft");
        buffer.move_home();
        buffer.replace_input("rpc list");
        assert_eq!(buffer.input(), "rpc list");
        assert!(buffer.is_at_end());
    }

    #[test]
    fn tab_fill_reaches_next_stop_relative_to_margin() {
        let mut buffer = LineBuffer::with_prompt(">>");
        assert_eq!(buffer.tab_fill(4), "    ");
        buffer.insert("ab");
        assert_eq!(buffer.tab_fill(4), "  ");
        buffer.insert("cd");
        assert_eq!(buffer.tab_fill(4), "    ");
        assert_eq!(buffer.tab_fill(1), " ");
        assert_eq!(buffer.tab_fill(0), " ");
    }

    #[test]
    fn invariant_holds_for_every_action_sequence() {
        #[derive(Clone, Copy, Debug)]
        enum Op {
            Insert,
            Back,
            Forward,
            Left,
            Right,
            Home,
            End,
            Kill,
        }
        const OPS: [Op; 8] = [
            Op::Insert,
            Op::Back,
            Op::Forward,
            Op::Left,
            Op::Right,
            Op::Home,
            Op::End,
            Op::Kill,
        ];

        // Every sequence of four operations.
        for a in OPS {
            for b in OPS {
                for c in OPS {
                    for d in OPS {
                        let mut buffer = LineBuffer::with_prompt(">>");
                        for op in [a, b, c, d] {
                            match op {
                                Op::Insert => buffer.insert("xé"),
                                Op::Back => {
                                    buffer.delete_backward();
                                }
                                Op::Forward => {
                                    buffer.delete_forward();
                                }
                                Op::Left => {
                                    buffer.move_left();
                                }
                                Op::Right => {
                                    buffer.move_right();
                                }
                                Op::Home => buffer.move_home(),
                                Op::End => buffer.move_end(),
                                Op::Kill => buffer.kill_to_margin(),
                            }
                            assert_invariant(&buffer);
                        }
                    }
                }
            }
        }
    }
}
