//! Raw-terminal line editor with history recall.
//!
//! The editor is a pure state machine: it consumes raw input chunks, queues
//! terminal output in an [`OutputGate`], and reports committed lines as
//! [`EditorEvent`]s. The caller owns the terminal and decides when to flush.

use crate::config::EditorConfig;
use crate::core::history::HistoryCursor;
use crate::core::keys::{Key, KeyDecoder};
use crate::core::line_buffer::LineBuffer;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::core::text::ansi::strip_ansi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A non-blank line was committed; carries the trimmed text.
    Commit(String),
    /// Ctrl-C or Ctrl-D.
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Prompt rendered, nothing typed yet.
    Idle,
    Editing,
    /// A committed command is executing; keystrokes are buffered silently.
    Committing,
}

pub struct TerminalEditor {
    prompt: String,
    plain_prompt: String,
    tab_width: usize,
    buffer: LineBuffer,
    history: HistoryCursor,
    decoder: KeyDecoder,
    state: EditorState,
    output: OutputGate,
}

impl TerminalEditor {
    pub fn new(config: EditorConfig, history: Vec<String>) -> Self {
        let plain_prompt = strip_ansi(&config.prompt);
        Self {
            buffer: LineBuffer::with_prompt(&plain_prompt),
            prompt: config.prompt,
            plain_prompt,
            tab_width: config.tab_width.max(1),
            history: HistoryCursor::new(history),
            decoder: KeyDecoder::new(),
            state: EditorState::Idle,
            output: OutputGate::new(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryCursor {
        &self.history
    }

    /// Renders the first prompt.
    pub fn start(&mut self) {
        self.state = EditorState::Idle;
        self.render_prompt();
    }

    /// Feeds one raw input chunk. Processing stops at the first `Exit`.
    pub fn handle_input(&mut self, data: &str) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        for key in self.decoder.feed(data) {
            if let Some(event) = self.handle_key(key) {
                let exit = event == EditorEvent::Exit;
                events.push(event);
                if exit {
                    break;
                }
            }
        }
        events
    }

    /// Ends the `Committing` state and re-renders the prompt together with
    /// anything typed while the command ran.
    pub fn finish_command(&mut self) {
        if self.state != EditorState::Committing {
            return;
        }
        self.state = if self.buffer.input().is_empty() {
            EditorState::Idle
        } else {
            EditorState::Editing
        };
        self.render_prompt();
    }

    pub fn take_output(&mut self) -> String {
        self.output.take_encoded()
    }

    pub fn flush<T: Terminal + ?Sized>(&mut self, terminal: &mut T) {
        self.output.flush(terminal);
    }

    fn handle_key(&mut self, key: Key) -> Option<EditorEvent> {
        match key {
            Key::CtrlC | Key::CtrlD => {
                self.output.push(TerminalCmd::NewLine);
                return Some(EditorEvent::Exit);
            }
            Key::Enter if self.state == EditorState::Committing => return None,
            Key::Enter => return self.commit(),
            _ => {}
        }

        let render = self.state != EditorState::Committing;
        if self.state == EditorState::Idle {
            self.state = EditorState::Editing;
        }

        match key {
            Key::Char(ch) => {
                let mut encoded = [0u8; 4];
                self.insert(ch.encode_utf8(&mut encoded), render);
            }
            Key::Tab => {
                let fill = self.buffer.tab_fill(self.tab_width);
                self.insert(&fill, render);
            }
            Key::Backspace => {
                if self.buffer.delete_backward() && render {
                    self.output.push(TerminalCmd::Column(self.buffer.cursor_column()));
                    self.redraw_tail();
                }
            }
            Key::Delete => {
                if self.buffer.delete_forward() && render {
                    self.redraw_tail();
                }
            }
            Key::Left => {
                let moved = self.buffer.move_left();
                self.move_cursor(moved && render);
            }
            Key::Right => {
                let moved = self.buffer.move_right();
                self.move_cursor(moved && render);
            }
            Key::Home | Key::CtrlA => {
                self.buffer.move_home();
                self.move_cursor(render);
            }
            Key::End | Key::CtrlE => {
                self.buffer.move_end();
                self.move_cursor(render);
            }
            Key::CtrlU => {
                self.buffer.kill_to_margin();
                if render {
                    self.redraw_line();
                }
            }
            Key::Up => {
                if let Some(entry) = self.history.previous(self.buffer.input()) {
                    self.buffer.replace_input(entry);
                    if render {
                        self.redraw_line();
                    }
                }
            }
            Key::Down => {
                if let Some(text) = self.history.next() {
                    self.buffer.replace_input(&text);
                    if render {
                        self.redraw_line();
                    }
                }
            }
            Key::Enter | Key::CtrlC | Key::CtrlD => {}
        }
        None
    }

    fn commit(&mut self) -> Option<EditorEvent> {
        let line = self.buffer.input().trim().to_string();
        self.output.push(TerminalCmd::NewLine);
        self.buffer = LineBuffer::with_prompt(&self.plain_prompt);

        if line.is_empty() {
            self.history.reset();
            self.state = EditorState::Idle;
            self.render_prompt();
            return None;
        }

        self.history.record(line.clone());
        self.state = EditorState::Committing;
        Some(EditorEvent::Commit(line))
    }

    fn insert(&mut self, text: &str, render: bool) {
        let at_end = self.buffer.is_at_end();
        self.buffer.insert(text);
        if !render {
            return;
        }
        if at_end {
            self.output.push(TerminalCmd::bytes(text));
            return;
        }
        self.output.extend([
            TerminalCmd::ClearToEnd,
            TerminalCmd::bytes(text),
            TerminalCmd::SaveCursor,
            TerminalCmd::bytes(self.buffer.tail()),
            TerminalCmd::RestoreCursor,
        ]);
    }

    fn move_cursor(&mut self, render: bool) {
        if render {
            self.output.push(TerminalCmd::Column(self.buffer.cursor_column()));
        }
    }

    fn redraw_tail(&mut self) {
        self.output.extend([
            TerminalCmd::ClearToEnd,
            TerminalCmd::SaveCursor,
            TerminalCmd::bytes(self.buffer.tail()),
            TerminalCmd::RestoreCursor,
        ]);
    }

    fn redraw_line(&mut self) {
        self.output.push(TerminalCmd::ClearRow);
        self.render_prompt();
    }

    fn render_prompt(&mut self) {
        self.output.extend([
            TerminalCmd::bytes(self.prompt.as_str()),
            TerminalCmd::bytes(" "),
            TerminalCmd::bytes(self.buffer.input()),
        ]);
        if !self.buffer.is_at_end() {
            self.output
                .push(TerminalCmd::Column(self.buffer.cursor_column()));
        }
    }
}
