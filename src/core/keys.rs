//! Keystroke decoding.
//!
//! Raw terminal input is reduced to [`Key`]s one character at a time. An ESC
//! switches the decoder into the escape-sequence state, which accumulates
//! bytes until the sequence is structurally complete (CSI final byte, SS3
//! pair, or a two-byte meta sequence) and then looks it up in a fixed table.
//! Complete sequences missing from the table are dropped.
//!
//! A control character or a byte that cannot continue the sequence abandons
//! it and is decoded on its own, so ESC never swallows Enter or Ctrl-C.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    CtrlA,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlU,
}

const ESC: char = '\x1b';

/// Longest sequence buffered before it is abandoned.
const MAX_SEQUENCE_LEN: usize = 16;

const SEQUENCES: &[(&str, Key)] = &[
    ("\x1b[A", Key::Up),
    ("\x1bOA", Key::Up),
    ("\x1b[B", Key::Down),
    ("\x1bOB", Key::Down),
    ("\x1b[C", Key::Right),
    ("\x1bOC", Key::Right),
    ("\x1b[D", Key::Left),
    ("\x1bOD", Key::Left),
    ("\x1b[H", Key::Home),
    ("\x1bOH", Key::Home),
    ("\x1b[1~", Key::Home),
    ("\x1b[7~", Key::Home),
    ("\x1b[F", Key::End),
    ("\x1bOF", Key::End),
    ("\x1b[4~", Key::End),
    ("\x1b[8~", Key::End),
    ("\x1b[3~", Key::Delete),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum SequenceStatus {
    Complete,
    Incomplete,
    /// The last byte cannot continue the sequence.
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DecoderState {
    #[default]
    Ground,
    EscapeSequence(String),
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a partial escape sequence is buffered.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DecoderState::EscapeSequence(_))
    }

    pub fn feed(&mut self, data: &str) -> Vec<Key> {
        let mut keys = Vec::new();
        for ch in data.chars() {
            if let Some(key) = self.feed_char(ch) {
                keys.push(key);
            }
        }
        keys
    }

    fn feed_char(&mut self, ch: char) -> Option<Key> {
        match &mut self.state {
            DecoderState::Ground => {
                if ch == ESC {
                    self.state = DecoderState::EscapeSequence(String::from(ESC));
                    return None;
                }
                control_key(ch)
            }
            DecoderState::EscapeSequence(buffer) => {
                if ch == ESC || ch.is_control() {
                    tracing::debug!(sequence = ?buffer, "abandoning escape sequence");
                    if ch == ESC {
                        *buffer = String::from(ESC);
                        return None;
                    }
                    self.state = DecoderState::Ground;
                    return control_key(ch);
                }

                buffer.push(ch);
                match sequence_status(buffer) {
                    SequenceStatus::Incomplete if buffer.len() < MAX_SEQUENCE_LEN => None,
                    SequenceStatus::Incomplete => {
                        tracing::debug!(sequence = ?buffer, "dropping overlong escape sequence");
                        self.state = DecoderState::Ground;
                        None
                    }
                    SequenceStatus::Broken => {
                        buffer.pop();
                        tracing::debug!(sequence = ?buffer, "abandoning escape sequence");
                        self.state = DecoderState::Ground;
                        control_key(ch)
                    }
                    SequenceStatus::Complete => {
                        let sequence = std::mem::take(buffer);
                        self.state = DecoderState::Ground;
                        let key = lookup_sequence(&sequence);
                        if key.is_none() {
                            tracing::debug!(sequence = ?sequence, "dropping unbound escape sequence");
                        }
                        key
                    }
                }
            }
        }
    }
}

fn control_key(ch: char) -> Option<Key> {
    match ch {
        '\r' => Some(Key::Enter),
        '\x7f' | '\x08' => Some(Key::Backspace),
        '\t' => Some(Key::Tab),
        '\x01' => Some(Key::CtrlA),
        '\x03' => Some(Key::CtrlC),
        '\x04' => Some(Key::CtrlD),
        '\x05' => Some(Key::CtrlE),
        '\x15' => Some(Key::CtrlU),
        c if c.is_control() => None,
        c => Some(Key::Char(c)),
    }
}

pub fn lookup_sequence(sequence: &str) -> Option<Key> {
    SEQUENCES
        .iter()
        .find(|(candidate, _)| *candidate == sequence)
        .map(|(_, key)| *key)
}

fn sequence_status(data: &str) -> SequenceStatus {
    let after = &data[ESC.len_utf8()..];
    let mut chars = after.chars();
    match chars.next() {
        None => SequenceStatus::Incomplete,
        Some('[') => csi_status(chars.as_str()),
        Some('O') => {
            if chars.next().is_some() {
                SequenceStatus::Complete
            } else {
                SequenceStatus::Incomplete
            }
        }
        Some(_) => SequenceStatus::Complete,
    }
}

/// Parameter and intermediate bytes (0x20-0x3f) continue a CSI sequence; a
/// final byte (0x40-0x7e) ends it; anything else breaks it.
fn csi_status(payload: &str) -> SequenceStatus {
    match payload.chars().last() {
        None => SequenceStatus::Incomplete,
        Some(ch) if ('\x40'..='\x7e').contains(&ch) => SequenceStatus::Complete,
        Some(ch) if ('\x20'..='\x3f').contains(&ch) => SequenceStatus::Incomplete,
        Some(_) => SequenceStatus::Broken,
    }
}
