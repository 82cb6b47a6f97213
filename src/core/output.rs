//! Buffered terminal output and a single output gate.
//!
//! Invariant: the editor never writes to the terminal directly; it queues
//! commands here and the owner of the terminal flushes them.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw text or control sequences.
    Bytes(String),
    /// Move the cursor to a one-based column on the current row.
    Column(usize),
    /// Erase from the cursor to the end of the row.
    ClearToEnd,
    /// Erase the whole row and return to column one.
    ClearRow,
    SaveCursor,
    RestoreCursor,
    /// Carriage return plus line feed; raw mode does not translate `\n`.
    NewLine,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    fn encode_into(&self, out: &mut String) {
        match self {
            Self::Bytes(data) => out.push_str(data),
            Self::Column(column) => {
                out.push_str("\x1b[");
                out.push_str(&column.to_string());
                out.push('G');
            }
            Self::ClearToEnd => out.push_str("\x1b[0K"),
            Self::ClearRow => out.push_str("\x1b[2K\x1b[1G"),
            Self::SaveCursor => out.push_str("\x1b[s"),
            Self::RestoreCursor => out.push_str("\x1b[u"),
            Self::NewLine => out.push_str("\r\n"),
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Drains queued commands into their wire encoding.
    pub fn take_encoded(&mut self) -> String {
        let mut out = String::new();
        for cmd in self.cmds.drain(..) {
            cmd.encode_into(&mut out);
        }
        out
    }

    /// Flush buffered commands to the terminal in a single write.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let encoded = self.take_encoded();
        term.write(&encoded);
    }
}
