//! Raw-terminal line editor for interactive command prompts.
//!
//! Invariant: single output gate. The editor only queues output; the owner of
//! the [`Terminal`] flushes it via [`TerminalEditor::flush`].
//!
//! # Public API Overview
//! - [`TerminalEditor`] turns raw input chunks into [`EditorEvent`]s.
//! - [`LineBuffer`], [`HistoryCursor`], and [`KeyDecoder`] are the editing
//!   primitives it is built from.
//! - [`ProcessTerminal`] puts the process tty into raw mode and forwards input.
//! - Text helpers measure and color ANSI-decorated strings.

pub mod config;
pub mod editor;

pub mod core;
pub mod platform;

pub use crate::config::{EditorConfig, EnvConfig};
pub use crate::editor::{EditorEvent, EditorState, TerminalEditor};

/// Editing primitives.
pub use crate::core::history::HistoryCursor;
pub use crate::core::keys::{Key, KeyDecoder};
pub use crate::core::line_buffer::LineBuffer;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::output::{OutputGate, TerminalCmd};
pub use crate::core::terminal::{Terminal, TerminalGuard};
pub use crate::platform::process_terminal::{install_panic_hook, PanicHookGuard, ProcessTerminal};
#[cfg(unix)]
pub use crate::platform::process_terminal::{
    install_signal_handlers, RawModeRestore, SignalHookGuard,
};

/// ANSI-aware text helpers.
pub use crate::core::text::ansi::{blue_bold, gray, green, red, strip_ansi, yellow};
pub use crate::core::text::width::visible_width;
