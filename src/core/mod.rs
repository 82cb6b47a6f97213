//! Core editing primitives and terminal interfaces.

pub mod history;
pub mod keys;
pub mod line_buffer;
pub mod output;
pub mod terminal;
pub mod text;
