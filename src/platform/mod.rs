//! Platform-specific terminal integrations.

pub mod process_terminal;

#[cfg(unix)]
pub use process_terminal::{install_signal_handlers, RawModeRestore, SignalHookGuard};
pub use process_terminal::{install_panic_hook, PanicHookGuard, ProcessTerminal};
