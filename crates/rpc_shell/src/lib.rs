//! Interactive shell for calling methods on a resolved RPC service.
//!
//! A committed line flows parser → [`dispatcher::Dispatcher`] → handler, and
//! the [`engine::Engine`] resumes the prompt once the handler's completion
//! fires.

pub mod bootstrap;
pub mod commands;
pub mod completion;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod engine;
pub mod help;
pub mod invoker;
pub mod logging;

pub use commands::{parse_command, Command};
pub use completion::{Completion, Outcome};
pub use console::Console;
pub use dispatcher::{Dispatcher, Route};
pub use engine::{Engine, EngineError, ExitReason};
