//! Shared handle to the terminal for command output.
//!
//! The editor's output gate and command handlers both write through one
//! [`Console`]; handlers write whole lines while the editor is committing, so
//! the two never interleave within a line.

use std::sync::{Arc, Mutex, MutexGuard};

use replterm::{green, red, Terminal};

pub type BoxedTerminal = Box<dyn Terminal + Send>;

#[derive(Clone)]
pub struct Console {
    terminal: Arc<Mutex<BoxedTerminal>>,
}

impl Console {
    pub fn new(terminal: BoxedTerminal) -> Self {
        Self {
            terminal: Arc::new(Mutex::new(terminal)),
        }
    }

    /// Writes raw bytes with no newline translation.
    pub fn write(&self, data: &str) {
        if data.is_empty() {
            return;
        }
        lock_unpoisoned(&self.terminal).write(data);
    }

    /// Writes `text` followed by a line break. Raw mode disables output
    /// post-processing, so every `\n` becomes `\r\n`.
    pub fn line(&self, text: &str) {
        let mut out = text.replace("\r\n", "\n").replace('\n', "\r\n");
        out.push_str("\r\n");
        lock_unpoisoned(&self.terminal).write(&out);
    }

    pub fn error(&self, message: &str) {
        self.line(&format!("{} {message}", red("Error:")));
    }

    pub fn info(&self, message: &str) {
        self.line(&format!("{} {message}", green("Info:")));
    }
}

impl Terminal for Console {
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        lock_unpoisoned(&self.terminal).start(on_input)
    }

    fn stop(&mut self) -> std::io::Result<()> {
        lock_unpoisoned(&self.terminal).stop()
    }

    fn write(&mut self, data: &str) {
        Console::write(self, data);
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
