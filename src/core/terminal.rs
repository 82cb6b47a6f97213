//! Terminal trait and lifecycle helpers.

/// Minimal terminal interface for the line editor.
pub trait Terminal {
    /// Enter raw mode and start delivering input chunks to `on_input`.
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()>;

    /// Stop input delivery and restore the original terminal mode.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str);
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        (**self).start(on_input)
    }

    fn stop(&mut self) -> std::io::Result<()> {
        (**self).stop()
    }

    fn write(&mut self, data: &str) {
        (**self).write(data)
    }
}

/// RAII guard that stops the terminal on drop.
pub struct TerminalGuard<T: Terminal> {
    terminal: Option<T>,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }

    /// Access the wrapped terminal, or `None` once it has been taken.
    pub fn terminal_mut(&mut self) -> Option<&mut T> {
        self.terminal.as_mut()
    }

    /// Consume the guard without running cleanup.
    pub fn into_inner(mut self) -> Option<T> {
        self.terminal.take()
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.as_mut() {
            let _ = terminal.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{Terminal, TerminalGuard};

    #[derive(Default)]
    struct CountingTerminal {
        stops: Arc<Mutex<usize>>,
    }

    impl Terminal for CountingTerminal {
        fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            *self.stops.lock().expect("stops lock") += 1;
            Ok(())
        }

        fn write(&mut self, _data: &str) {}
    }

    #[test]
    fn guard_stops_terminal_on_drop() {
        let stops = Arc::new(Mutex::new(0));
        {
            let _guard = TerminalGuard::new(CountingTerminal {
                stops: Arc::clone(&stops),
            });
        }
        assert_eq!(*stops.lock().expect("stops lock"), 1);
    }

    #[test]
    fn into_inner_skips_cleanup() {
        let stops = Arc::new(Mutex::new(0));
        let guard = TerminalGuard::new(CountingTerminal {
            stops: Arc::clone(&stops),
        });
        assert!(guard.into_inner().is_some());
        assert_eq!(*stops.lock().expect("stops lock"), 0);
    }
}
