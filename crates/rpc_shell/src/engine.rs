//! The input loop: keystrokes in, commands out.
//!
//! One task owns the editor. Input chunks arrive over a channel from the
//! terminal's reader thread; while a command runs, the loop keeps draining
//! them so typing ahead works and Ctrl-C can abandon the call.

use futures_util::future::BoxFuture;
use history_store::{HistoryStore, HistoryStoreError};
use replterm::{EditorConfig, EditorEvent, TerminalEditor};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::completion::Outcome;
use crate::console::Console;
use crate::dispatcher::Dispatcher;

/// Why [`Engine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `quit` or `q`.
    Quit,
    /// Ctrl-C or Ctrl-D.
    Interrupted,
    /// The input channel closed.
    InputClosed,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to record command in history")]
    History(#[from] HistoryStoreError),
}

pub struct Engine {
    editor: TerminalEditor,
    history: HistoryStore,
    dispatcher: Dispatcher,
    console: Console,
}

impl Engine {
    /// Seeds the editor's recall list from `history`.
    pub fn new(config: EditorConfig, history: HistoryStore, dispatcher: Dispatcher) -> Self {
        let editor = TerminalEditor::new(config, history.commands().to_vec());
        let console = dispatcher.console().clone();
        Self {
            editor,
            history,
            dispatcher,
            console,
        }
    }

    pub fn editor(&self) -> &TerminalEditor {
        &self.editor
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn run(
        &mut self,
        mut input: mpsc::UnboundedReceiver<String>,
    ) -> Result<ExitReason, EngineError> {
        self.editor.start();
        self.flush();

        let mut pending: Option<BoxFuture<'static, Outcome>> = None;
        loop {
            tokio::select! {
                // A finished command resumes the prompt before later input is
                // applied to it.
                biased;

                outcome = poll_pending(&mut pending), if pending.is_some() => {
                    pending = None;
                    match outcome {
                        Outcome::Quit => return Ok(ExitReason::Quit),
                        Outcome::Done => {
                            self.editor.finish_command();
                            self.flush();
                        }
                    }
                }
                chunk = input.recv() => {
                    let Some(chunk) = chunk else {
                        debug!("input closed");
                        return Ok(ExitReason::InputClosed);
                    };
                    for event in self.editor.handle_input(&chunk) {
                        match event {
                            EditorEvent::Exit => {
                                if pending.take().is_some() {
                                    debug!("abandoning in-flight command");
                                }
                                self.flush();
                                return Ok(ExitReason::Interrupted);
                            }
                            EditorEvent::Commit(line) => {
                                self.flush();
                                self.history.append(&line)?;
                                debug!(%line, "dispatching");
                                pending = Some(self.dispatcher.dispatch(&line));
                            }
                        }
                    }
                    self.flush();
                }
            }
        }
    }

    fn flush(&mut self) {
        self.editor.flush(&mut self.console);
    }
}

async fn poll_pending(pending: &mut Option<BoxFuture<'static, Outcome>>) -> Outcome {
    match pending.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
