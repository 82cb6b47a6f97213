//! One-shot completion signal for a dispatched command.

use tokio::sync::oneshot;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Resume reading commands.
    Done,
    /// Leave the shell.
    Quit,
}

/// Sender half handed to a command handler. Finishing consumes it, so a
/// handler cannot complete twice; dropping it unfinished resolves as
/// [`Outcome::Done`].
#[derive(Debug)]
pub struct Completion {
    sender: Option<oneshot::Sender<Outcome>>,
}

pub type CompletionReceiver = oneshot::Receiver<Outcome>;

pub fn channel() -> (Completion, CompletionReceiver) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            sender: Some(sender),
        },
        receiver,
    )
}

impl Completion {
    pub fn finish(mut self, outcome: Outcome) {
        self.send(outcome);
    }

    pub fn done(self) {
        self.finish(Outcome::Done);
    }

    fn send(&mut self, outcome: Outcome) {
        if let Some(sender) = self.sender.take() {
            // Receiver gone means the shell already stopped waiting.
            let _ = sender.send(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.send(Outcome::Done);
    }
}

/// Waits for the handler to finish. A closed channel counts as done.
pub async fn wait(receiver: CompletionReceiver) -> Outcome {
    receiver.await.unwrap_or(Outcome::Done)
}
