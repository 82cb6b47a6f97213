#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{self, BoxFuture, FutureExt};
use history_store::HistoryStore;
use replterm::{strip_ansi, EditorConfig, Terminal};
use rpc_shell::{Console, Dispatcher, Engine};
use serde_json::Value;
use service_handle::{InvokeError, MethodSignature, ServiceHandle};
use service_handle_mock::MockService;
use tokio::sync::mpsc;

pub const PROMPT: &str = "[mock://local]#";

#[derive(Default)]
pub struct TerminalTrace {
    pub writes: Vec<String>,
    pub stop_calls: usize,
}

impl TerminalTrace {
    /// Everything written so far with colors removed.
    pub fn plain(&self) -> String {
        strip_ansi(&self.writes.concat())
    }
}

pub struct SharedTerminal {
    state: Arc<Mutex<TerminalTrace>>,
}

impl Terminal for SharedTerminal {
    fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        lock_unpoisoned(&self.state).stop_calls += 1;
        Ok(())
    }

    fn write(&mut self, data: &str) {
        lock_unpoisoned(&self.state).writes.push(data.to_string());
    }
}

pub fn console() -> (Console, Arc<Mutex<TerminalTrace>>) {
    let state = Arc::new(Mutex::new(TerminalTrace::default()));
    let terminal = SharedTerminal {
        state: Arc::clone(&state),
    };
    (Console::new(Box::new(terminal)), state)
}

pub fn plain_output(state: &Arc<Mutex<TerminalTrace>>) -> String {
    lock_unpoisoned(state).plain()
}

pub fn echo_service() -> Arc<MockService> {
    Arc::new(MockService::with_methods(
        "Echo",
        vec![MethodSignature::new("Echo", "Req", "Resp")],
    ))
}

pub fn dispatcher_with(service: Arc<dyn ServiceHandle>) -> (Dispatcher, Arc<Mutex<TerminalTrace>>) {
    let (console, state) = console();
    (Dispatcher::new(service, console), state)
}

pub fn engine_with(
    service: Arc<dyn ServiceHandle>,
    history_path: &Path,
) -> (Engine, Arc<Mutex<TerminalTrace>>) {
    let history = HistoryStore::open(history_path).expect("open history");
    let (dispatcher, state) = dispatcher_with(service);
    (
        Engine::new(EditorConfig::with_prompt(PROMPT), history, dispatcher),
        state,
    )
}

/// Input channel preloaded with `chunks`; the sender stays open so the engine
/// only stops on an exit key or `quit`.
pub fn input(chunks: &[&str]) -> (mpsc::UnboundedSender<String>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    for chunk in chunks {
        tx.send(chunk.to_string()).expect("send input");
    }
    (tx, rx)
}

/// Panics inside `invoke` for every method.
pub struct PanickingService {
    methods: Vec<MethodSignature>,
}

impl Default for PanickingService {
    fn default() -> Self {
        Self {
            methods: vec![MethodSignature::new("Boom", "Req", "Resp")],
        }
    }
}

impl ServiceHandle for PanickingService {
    fn service_name(&self) -> &str {
        "Panicky"
    }

    fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    fn invoke(&self, _method: &str, _params: Value) -> BoxFuture<'_, Result<Value, InvokeError>> {
        panic!("service exploded");
    }
}

/// Never answers.
pub struct HangingService {
    methods: Vec<MethodSignature>,
}

impl Default for HangingService {
    fn default() -> Self {
        Self {
            methods: vec![MethodSignature::new("Hang", "Req", "Resp")],
        }
    }
}

impl ServiceHandle for HangingService {
    fn service_name(&self) -> &str {
        "Slow"
    }

    fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    fn invoke(&self, _method: &str, _params: Value) -> BoxFuture<'_, Result<Value, InvokeError>> {
        future::pending().boxed()
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
