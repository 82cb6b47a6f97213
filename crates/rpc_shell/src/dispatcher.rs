//! Routes committed lines to their handlers.
//!
//! Resolution order: a direct section handler (the action is ignored), then
//! the `(section, action)` pair, then "invalid command". Every dispatch
//! completes exactly once through a [`Completion`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use futures_util::future::{BoxFuture, FutureExt};
use service_handle::ServiceHandle;
use tracing::debug;

use crate::commands::{parse_command, Command};
use crate::completion::{self, Completion, Outcome};
use crate::console::Console;
use crate::help::{command_help, message_help, method_list, rpc_help};
use crate::invoker::run_call;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Help,
    Quit,
    RpcHelp,
    RpcList,
    RpcCall,
    MessageHelp,
}

enum Entry {
    Direct(Route),
    Actions(HashMap<&'static str, Route>),
}

static REGISTRY: LazyLock<HashMap<&'static str, Entry>> = LazyLock::new(|| {
    let mut registry = HashMap::new();
    registry.insert("help", Entry::Direct(Route::Help));
    registry.insert("?", Entry::Direct(Route::Help));
    registry.insert("quit", Entry::Direct(Route::Quit));
    registry.insert("q", Entry::Direct(Route::Quit));
    registry.insert(
        "rpc",
        Entry::Actions(HashMap::from([
            ("", Route::RpcHelp),
            ("help", Route::RpcHelp),
            ("?", Route::RpcHelp),
            ("-h", Route::RpcHelp),
            ("list", Route::RpcList),
            ("call", Route::RpcCall),
        ])),
    );
    registry.insert(
        "message",
        Entry::Actions(HashMap::from([
            ("", Route::MessageHelp),
            ("help", Route::MessageHelp),
            ("?", Route::MessageHelp),
            ("-", Route::MessageHelp),
        ])),
    );
    registry
});

/// Looks up the handler for a parsed command.
pub fn resolve(command: &Command) -> Option<Route> {
    match REGISTRY.get(command.section.as_str())? {
        Entry::Direct(route) => Some(*route),
        Entry::Actions(actions) => actions.get(command.action.as_str()).copied(),
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn ServiceHandle>,
    console: Console,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn ServiceHandle>, console: Console) -> Self {
        Self { service, console }
    }

    pub fn service(&self) -> &Arc<dyn ServiceHandle> {
        &self.service
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Runs `line` and resolves once its completion fires. Dropping the
    /// returned future abandons an in-flight call.
    pub fn dispatch(&self, line: &str) -> BoxFuture<'static, Outcome> {
        let (completion, receiver) = completion::channel();
        let command = parse_command(line);
        let work = self.handle(line.trim(), command, completion);
        async move {
            work.await;
            completion::wait(receiver).await
        }
        .boxed()
    }

    fn handle(
        &self,
        line: &str,
        command: Command,
        completion: Completion,
    ) -> BoxFuture<'static, ()> {
        if !command.validated {
            debug!(section = %command.section, "rejected command");
            self.console.error(&format!("Invalid command supplied: {line}"));
            completion.done();
            return futures_util::future::ready(()).boxed();
        }

        let Some(route) = resolve(&command) else {
            debug!(section = %command.section, action = %command.action, "no route");
            self.console.error("Invalid command supplied");
            completion.done();
            return futures_util::future::ready(()).boxed();
        };
        debug!(?route, "dispatching");

        match route {
            Route::Help => self.console.line(&command_help()),
            Route::Quit => {
                completion.finish(Outcome::Quit);
                return futures_util::future::ready(()).boxed();
            }
            Route::RpcHelp => self.console.line(&rpc_help(self.service.service_name())),
            Route::RpcList => {
                let list = method_list(self.service.methods());
                if !list.is_empty() {
                    self.console.line(&list);
                }
            }
            Route::RpcCall => {
                return run_call(
                    Arc::clone(&self.service),
                    self.console.clone(),
                    command.extra,
                    completion,
                )
                .boxed();
            }
            Route::MessageHelp => self.console.line(&message_help()),
        }
        completion.done();
        futures_util::future::ready(()).boxed()
    }
}
