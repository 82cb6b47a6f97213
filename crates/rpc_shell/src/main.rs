use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use history_store::{default_history_path, HistoryStore};
use replterm::{install_panic_hook, red, EditorConfig, ProcessTerminal, Terminal, TerminalGuard};
use rpc_shell::bootstrap::{banner, build_service, prompt, rc_notice};
use rpc_shell::config::{self, Args};
use rpc_shell::invoker::panic_message;
use rpc_shell::{logging, Console, Dispatcher, Engine, ExitReason};
use service_handle::ServiceHandle;
use tokio::sync::mpsc;
use tracing::{error, info};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", red("Error:"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let settings = config::resolve(Args::parse())?;
    logging::init(settings.log_file.as_deref())?;

    if let Some(source) = &settings.rc_source {
        println!("{} {}", replterm::green("Info:"), rc_notice(source));
    }

    let service = build_service(&settings.target).context("failed to resolve service")?;
    let history_path = settings
        .history_file
        .clone()
        .or_else(default_history_path)
        .context("no history location; set HOME or pass --history-file")?;
    let history = HistoryStore::open(&history_path)?;
    println!("{}", banner(&settings.target, service.service_name()));

    let editor_config = EditorConfig::with_prompt(replterm::green(&prompt(&settings.target)))
        .tab_width(settings.tab_width);

    // Guards inside the session drop while unwinding, so the terminal is
    // back in cooked mode before a panic is reported here.
    let reason = match panic::catch_unwind(AssertUnwindSafe(|| {
        run_session(editor_config, history, service)
    })) {
        Ok(result) => result?,
        Err(payload) => {
            anyhow::bail!("shell panicked: {}", panic_message(payload.as_ref()))
        }
    };
    info!(?reason, "session ended");
    Ok(())
}

fn run_session(
    editor_config: EditorConfig,
    history: HistoryStore,
    service: Arc<dyn ServiceHandle>,
) -> anyhow::Result<ExitReason> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let mut terminal = ProcessTerminal::new();
    terminal
        .start(Box::new(move |chunk| {
            let _ = input_tx.send(chunk);
        }))
        .context("failed to enter raw mode")?;
    let _signals = restore_on_signal(&terminal)?;
    let _panic_hook = install_panic_hook(|info| {
        error!(panic = %info, "panic while the terminal was raw");
    });

    let console = Console::new(Box::new(terminal));
    let _guard = TerminalGuard::new(console.clone());
    let dispatcher = Dispatcher::new(service, console);
    let mut engine = Engine::new(editor_config, history, dispatcher);

    Ok(runtime.block_on(engine.run(input_rx))?)
}

/// SIGTERM and SIGHUP restore the terminal and exit; raw mode already keeps
/// Ctrl-C from raising SIGINT.
#[cfg(unix)]
fn restore_on_signal(terminal: &ProcessTerminal) -> anyhow::Result<replterm::SignalHookGuard> {
    let restore = terminal.restore_handle();
    replterm::install_signal_handlers(move || {
        if let Some(restore) = restore {
            restore.restore();
        }
        std::process::exit(0);
    })
    .context("failed to install signal handlers")
}

#[cfg(not(unix))]
fn restore_on_signal(_terminal: &ProcessTerminal) -> anyhow::Result<()> {
    Ok(())
}
