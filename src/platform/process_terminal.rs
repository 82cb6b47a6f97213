//! Raw-mode terminal backed by the process stdin/stdout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread::{self, JoinHandle};

use crate::config::EnvConfig;
use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Chunk forwarded when stdin reaches end of file; the editor treats it as Ctrl-D.
pub const EOF_INPUT: &str = "\x04";

type InputHandler = Box<dyn FnMut(String) + Send>;

#[derive(Default)]
struct InputState {
    handler: Option<InputHandler>,
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Reassembles UTF-8 characters split across reads.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            Err(err) if err.error_len().is_none() => {
                let valid = err.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        }
    }
}

#[cfg(unix)]
fn wait_writable(fd: c_int) -> std::io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }

        return Err(std::io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> std::io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> std::io::Result<usize>,
    FWait: FnMut(c_int) -> std::io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "write returned 0",
                ));
            }
            Ok(count) => {
                let remaining = bytes.len() - written;
                if count > remaining {
                    return Err(std::io::Error::other(
                        "write returned more bytes than requested",
                    ));
                }
                written += count;
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                wait_writable(fd)?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> std::io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(std::io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

/// True when `fd` has bytes to read or has hung up.
#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Restores the saved terminal mode from a signal or panic hook.
#[cfg(unix)]
#[derive(Clone, Copy)]
pub struct RawModeRestore {
    fd: c_int,
    original: libc::termios,
}

#[cfg(unix)]
impl RawModeRestore {
    pub fn restore(&self) {
        let _ = set_termios(self.fd, &self.original);
    }
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    input_state: Arc<Mutex<InputState>>,
    input_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::with_env(&EnvConfig::from_env())
    }

    pub fn with_env(env: &EnvConfig) -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original_termios: None,
            input_state: Arc::new(Mutex::new(InputState::default())),
            input_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            write_log_path: env.write_log.as_ref().map(PathBuf::from),
            write_log_failed: false,
        }
    }

    /// Handle for restoring the pre-raw terminal mode; `None` before `start`.
    pub fn restore_handle(&self) -> Option<RawModeRestore> {
        self.original_termios.map(|original| RawModeRestore {
            fd: self.stdin_fd,
            original,
        })
    }

    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> std::io::Result<()> {
        if let Some(original) = self.original_termios.as_ref() {
            set_termios(self.stdin_fd, original)?;
        }
        Ok(())
    }

    fn start_input_thread(&mut self) {
        let stdin_fd = self.stdin_fd;
        let input_state = Arc::clone(&self.input_state);
        let stop_flag = Arc::clone(&self.stop_flag);

        self.input_thread = Some(thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            let mut carry = Utf8Carry::default();

            while !stop_flag.load(Ordering::SeqCst) {
                if !poll_readable(stdin_fd, 50) {
                    continue;
                }
                let read_len =
                    unsafe { libc::read(stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
                let chunk = if read_len == 0 {
                    EOF_INPUT.to_string()
                } else if read_len < 0 {
                    let err = std::io::Error::last_os_error();
                    if err.kind() == std::io::ErrorKind::Interrupted
                        || err.kind() == std::io::ErrorKind::WouldBlock
                    {
                        continue;
                    }
                    tracing::warn!(error = %err, "stdin read failed");
                    EOF_INPUT.to_string()
                } else {
                    carry.push(&buffer[..read_len as usize])
                };

                if !chunk.is_empty() {
                    let mut state = lock_unpoisoned(&input_state);
                    if let Some(handler) = state.handler.as_mut() {
                        handler(chunk.clone());
                    }
                }
                if chunk == EOF_INPUT && read_len <= 0 {
                    break;
                }
            }
        }));
    }

    fn stop_input_thread(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        lock_unpoisoned(&self.input_state).handler = Some(on_input);
        self.stop_flag.store(false, Ordering::SeqCst);

        if let Err(err) = self.enable_raw_mode() {
            lock_unpoisoned(&self.input_state).handler = None;
            return Err(err);
        }

        self.start_input_thread();
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.stop_input_thread();
        lock_unpoisoned(&self.input_state).handler = None;

        // Flush input before leaving raw mode so buffered bytes do not leak to the shell.
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_raw_mode()
    }

    fn write(&mut self, data: &str) {
        if let Err(err) = write_fd(self.stdout_fd, data) {
            tracing::warn!(error = %err, "terminal write failed");
        }
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if result.is_err() {
                self.write_log_failed = true;
            }
        }
    }
}

/// Stops the signal thread on drop.
#[cfg(unix)]
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

#[cfg(unix)]
impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Run `cleanup` once on SIGINT, SIGTERM, or SIGHUP.
#[cfg(unix)]
pub fn install_signal_handlers<F>(cleanup: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn() + Send + Sync + 'static,
{
    let ran = AtomicBool::new(false);
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM, libc::SIGHUP])?;
    let handle = signals.handle();

    let thread = thread::spawn(move || {
        for _ in signals.forever() {
            if !ran.swap(true, Ordering::SeqCst) {
                cleanup();
            }
        }
    });

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

type PanicHookFn = dyn Fn(&std::panic::PanicHookInfo<'_>) + Send + Sync + 'static;

/// Restores the previous panic hook on drop.
pub struct PanicHookGuard {
    previous: Arc<Box<PanicHookFn>>,
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        let _ours = std::panic::take_hook();
        let previous = Arc::clone(&self.previous);
        std::panic::set_hook(Box::new(move |info| (previous)(info)));
    }
}

/// Route panic reports to `report` instead of stderr until the guard drops.
/// Writing a report into a raw-mode terminal garbles the prompt.
pub fn install_panic_hook<F>(report: F) -> PanicHookGuard
where
    F: Fn(&std::panic::PanicHookInfo<'_>) + Send + Sync + 'static,
{
    let previous: Arc<Box<PanicHookFn>> = Arc::new(std::panic::take_hook());
    std::panic::set_hook(Box::new(report));
    PanicHookGuard { previous }
}

#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "ProcessTerminal is only supported on Unix platforms",
        ))
    }

    fn stop(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn write(&mut self, _data: &str) {}
}

#[cfg(all(test, unix))]
mod tests {
    use std::io;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::{Duration, Instant};

    use super::{install_panic_hook, poll_readable, write_all_fd_with, ProcessTerminal, Utf8Carry};
    use crate::config::EnvConfig;
    use crate::core::terminal::Terminal;

    use libc::{self, c_int};

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    fn pty_terminal(pty: &Pty) -> ProcessTerminal {
        let mut terminal = ProcessTerminal::with_env(&EnvConfig { write_log: None });
        terminal.stdin_fd = pty.slave;
        terminal.stdout_fd = pty.slave;
        terminal
    }

    fn read_available(fd: c_int, timeout: Duration) -> Vec<u8> {
        let end = Instant::now() + timeout;
        let mut out = Vec::new();
        while Instant::now() < end {
            let remaining = end.saturating_duration_since(Instant::now());
            let timeout_ms = remaining.as_millis().min(i32::MAX as u128) as i32;
            if timeout_ms == 0 || !poll_readable(fd, timeout_ms) {
                break;
            }
            let mut buf = [0u8; 1024];
            let read_len = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut _, buf.len()) };
            if read_len <= 0 {
                break;
            }
            out.extend_from_slice(&buf[..read_len as usize]);
        }
        out
    }

    fn write_master(pty: &Pty, payload: &[u8]) {
        let _ = unsafe {
            libc::write(
                pty.master,
                payload.as_ptr() as *const libc::c_void,
                payload.len(),
            )
        };
    }

    #[test]
    fn pty_start_stop_do_not_write_output() {
        let pty = open_pty();
        let mut terminal = pty_terminal(&pty);

        terminal.start(Box::new(|_| {})).expect("terminal start");
        let output = read_available(pty.master, Duration::from_millis(200));
        assert!(
            output.is_empty(),
            "expected start() to write no output, got: {:?}",
            String::from_utf8_lossy(&output)
        );

        terminal.stop().expect("terminal stop");
        let output = read_available(pty.master, Duration::from_millis(200));
        assert!(output.is_empty());
    }

    #[test]
    fn raw_input_is_forwarded_untranslated() {
        let pty = open_pty();
        let (tx, rx) = mpsc::channel();
        let mut terminal = pty_terminal(&pty);

        terminal
            .start(Box::new(move |data| {
                let _ = tx.send(data);
            }))
            .expect("terminal start");

        write_master(&pty, b"ab\r\x1b[A");

        let mut received = String::new();
        let deadline = Instant::now() + Duration::from_millis(500);
        while received.len() < 6 && Instant::now() < deadline {
            if let Ok(chunk) = rx.recv_timeout(Duration::from_millis(50)) {
                received.push_str(&chunk);
            }
        }
        assert_eq!(received, "ab\r\x1b[A");

        terminal.stop().expect("terminal stop");
    }

    #[test]
    fn restore_handle_is_available_after_start() {
        let pty = open_pty();
        let mut terminal = pty_terminal(&pty);
        assert!(terminal.restore_handle().is_none());
        terminal.start(Box::new(|_| {})).expect("terminal start");
        let restore = terminal.restore_handle().expect("restore handle");
        terminal.stop().expect("terminal stop");
        restore.restore();
    }

    #[test]
    fn start_returns_err_on_tcgetattr_failure() {
        let mut terminal = ProcessTerminal::with_env(&EnvConfig { write_log: None });
        terminal.stdin_fd = -1;
        terminal.stdout_fd = -1;

        let err = terminal
            .start(Box::new(|_| {}))
            .expect_err("expected start to fail");
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn panic_hook_replaces_report_until_dropped() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let guard = install_panic_hook(move |info| {
            sink.lock().expect("reports lock").push(info.to_string());
        });
        let result = std::panic::catch_unwind(|| {
            panic!("quiet failure");
        });
        drop(guard);

        assert!(result.is_err());
        let reports = reports.lock().expect("reports lock");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("quiet failure"));
    }

    #[test]
    fn utf8_carry_joins_split_characters() {
        let mut carry = Utf8Carry::default();
        let bytes = "é日".as_bytes();
        assert_eq!(carry.push(&bytes[..1]), "");
        assert_eq!(carry.push(&bytes[1..3]), "é");
        assert_eq!(carry.push(&bytes[3..]), "日");
        assert_eq!(carry.push(b"\xffx"), "\u{fffd}x");
    }

    #[test]
    fn write_all_fd_with_retries_on_eintr_and_writes_all_bytes() {
        let data = b"hello";
        let mut out = Vec::new();
        let mut calls = 0;
        write_all_fd_with(
            1,
            data,
            |_, buf| {
                calls += 1;
                match calls {
                    1 => Err(io::Error::from(io::ErrorKind::Interrupted)),
                    2 => {
                        out.extend_from_slice(&buf[..2]);
                        Ok(2)
                    }
                    _ => {
                        out.extend_from_slice(buf);
                        Ok(buf.len())
                    }
                }
            },
            |_| unreachable!("wait_writable should not be called for EINTR"),
        )
        .expect("write_all_fd_with failed");

        assert_eq!(out, data);
    }

    #[test]
    fn write_all_fd_with_waits_for_writable_on_would_block_and_retries() {
        let data = b"xyz";
        let mut out = Vec::new();
        let mut calls = 0;
        let events = std::cell::RefCell::new(Vec::new());
        write_all_fd_with(
            1,
            data,
            |_, buf| {
                events.borrow_mut().push("write");
                calls += 1;
                if calls == 1 {
                    return Err(io::Error::from(io::ErrorKind::WouldBlock));
                }
                out.extend_from_slice(buf);
                Ok(buf.len())
            },
            |_| {
                events.borrow_mut().push("wait");
                Ok(())
            },
        )
        .expect("write_all_fd_with failed");

        assert_eq!(out, data);
        assert_eq!(events.into_inner(), vec!["write", "wait", "write"]);
    }
}
