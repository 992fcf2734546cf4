//! Process diagnostics.
//!
//! [`ThreadInfoLogger`] periodically logs how many threads the process is
//! running. It runs on its own thread, only reads process information and
//! never touches game state.

use std::fs;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Logs the live thread count at `debug` level every interval.
#[derive(Debug)]
pub struct ThreadInfoLogger {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadInfoLogger {
    /// Start logging every `interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if the logging thread cannot be spawned.
    pub fn start(interval: Duration, show_names: bool) -> std::io::Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("thread-info".to_string())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => log_threads(show_names),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop logging and wait for the logging thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // a closed channel also stops the loop
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadInfoLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn log_threads(show_names: bool) {
    match thread_count() {
        Some(count) if show_names => {
            debug!(count, names = ?thread_names(), "live threads");
        }
        Some(count) => debug!(count, "live threads"),
        None => debug!("live thread count unavailable on this platform"),
    }
}

/// Number of threads in this process, where the OS exposes it.
#[must_use]
pub fn thread_count() -> Option<usize> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    parse_thread_count(&status)
}

fn parse_thread_count(status: &str) -> Option<usize> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|count| count.trim().parse().ok())
}

/// Names of the threads in this process, where the OS exposes them.
#[must_use]
pub fn thread_names() -> Vec<String> {
    let Ok(tasks) = fs::read_dir("/proc/self/task") else {
        return Vec::new();
    };
    let mut names: Vec<String> = tasks
        .filter_map(Result::ok)
        .filter_map(|task| fs::read_to_string(task.path().join("comm")).ok())
        .map(|name| name.trim().to_string())
        .collect();
    names.sort();
    names
}
