//! Cooperative stop signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Shared flag polled at iteration boundaries.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Set up the Ctrl+C handler.
///
/// The first Ctrl+C raises `first`; any later one raises `second`. This
/// should be called once at program startup.
pub fn install_interrupt_handler(first: StopSignal, second: StopSignal) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if first.is_triggered() {
            second.trigger();
            eprintln!("\nReceived Ctrl+C again, stopping uploads...");
        } else {
            first.trigger();
            eprintln!("\nReceived Ctrl+C, stopping after the current frame...");
        }
    })
}

/// Raise `signal` when a line is read from stdin.
///
/// Stdin that is closed or unreadable leaves the signal untouched.
pub fn spawn_enter_listener(signal: StopSignal) {
    let spawned = thread::Builder::new()
        .name("enter-listener".to_string())
        .spawn(move || {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(n) if n > 0 => signal.trigger(),
                Ok(_) => log::debug!("stdin closed, ENTER to stop is unavailable"),
                Err(e) => log::debug!("stdin not readable: {}", e),
            }
        });
    if let Err(e) = spawned {
        log::warn!("Failed to start ENTER listener: {}", e);
    }
}
