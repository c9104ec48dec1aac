//! Ctrl-C handling shared between the signal handlers and the console.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::SIGINT;
use signal_hook::flag;

#[derive(Debug, Clone, Default)]
pub struct InterruptFlags {
    interrupted: Arc<AtomicBool>,
    awaiting_input: Arc<AtomicBool>,
}

impl InterruptFlags {
    /// Register the SIGINT handlers.
    ///
    /// The first SIGINT during an operation only raises the flag, so the
    /// operation stops at its next checkpoint. A SIGINT while blocked on a
    /// prompt, or a second SIGINT, exits with status 130: stdin reads are
    /// restarted after the handler runs and would otherwise keep waiting.
    pub fn install() -> io::Result<Self> {
        let flags = Self::default();
        flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&flags.interrupted))?;
        flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&flags.awaiting_input))?;
        flag::register(SIGINT, Arc::clone(&flags.interrupted))?;
        Ok(flags)
    }

    /// Raise the flag as a SIGINT would.
    pub fn raise(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Run a blocking read with the awaiting-input flag raised.
    pub fn awaiting<T>(&self, read: impl FnOnce() -> T) -> T {
        self.awaiting_input.store(true, Ordering::SeqCst);
        let out = read();
        self.awaiting_input.store(false, Ordering::SeqCst);
        out
    }
}
