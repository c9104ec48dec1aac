pub mod cache;
pub mod monitor;
pub mod summary;
pub mod updates;

use crate::config::Settings;
use crate::console::Console;
use crate::error::Error;
use crate::executor::Executor;
use crate::platform::Platform;

/// Everything an operation needs, passed explicitly instead of living in
/// globals so tests can swap in scripted doubles.
pub struct Context<'a> {
    pub platform: Platform,
    pub settings: &'a Settings,
    pub executor: &'a dyn Executor,
    pub console: &'a mut dyn Console,
}

impl Context<'_> {
    /// Checkpoint between mutating steps: fails once Ctrl-C was pressed.
    pub fn ensure_running(&self) -> crate::Result<()> {
        if self.console.interrupted() {
            return Err(Error::Interrupted);
        }
        Ok(())
    }
}
