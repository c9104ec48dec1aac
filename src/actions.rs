//! Action dispatcher: upgrades and process kills.
//!
//! A dispatch never fails upward. Invalid input, a shell that cannot start
//! or a non-zero exit are all rendered and reported as `false`, so a batch
//! over a multi-selection keeps going.

use tracing::{info, warn};

use crate::console::{Console, Tone};
use crate::error::{Error, Result};
use crate::executor::{CommandResult, Executor};
use crate::package_manager::PackageManager;
use crate::platform::Platform;
use crate::shell::{Dialect, PackageName, Pid, ShellLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    UpgradeAll(PackageManager),
    UpgradeOne(PackageManager, String),
    KillProcess(String),
}

impl Action {
    fn command(&self, platform: Platform) -> Result<ShellLine> {
        match self {
            Action::UpgradeAll(manager) => Ok(manager.upgrade_all_line()),
            Action::UpgradeOne(manager, name) => {
                Ok(manager.upgrade_one_line(&PackageName::parse(name)?))
            }
            Action::KillProcess(pid) => {
                let pid = Pid::parse(pid)?;
                match platform {
                    Platform::MacLike => Ok(ShellLine::new(Dialect::Posix, "kill").raw("-9").pid(&pid)),
                    Platform::WindowsLike => Ok(ShellLine::new(Dialect::Cmd, "taskkill")
                        .raw("/PID")
                        .pid(&pid)
                        .raw("/F")),
                    Platform::Other => Err(Error::UnsupportedPlatform("killing processes")),
                }
            }
        }
    }

    fn progress(&self) -> String {
        match self {
            Action::UpgradeAll(manager) => format!("Upgrading all outdated {} packages...", manager),
            Action::UpgradeOne(_, name) => format!("Upgrading {}...", name),
            Action::KillProcess(pid) => format!("Killing process {}...", pid),
        }
    }

    fn done(&self) -> String {
        match self {
            Action::UpgradeAll(manager) => format!("All {} packages upgraded!", manager),
            Action::UpgradeOne(_, name) => format!("{} upgraded!", name),
            Action::KillProcess(pid) => format!("Process {} killed.", pid),
        }
    }

    fn subject(&self) -> String {
        match self {
            Action::UpgradeAll(manager) => format!("{} upgrade", manager),
            Action::UpgradeOne(_, name) => name.clone(),
            Action::KillProcess(pid) => format!("process {}", pid),
        }
    }
}

/// Run `action`, rendering the outcome. Returns whether it succeeded.
pub fn apply(
    action: &Action,
    platform: Platform,
    exec: &dyn Executor,
    console: &mut dyn Console,
) -> bool {
    let line = match action.command(platform) {
        Ok(line) => line,
        Err(e) => {
            warn!(action = ?action, error = %e, "refusing action");
            console.message(Tone::Error, &format!("Skipping {}: {}", action.subject(), e));
            return false;
        }
    };

    info!(command = %line, "dispatching action");
    console.status_start(&action.progress());
    let result = exec.execute(&line);
    console.status_stop();

    match result {
        CommandResult::Output { success: true, .. } => {
            console.message(Tone::Success, &action.done());
            true
        }
        CommandResult::Output { success: false, stdout } => {
            warn!(command = %line, output = %stdout, "action exited with failure");
            console.message(Tone::Error, &format!("Failed: {}", action.subject()));
            false
        }
        CommandResult::Failed => {
            console.message(Tone::Error, &format!("Could not run {}", action.subject()));
            false
        }
    }
}
