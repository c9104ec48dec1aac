//! Command execution. The executor only knows how to hand a line to a shell
//! and capture stdout; whether a line is read-only or destructive is the
//! caller's business.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::shell::{Dialect, ShellLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The shell ran. `stdout` is trimmed; `success` reflects the exit status.
    Output { stdout: String, success: bool },
    /// The shell itself could not be started.
    Failed,
}

impl CommandResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandResult::Output {
            stdout: stdout.into(),
            success: true,
        }
    }

    /// Captured stdout, or `None` when execution failed.
    pub fn text(&self) -> Option<&str> {
        match self {
            CommandResult::Output { stdout, .. } => Some(stdout),
            CommandResult::Failed => None,
        }
    }

    /// Captured stdout when it is not blank.
    pub fn non_empty(&self) -> Option<&str> {
        self.text().filter(|s| !s.trim().is_empty())
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, CommandResult::Output { success: true, .. })
    }
}

pub trait Executor {
    fn execute(&self, line: &ShellLine) -> CommandResult;
}

/// Runs lines through `sh -c` or `cmd /C` depending on their dialect.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    posix_shell: PathBuf,
    cmd_shell: PathBuf,
}

impl ShellExecutor {
    pub fn new() -> Self {
        ShellExecutor {
            posix_shell: PathBuf::from("sh"),
            cmd_shell: PathBuf::from("cmd"),
        }
    }

    /// Use `program` as the shell for both dialects.
    pub fn with_shell(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        ShellExecutor {
            posix_shell: program.clone(),
            cmd_shell: program,
        }
    }

    fn command_for(&self, line: &ShellLine) -> Command {
        match line.dialect() {
            Dialect::Posix => {
                let mut cmd = Command::new(&self.posix_shell);
                cmd.arg("-c").arg(line.as_str());
                cmd
            }
            Dialect::Cmd => {
                let mut cmd = Command::new(&self.cmd_shell);
                cmd.arg("/C");
                push_cmd_line(&mut cmd, line.as_str());
                cmd
            }
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ShellExecutor {
    fn execute(&self, line: &ShellLine) -> CommandResult {
        debug!(command = %line, "executing");

        let output = match self.command_for(line).stdin(Stdio::null()).output() {
            Ok(output) => output,
            Err(e) => {
                error!(command = %line, error = %e, "failed to run command");
                return CommandResult::Failed;
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(command = %line, status = %output.status, stderr = %stderr.trim(), "command wrote to stderr");
        }

        CommandResult::Output {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            success: output.status.success(),
        }
    }
}

// cmd.exe does its own parsing, so the line must reach it verbatim.
#[cfg(windows)]
fn push_cmd_line(cmd: &mut Command, line: &str) {
    use std::os::windows::process::CommandExt;
    cmd.raw_arg(line);
}

#[cfg(not(windows))]
fn push_cmd_line(cmd: &mut Command, line: &str) {
    cmd.arg(line);
}

/// Executor double: canned responses keyed by line prefix, records every
/// executed line. Unmatched lines succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Vec<(String, CommandResult)>,
    executed: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, prefix: &str, stdout: &str) -> Self {
        self.respond_with(prefix, CommandResult::ok(stdout))
    }

    pub fn respond_with(mut self, prefix: &str, result: CommandResult) -> Self {
        self.responses.push((prefix.to_string(), result));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, line: &ShellLine) -> CommandResult {
        self.executed.borrow_mut().push(line.as_str().to_string());
        self.responses
            .iter()
            .find(|(prefix, _)| line.as_str().starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| CommandResult::ok(""))
    }
}
