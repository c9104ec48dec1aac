//! Typed shell command lines.
//!
//! Every command the utility runs is assembled here from static fragments
//! plus validated values, so interpolated package names, PIDs and paths can
//! never smuggle extra shell syntax into the final line.

use std::fmt;

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Quoting rules of the shell a line is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `sh -c`
    Posix,
    /// `cmd /C`
    Cmd,
}

impl Dialect {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::WindowsLike => Dialect::Cmd,
            Platform::MacLike | Platform::Other => Dialect::Posix,
        }
    }

    fn quote(self, value: &str) -> Result<String> {
        if value.is_empty() || value.chars().any(char::is_control) {
            return Err(Error::UnsafePath(value.to_string()));
        }
        match self {
            Dialect::Posix => Ok(format!("'{}'", value.replace('\'', r"'\''"))),
            Dialect::Cmd => {
                if value.contains(['"', '%']) {
                    return Err(Error::UnsafePath(value.to_string()));
                }
                Ok(format!("\"{}\"", value))
            }
        }
    }
}

/// A package identifier as reported by a package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName(String);

impl PackageName {
    pub fn parse(raw: &str) -> Result<Self> {
        let ok = !raw.is_empty()
            && !raw.starts_with('-')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '@' | '/' | ':'));
        if ok {
            Ok(PackageName(raw.to_string()))
        } else {
            Err(Error::InvalidPackageName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A process identifier. Only ASCII digits are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pid(String);

impl Pid {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.len() <= 10 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Pid(raw.to_string()))
        } else {
            Err(Error::InvalidPid(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete command line for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLine {
    dialect: Dialect,
    line: String,
}

impl ShellLine {
    pub fn new(dialect: Dialect, program: &'static str) -> Self {
        ShellLine {
            dialect,
            line: program.to_string(),
        }
    }

    /// Append a literal fragment (flags, redirections, pipelines).
    pub fn raw(mut self, fragment: &'static str) -> Self {
        self.line.push(' ');
        self.line.push_str(fragment);
        self
    }

    pub fn package(mut self, name: &PackageName) -> Self {
        self.line.push(' ');
        self.line.push_str(name.as_str());
        self
    }

    pub fn pid(mut self, pid: &Pid) -> Self {
        self.line.push(' ');
        self.line.push_str(pid.as_str());
        self
    }

    pub fn number(mut self, n: usize) -> Self {
        self.line.push(' ');
        self.line.push_str(&n.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Result<Self> {
        let quoted = self.dialect.quote(path)?;
        self.line.push(' ');
        self.line.push_str(&quoted);
        Ok(self)
    }

    /// Append a glob matching everything inside `dir`.
    pub fn dir_contents(mut self, dir: &str) -> Result<Self> {
        let glob = match self.dialect {
            Dialect::Posix => format!("{}/*", self.dialect.quote(dir.trim_end_matches('/'))?),
            Dialect::Cmd => self
                .dialect
                .quote(&format!("{}\\*", dir.trim_end_matches('\\')))?,
        };
        self.line.push(' ');
        self.line.push_str(&glob);
        Ok(self)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for ShellLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Expand `~` and `%VAR%` references in a configured path.
///
/// Returns `None` when a referenced variable (or the home directory) is not
/// available, so the caller can skip the path instead of touching a literal
/// `%TEMP%` directory.
pub fn expand_path(
    raw: &str,
    home: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let with_home = if raw == "~" {
        home?.to_string()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        format!("{}/{}", home?.trim_end_matches('/'), rest)
    } else {
        raw.to_string()
    };

    let mut expanded = String::with_capacity(with_home.len());
    let mut rest = with_home.as_str();
    while let Some(start) = rest.find('%') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('%')?;
        expanded.push_str(&lookup(&after[..end])?);
        rest = &after[end + 1..];
    }
    expanded.push_str(rest);
    Some(expanded)
}

/// `expand_path` against the real environment.
pub fn expand_env_path(raw: &str) -> Option<String> {
    let home = dirs::home_dir().map(|h| h.to_string_lossy().to_string());
    expand_path(raw, home.as_deref(), |var| std::env::var(var).ok())
}
