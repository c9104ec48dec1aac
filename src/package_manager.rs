use std::fmt;

use crate::executor::Executor;
use crate::platform::Platform;
use crate::shell::{Dialect, PackageName, ShellLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Homebrew,
    Chocolatey,
    Winget,
}

impl PackageManager {
    /// Managers worth probing on `platform`, in order of preference.
    pub fn candidates(platform: Platform) -> &'static [PackageManager] {
        match platform {
            Platform::MacLike => &[PackageManager::Homebrew],
            Platform::WindowsLike => &[PackageManager::Chocolatey, PackageManager::Winget],
            Platform::Other => &[],
        }
    }

    /// First installed manager for `platform`, if any.
    pub fn detect(platform: Platform, exec: &dyn Executor) -> Option<PackageManager> {
        PackageManager::candidates(platform)
            .iter()
            .copied()
            .find(|manager| exec.execute(&manager.locate_line()).non_empty().is_some())
    }

    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Homebrew => "brew",
            PackageManager::Chocolatey => "choco",
            PackageManager::Winget => "winget",
        }
    }

    fn dialect(self) -> Dialect {
        match self {
            PackageManager::Homebrew => Dialect::Posix,
            PackageManager::Chocolatey | PackageManager::Winget => Dialect::Cmd,
        }
    }

    /// `which`/`where` lookup; prints a path only when the tool exists.
    pub fn locate_line(self) -> ShellLine {
        match self.dialect() {
            Dialect::Posix => ShellLine::new(Dialect::Posix, "which").raw(self.binary()),
            Dialect::Cmd => ShellLine::new(Dialect::Cmd, "where").raw(self.binary()),
        }
    }

    pub fn outdated_line(self) -> ShellLine {
        match self {
            PackageManager::Homebrew => ShellLine::new(Dialect::Posix, "brew").raw("outdated"),
            PackageManager::Chocolatey => ShellLine::new(Dialect::Cmd, "choco").raw("outdated"),
            PackageManager::Winget => ShellLine::new(Dialect::Cmd, "winget")
                .raw("upgrade")
                .raw("--accept-source-agreements"),
        }
    }

    pub fn upgrade_all_line(self) -> ShellLine {
        match self {
            PackageManager::Homebrew => ShellLine::new(Dialect::Posix, "brew").raw("upgrade"),
            PackageManager::Chocolatey => ShellLine::new(Dialect::Cmd, "choco")
                .raw("upgrade")
                .raw("all")
                .raw("-y"),
            PackageManager::Winget => ShellLine::new(Dialect::Cmd, "winget")
                .raw("upgrade")
                .raw("--all")
                .raw("--silent"),
        }
    }

    pub fn upgrade_one_line(self, package: &PackageName) -> ShellLine {
        match self {
            PackageManager::Homebrew => ShellLine::new(Dialect::Posix, "brew")
                .raw("upgrade")
                .package(package),
            PackageManager::Chocolatey => ShellLine::new(Dialect::Cmd, "choco")
                .raw("upgrade")
                .package(package)
                .raw("-y"),
            PackageManager::Winget => ShellLine::new(Dialect::Cmd, "winget")
                .raw("upgrade")
                .raw("--id")
                .package(package)
                .raw("--silent"),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Homebrew => write!(f, "Homebrew"),
            PackageManager::Chocolatey => write!(f, "Chocolatey"),
            PackageManager::Winget => write!(f, "Winget"),
        }
    }
}
