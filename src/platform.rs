use std::fmt;

/// Operating system profile, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacLike,
    WindowsLike,
    Other,
}

impl Platform {
    /// Map a `std::env::consts::OS` style name onto a profile.
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacLike,
            "windows" => Platform::WindowsLike,
            _ => Platform::Other,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Platform::Other)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacLike => write!(f, "macOS"),
            Platform::WindowsLike => write!(f, "Windows"),
            Platform::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}

pub fn detect() -> Platform {
    Platform::from_os(std::env::consts::OS)
}
