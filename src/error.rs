use std::io;

/// Errors raised by the library layer. Operations wrap these in `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input closed")]
    InputClosed,

    #[error("interrupted by user")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),

    #[error("invalid process id '{0}'")]
    InvalidPid(String),

    #[error("refusing to quote path '{0}'")]
    UnsafePath(String),

    #[error("{0} is not supported on this platform")]
    UnsupportedPlatform(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
