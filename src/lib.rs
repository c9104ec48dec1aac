//! Interactive maintenance utility for macOS and Windows hosts: system
//! summary, cache cleanup, process monitoring and package updates.

pub mod actions;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod executor;
pub mod interrupt;
pub mod logging;
pub mod menu;
pub mod package_manager;
pub mod parsers;
pub mod platform;
pub mod probes;
pub mod selector;
pub mod shell;

pub use error::{Error, Result};
