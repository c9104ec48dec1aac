use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use colored::Colorize;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, Settings};

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber, appending to the configured log file.
///
/// The terminal belongs to the menu, so nothing is logged there. If the log
/// file cannot be opened, events are discarded after one warning.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let path = settings.log_file();
    let writer = match open_append(&path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!(
                "{} cannot open log file {}: {}",
                "!!".yellow().bold(),
                path.display(),
                e
            );
            BoxMakeWriter::new(io::sink)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    let installed = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = installed {
        eprintln!("{} logging disabled: {}", "!!".yellow().bold(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_log_in_missing_directory_for_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tuneup.log");

        {
            use std::io::Write;
            let mut f = open_append(&path).unwrap();
            writeln!(f, "first").unwrap();
        }
        {
            use std::io::Write;
            let mut f = open_append(&path).unwrap();
            writeln!(f, "second").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
