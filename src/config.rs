use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Diagnostic log; defaults to the per-user data directory.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Rows shown before offering the full list.
    pub preview_limit: usize,
    /// Rows kept per process ranking.
    pub top_processes: usize,
    /// Ask before deleting cache contents.
    pub confirm_destructive: bool,
    pub cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_file: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            preview_limit: 5,
            top_processes: 10,
            confirm_destructive: true,
            cache: CacheSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub mac_paths: Vec<String>,
    pub windows_paths: Vec<String>,
    pub browsers: Vec<BrowserCache>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            mac_paths: vec!["~/Library/Caches".into(), "/Library/Caches".into()],
            windows_paths: vec!["%TEMP%".into(), r"C:\Windows\Temp".into()],
            browsers: vec![
                BrowserCache::new(
                    "Microsoft Edge",
                    Some("~/Library/Caches/Microsoft Edge"),
                    Some(r"%LOCALAPPDATA%\Microsoft\Edge\User Data\Default\Cache"),
                ),
                BrowserCache::new("Safari", Some("~/Library/Caches/com.apple.Safari"), None),
                BrowserCache::new(
                    "Chrome",
                    None,
                    Some(r"%LOCALAPPDATA%\Google\Chrome\User Data\Default\Cache"),
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserCache {
    pub name: String,
    #[serde(default)]
    pub mac_path: Option<String>,
    #[serde(default)]
    pub windows_path: Option<String>,
}

impl BrowserCache {
    pub fn new(name: &str, mac_path: Option<&str>, windows_path: Option<&str>) -> Self {
        BrowserCache {
            name: name.to_string(),
            mac_path: mac_path.map(str::to_string),
            windows_path: windows_path.map(str::to_string),
        }
    }
}

impl CacheSettings {
    /// System cache directories to clear on `platform`, unexpanded.
    pub fn system_paths(&self, platform: Platform) -> &[String] {
        match platform {
            Platform::MacLike => &self.mac_paths,
            Platform::WindowsLike => &self.windows_paths,
            Platform::Other => &[],
        }
    }

    /// `(browser, path)` pairs to clear on `platform`, unexpanded.
    pub fn browser_paths(&self, platform: Platform) -> Vec<(&str, &str)> {
        self.browsers
            .iter()
            .filter_map(|b| {
                let path = match platform {
                    Platform::MacLike => b.mac_path.as_deref(),
                    Platform::WindowsLike => b.windows_path.as_deref(),
                    Platform::Other => None,
                }?;
                Some((b.name.as_str(), path))
            })
            .collect()
    }
}

impl Settings {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("tuneup").join("config.toml"))
    }

    pub fn default_log_file() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("tuneup")
            .join("tuneup.log")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(Self::default_log_file)
    }
}

/// Defaults, then the TOML file, then `TUNEUP_*` environment variables.
///
/// A missing default config file is fine; an explicitly requested one must
/// exist.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config file {} does not exist", p.display());
            }
            p.to_path_buf()
        }
        None => Settings::path()?,
    };

    Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("TUNEUP_").split("__"))
        .extract()
        .with_context(|| format!("parsing {}", path.display()))
}
