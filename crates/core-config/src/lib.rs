//! Configuration loading and parsing.
//!
//! Parses `vins.toml` (or an override path provided by the binary). Three
//! sections are recognized:
//!
//! * `[insert]`: `shift_width`, `tab_stop`, `expand_tab` consumed by the insert
//!   command runner through the `InsertSettings` trait.
//! * `[completion]`: `enabled` gates the `<C-n>`/`<C-p>` word completion trigger.
//! * `[log]`: `filter`, the fallback tracing filter when `RUST_LOG` is unset.
//!
//! Unknown fields are ignored. A missing file yields defaults; a file that fails
//! to parse also yields defaults but logs a warning under the `config` target.
//!
//! Vim parity: `shift_width = 0` means "use `tab_stop`" and `tab_stop` is
//! clamped to at least 1.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Settings facility consulted when executing insert commands.
pub trait InsertSettings {
    /// Columns per `<C-d>`/`<C-t>` step (never 0).
    fn shift_width(&self) -> usize;
    fn tab_stop(&self) -> usize;
    fn expand_tab(&self) -> bool;
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InsertConfig {
    #[serde(default = "InsertConfig::default_shift_width")] // Vim default: 8
    pub shift_width: usize,
    #[serde(default = "InsertConfig::default_tab_stop")]
    pub tab_stop: usize,
    #[serde(default)]
    pub expand_tab: bool,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            shift_width: Self::default_shift_width(),
            tab_stop: Self::default_tab_stop(),
            expand_tab: false,
        }
    }
}

impl InsertConfig {
    const fn default_shift_width() -> usize {
        8
    }
    const fn default_tab_stop() -> usize {
        8
    }

    pub fn new(shift_width: usize, tab_stop: usize, expand_tab: bool) -> Self {
        Self {
            shift_width,
            tab_stop,
            expand_tab,
        }
    }
}

impl InsertSettings for InsertConfig {
    fn shift_width(&self) -> usize {
        if self.shift_width == 0 {
            self.tab_stop()
        } else {
            self.shift_width
        }
    }
    fn tab_stop(&self) -> usize {
        self.tab_stop.max(1)
    }
    fn expand_tab(&self) -> bool {
        self.expand_tab
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    #[serde(default = "CompletionConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl CompletionConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub insert: InsertConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile, // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("vins.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vins").join("vins.toml");
    }
    PathBuf::from("vins.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                shift_width = file.insert.shift_width,
                tab_stop = file.insert.tab_stop,
                expand_tab = file.insert.expand_tab,
                completion = file.completion.enabled,
                "config_loaded"
            );
            Ok(Config {
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn insert(&self) -> &InsertConfig {
        &self.file.insert
    }

    pub fn completion_enabled(&self) -> bool {
        self.file.completion.enabled
    }

    pub fn log_filter(&self) -> &str {
        &self.file.log.filter
    }
}
