// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "SAFE_FORMAT_CONFIG";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: LoggingLevel,
    pub log_to_disk: bool,
    /// Diagnostic log directory; per-user state dir when unset.
    pub log_dir: Option<PathBuf>,
    /// Where job logs land; Desktop, then home, then temp when unset.
    pub report_dir: Option<PathBuf>,
    pub diskpart: PathBuf,
    pub powershell: PathBuf,
    /// Scratch directory for interpreter scripts; OS temp dir when unset.
    pub script_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LoggingLevel::Info,
            log_to_disk: true,
            log_dir: None,
            report_dir: None,
            diskpart: PathBuf::from("diskpart.exe"),
            powershell: PathBuf::from("powershell.exe"),
            script_dir: None,
        }
    }
}

impl Config {
    /// Load from `explicit`, then `$SAFE_FORMAT_CONFIG`, then the per-user
    /// default location. Only a missing default file falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(default_report_dir)
    }

    pub fn script_dir(&self) -> PathBuf {
        self.script_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

fn default_config_path() -> Option<PathBuf> {
    if cfg!(windows) {
        return std::env::var_os("APPDATA")
            .map(|appdata| PathBuf::from(appdata).join("SafeFormatter").join("config.toml"));
    }

    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("safe-format").join("config.toml"));
    }

    home_dir().map(|home| home.join(".config").join("safe-format").join("config.toml"))
}

fn default_report_dir() -> PathBuf {
    let Some(home) = home_dir() else {
        return std::env::temp_dir();
    };

    let desktop = home.join("Desktop");
    if desktop.is_dir() { desktop } else { home }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("safe-format-config-{}.toml", Uuid::new_v4().simple()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let path = write_temp(
            r#"
log_level = "debug"
report_dir = "D:\\Reports"
"#,
        );

        let config = Config::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.log_level, LoggingLevel::Debug);
        assert_eq!(config.report_dir(), PathBuf::from(r"D:\Reports"));
        assert!(config.log_to_disk);
        assert_eq!(config.diskpart, PathBuf::from("diskpart.exe"));
        assert_eq!(config.powershell, PathBuf::from("powershell.exe"));
        assert_eq!(config.script_dir(), std::env::temp_dir());
    }

    #[test]
    fn unknown_level_is_rejected() {
        let path = write_temp("log_level = \"loud\"\n");
        let result = Config::from_file(&path);
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("parse config"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("safe-format-missing-{}.toml", Uuid::new_v4().simple()));
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn level_directives() {
        assert_eq!(LoggingLevel::default().as_directive(), "info");
        assert_eq!(LoggingLevel::Trace.as_directive(), "trace");
    }
}
