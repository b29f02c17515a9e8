//! Configuration data model

use std::path::PathBuf;
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/sway-session/config.kdl";

/// Root configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
}

/// Global settings
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
    /// Directory holding the profile artifacts
    pub profile_dir: PathBuf,
    /// File name prefix shared by every artifact in `profile_dir`
    pub file_prefix: String,
    /// Fixed wait before the first compositor query
    pub startup_delay: Duration,
    /// Preferred notification backend
    pub notifier: NotifierPreference,
    /// Application name reported to the notification daemon
    pub app_name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            profile_dir: shellexpand::tilde("~/.config/i3").into_owned().into(),
            file_prefix: "workspace_".to_string(),
            startup_delay: Duration::from_millis(2000),
            notifier: NotifierPreference::Dunstify,
            app_name: "sway-workspaces".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Which notification backend to try first
///
/// The other backend is used as a fallback when the preferred executable is
/// missing. `None` disables desktop notifications entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifierPreference {
    #[default]
    Dunstify,
    NotifySend,
    None,
}

impl std::str::FromStr for NotifierPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dunstify" => Ok(Self::Dunstify),
            "notify-send" => Ok(Self::NotifySend),
            "none" | "off" => Ok(Self::None),
            _ => Err(format!("Unknown notifier: {}", s)),
        }
    }
}
