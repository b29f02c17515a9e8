//! KDL configuration parser

use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::*;

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a configuration file, falling back to defaults when it does not exist
///
/// The configuration file is optional: a missing file is not an error, but an
/// unreadable or malformed one is.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    parse_config(path)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl uses an older miette version, so we need to extract offset/len manually
        let offset = e.span.offset();
        let len = e.span.len();
        let span = miette::SourceSpan::from((offset, len));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "global" => {
                config.global = parse_global(node)?;
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

fn parse_global(node: &kdl::KdlNode) -> Result<GlobalConfig, ConfigError> {
    let mut global = GlobalConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let option = child.name().value();
            match option {
                "log-level" => {
                    if let Some(val) = string_arg(child)? {
                        global.log_level = val
                            .parse()
                            .map_err(|message| ConfigError::Invalid { message })?;
                    }
                }
                "profile-dir" => {
                    if let Some(val) = string_arg(child)? {
                        global.profile_dir = shellexpand::tilde(val).into_owned().into();
                    }
                }
                "file-prefix" => {
                    if let Some(val) = string_arg(child)? {
                        if val.contains('/') {
                            return Err(ConfigError::Invalid {
                                message: format!("file-prefix must not contain '/': {}", val),
                            });
                        }
                        global.file_prefix = val.to_string();
                    }
                }
                "startup-delay-ms" => {
                    if let Some(entry) = child.entries().first() {
                        let millis = entry
                            .value()
                            .as_i64()
                            .and_then(|v| u64::try_from(v).ok())
                            .ok_or_else(|| ConfigError::Invalid {
                                message: format!(
                                    "startup-delay-ms expects a non-negative integer, got {}",
                                    entry.value()
                                ),
                            })?;
                        global.startup_delay = Duration::from_millis(millis);
                    }
                }
                "notifier" => {
                    if let Some(val) = string_arg(child)? {
                        global.notifier = val
                            .parse()
                            .map_err(|message| ConfigError::Invalid { message })?;
                    }
                }
                "app-name" => {
                    if let Some(val) = string_arg(child)? {
                        global.app_name = val.to_string();
                    }
                }
                name => {
                    tracing::warn!("Unknown global config option: {}", name);
                }
            }
        }
    }

    Ok(global)
}

/// First argument of a node, which must be a string when present
fn string_arg(node: &kdl::KdlNode) -> Result<Option<&str>, ConfigError> {
    match node.entries().first() {
        None => Ok(None),
        Some(entry) => entry.value().as_string().map(Some).ok_or_else(|| {
            ConfigError::Invalid {
                message: format!(
                    "{} expects a string, got {}",
                    node.name().value(),
                    entry.value()
                ),
            }
        }),
    }
}
