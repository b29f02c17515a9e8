//! Configuration parsing for sway-session
//!
//! This crate handles parsing the optional KDL configuration file that tunes
//! where profiles are stored, how long to wait for the compositor, and which
//! notification backend to prefer.

mod error;
mod model;
mod parser;

pub use error::ConfigError;
pub use model::*;
pub use parser::{load_config, parse_config, parse_config_str};
