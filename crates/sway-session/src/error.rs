//! Error types for saving and loading profiles

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::sway_ipc::SwayError;

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("No saved profiles in {dir}")]
    #[diagnostic(code(sway_session::no_profiles))]
    NoProfiles { dir: PathBuf },

    #[error("Workspace mapping for profile '{profile}' not found at {path}")]
    #[diagnostic(code(sway_session::mapping_not_found))]
    MappingNotFound { profile: String, path: PathBuf },

    #[error("Window tree for profile '{profile}' not found at {path}")]
    #[diagnostic(code(sway_session::tree_not_found))]
    TreeNotFound { profile: String, path: PathBuf },

    #[error("Profile artifact {path} is corrupt")]
    #[diagnostic(code(sway_session::corrupt))]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error on {path}")]
    #[diagnostic(code(sway_session::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compositor IPC failed")]
    #[diagnostic(code(sway_session::ipc))]
    Ipc(#[from] SwayError),
}

impl SessionError {
    /// Desktop notification for failures the user is told about
    ///
    /// Returns `None` for failures that are only reported on the terminal.
    pub fn notification(&self) -> Option<(&'static str, String)> {
        match self {
            Self::NoProfiles { .. } => Some(("No profiles to load", "Exiting".to_string())),
            Self::MappingNotFound { profile, .. } => {
                Some(("Can't find this mapping", profile.clone()))
            }
            Self::TreeNotFound { profile, .. } => Some(("Can't find this tree", profile.clone())),
            _ => None,
        }
    }
}
