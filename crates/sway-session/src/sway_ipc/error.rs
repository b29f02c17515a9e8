//! Error types for sway IPC operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when communicating with the compositor
#[derive(Debug, Error)]
pub enum SwayError {
    /// Neither SWAYSOCK nor I3SOCK is set
    #[error("SWAYSOCK/I3SOCK environment variable not set - is sway running?")]
    SocketNotSet,

    /// The socket path does not exist
    #[error("Sway socket not found at {path}")]
    SocketNotFound { path: PathBuf },

    /// Failed to connect to the socket
    #[error("Failed to connect to sway socket at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to send request to the compositor
    #[error("Failed to send request to sway: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Failed to receive response from the compositor
    #[error("Failed to receive response from sway: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Failed to deserialize response from JSON
    #[error("Failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// The reply did not follow the i3-ipc framing
    #[error("Malformed IPC reply: {message}")]
    Protocol { message: String },

    /// Connection was closed unexpectedly
    #[error("Connection to sway closed unexpectedly")]
    ConnectionClosed,
}
