//! Sway IPC client implementation
//!
//! This module provides the `SwayClient` for communicating with the compositor.
//! The client handles socket discovery, connection management, and the framed
//! JSON protocol.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};

use super::types::{decode_header, encode_frame, CommandOutcome, MessageType, HEADER_LEN};
use super::SwayError;
use crate::tree::{Output, Tree, Workspace};

/// Environment variable naming the sway socket
const SWAY_SOCKET_ENV: &str = "SWAYSOCK";

/// Environment variable naming the i3 socket, used when SWAYSOCK is unset
const I3_SOCKET_ENV: &str = "I3SOCK";

/// Discover the IPC socket path from the environment
///
/// Reads `$SWAYSOCK`, falling back to `$I3SOCK`, and validates that the path
/// exists.
///
/// # Errors
///
/// Returns `SwayError::SocketNotSet` if neither variable is set.
/// Returns `SwayError::SocketNotFound` if the path doesn't exist.
pub fn get_socket_path() -> Result<PathBuf, SwayError> {
    let socket_path_str = std::env::var(SWAY_SOCKET_ENV)
        .or_else(|_| std::env::var(I3_SOCKET_ENV))
        .map_err(|_| SwayError::SocketNotSet)?;

    let socket_path = PathBuf::from(&socket_path_str);

    if !socket_path.exists() {
        return Err(SwayError::SocketNotFound { path: socket_path });
    }

    Ok(socket_path)
}

/// What the session engine needs from a running compositor
///
/// Requests are issued one at a time; every call completes before the next
/// one starts.
#[allow(async_fn_in_trait)]
pub trait Compositor {
    /// Snapshot of the full window tree
    async fn get_tree(&mut self) -> Result<Tree, SwayError>;

    /// Current workspaces with the connector name of their output
    async fn get_workspaces(&mut self) -> Result<Vec<Workspace>, SwayError>;

    /// Current outputs
    async fn get_outputs(&mut self) -> Result<Vec<Output>, SwayError>;

    /// Run an imperative command
    ///
    /// A command the compositor rejects is logged, not returned as an error.
    async fn run_command(&mut self, command: &str) -> Result<(), SwayError>;

    /// Run a command against a single container
    async fn run_node_command(&mut self, node_id: i64, command: &str) -> Result<(), SwayError> {
        self.run_command(&format!("[con_id={}] {}", node_id, command))
            .await
    }
}

/// Client for communicating with sway (or i3) via IPC
///
/// # Example
///
/// ```ignore
/// let mut client = SwayClient::connect().await?;
/// let tree = client.get_tree().await?;
/// ```
#[derive(Debug)]
pub struct SwayClient {
    socket: UnixStream,
    socket_path: PathBuf,
}

impl SwayClient {
    /// Connect to the compositor's IPC socket
    ///
    /// There is no retry: callers that start alongside the compositor are
    /// expected to wait before connecting.
    ///
    /// # Errors
    ///
    /// Returns `SwayError::SocketNotSet` if no socket variable is set.
    /// Returns `SwayError::SocketNotFound` if the socket path doesn't exist.
    /// Returns `SwayError::ConnectionFailed` if the connection fails.
    pub async fn connect() -> Result<Self, SwayError> {
        let socket_path = get_socket_path()?;

        let socket = UnixStream::connect(&socket_path)
            .await
            .map_err(|e| SwayError::ConnectionFailed {
                path: socket_path.clone(),
                source: e,
            })?;

        debug!(path = %socket_path.display(), "Connected to sway IPC");

        Ok(Self {
            socket,
            socket_path,
        })
    }

    /// Path of the socket this client is connected to
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send one framed message and read the matching reply payload
    ///
    /// # Errors
    ///
    /// Returns `SwayError::SendFailed` if writing to the socket fails.
    /// Returns `SwayError::ConnectionClosed` if the socket closes mid-reply.
    /// Returns `SwayError::ReceiveFailed` for any other read failure.
    /// Returns `SwayError::Protocol` if the reply framing or type is wrong.
    pub async fn send_message(
        &mut self,
        message_type: MessageType,
        payload: &[u8],
    ) -> Result<Vec<u8>, SwayError> {
        let frame = encode_frame(message_type, payload);
        self.socket
            .write_all(&frame)
            .await
            .map_err(SwayError::SendFailed)?;
        self.socket.flush().await.map_err(SwayError::SendFailed)?;

        let mut header = [0u8; HEADER_LEN];
        self.read_exact(&mut header).await?;

        let (len, reply_type) =
            decode_header(&header).map_err(|message| SwayError::Protocol { message })?;
        if reply_type != message_type.code() {
            return Err(SwayError::Protocol {
                message: format!(
                    "expected reply type {}, got {}",
                    message_type.code(),
                    reply_type
                ),
            });
        }

        let mut body = vec![0u8; len];
        self.read_exact(&mut body).await?;
        Ok(body)
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SwayError> {
        match self.socket.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(SwayError::ConnectionClosed)
            }
            Err(e) => Err(SwayError::ReceiveFailed(e)),
        }
    }

    async fn query<T: DeserializeOwned>(
        &mut self,
        message_type: MessageType,
    ) -> Result<T, SwayError> {
        let body = self.send_message(message_type, &[]).await?;
        serde_json::from_slice(&body).map_err(SwayError::DeserializeFailed)
    }
}

impl Compositor for SwayClient {
    async fn get_tree(&mut self) -> Result<Tree, SwayError> {
        self.query(MessageType::GetTree).await
    }

    async fn get_workspaces(&mut self) -> Result<Vec<Workspace>, SwayError> {
        self.query(MessageType::GetWorkspaces).await
    }

    async fn get_outputs(&mut self) -> Result<Vec<Output>, SwayError> {
        self.query(MessageType::GetOutputs).await
    }

    async fn run_command(&mut self, command: &str) -> Result<(), SwayError> {
        debug!(command, "Running sway command");
        let body = self
            .send_message(MessageType::RunCommand, command.as_bytes())
            .await?;
        let outcomes: Vec<CommandOutcome> =
            serde_json::from_slice(&body).map_err(SwayError::DeserializeFailed)?;

        for outcome in outcomes.iter().filter(|o| !o.success) {
            warn!(
                command,
                error = outcome.error.as_deref().unwrap_or("unknown error"),
                "Sway rejected command"
            );
        }
        Ok(())
    }
}
