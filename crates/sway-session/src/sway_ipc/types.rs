//! Wire-level types for the i3-ipc protocol

use serde::Deserialize;

/// Magic string opening every i3-ipc frame
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// Size of the frame header: magic, payload length, message type
pub const HEADER_LEN: usize = MAGIC.len() + 8;

/// Request types used by sway-session
///
/// Replies carry the same type as the request they answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    GetOutputs = 3,
    GetTree = 4,
}

impl MessageType {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Result of a single command in a RUN_COMMAND reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Encode a request frame
pub fn encode_frame(message_type: MessageType, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    frame.extend_from_slice(&message_type.code().to_ne_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Decode a frame header into (payload length, message type)
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(usize, u32), String> {
    if &header[..MAGIC.len()] != MAGIC {
        return Err(format!(
            "bad magic {:?}",
            String::from_utf8_lossy(&header[..MAGIC.len()])
        ));
    }
    let mut len = [0u8; 4];
    len.copy_from_slice(&header[6..10]);
    let mut kind = [0u8; 4];
    kind.copy_from_slice(&header[10..14]);
    Ok((u32::from_ne_bytes(len) as usize, u32::from_ne_bytes(kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode_frame(MessageType::RunCommand, b"split h");

        assert_eq!(&frame[..6], b"i3-ipc");
        assert_eq!(frame.len(), HEADER_LEN + 7);
        assert_eq!(&frame[HEADER_LEN..], b"split h");

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&frame[..HEADER_LEN]);
        assert_eq!(decode_header(&header), Ok((7, 0)));
    }

    #[test]
    fn test_decode_header_rejects_bad_magic() {
        let mut header = [0u8; HEADER_LEN];
        header[..6].copy_from_slice(b"xx-ipc");

        let err = decode_header(&header).unwrap_err();
        assert!(err.contains("bad magic"), "unexpected error: {}", err);
    }

    #[test]
    fn test_empty_payload_for_queries() {
        let frame = encode_frame(MessageType::GetTree, &[]);
        assert_eq!(frame.len(), HEADER_LEN);

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&frame);
        assert_eq!(decode_header(&header), Ok((0, 4)));
    }

    #[test]
    fn test_command_outcome_parses_failure() {
        let outcomes: Vec<CommandOutcome> = serde_json::from_str(
            r#"[{"success":true},{"success":false,"parse_error":true,"error":"Unknown command"}]"#,
        )
        .unwrap();

        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert_eq!(outcomes[1].error.as_deref(), Some("Unknown command"));
    }
}
