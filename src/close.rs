//! Close frame payloads and status codes (RFC 6455 Section 7).
//!
//! A close payload is either empty or a 2-byte big-endian status code
//! followed by at most 123 bytes of UTF-8 reason text. Which codes may
//! appear where is protocol-defined (RFC 6455 Section 7.4) and taken here
//! as a fixed table: codes below 1000 plus 1004, 1005, 1006 and 1015 are
//! never valid on the wire, and 1005 is synthesized locally when the peer
//! sent no status at all.

use crate::validator::StreamingUtf8Validator;
use bytes::{BufMut, Bytes, BytesMut};

/// Close codes defined by RFC 6455.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure (1000).
    Normal = 1000,
    /// Going away (1001).
    GoingAway = 1001,
    /// Protocol error (1002).
    ProtocolError = 1002,
    /// Unsupported data type (1003).
    Unsupported = 1003,
    /// Reserved (1004).
    Reserved = 1004,
    /// No status received (1005) - must not be sent in a frame.
    NoStatusReceived = 1005,
    /// Abnormal closure (1006) - must not be sent in a frame.
    Abnormal = 1006,
    /// Invalid payload data (1007).
    InvalidPayload = 1007,
    /// Policy violation (1008).
    PolicyViolation = 1008,
    /// Message too big (1009).
    MessageTooBig = 1009,
    /// Mandatory extension missing (1010).
    MandatoryExtension = 1010,
    /// Internal server error (1011).
    InternalError = 1011,
    /// TLS handshake failure (1015) - must not be sent in a frame.
    TlsHandshake = 1015,
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code as Self
    }
}

/// Maximum length of a close reason in bytes (125-byte control payload
/// minus the 2-byte status code).
pub const MAX_CLOSE_REASON_LENGTH: usize = 123;

/// Returns true if `code` may be passed to
/// [`start_closing_handshake`](crate::channel::WebSocketChannel::start_closing_handshake)
/// by the local caller.
///
/// Valid ranges per RFC 6455 Section 7.4:
/// - 1000-1003, 1007-1011: standard codes an endpoint may originate
/// - 3000-3999: registered (IANA)
/// - 4000-4999: private use
#[must_use]
pub const fn is_valid_user_code(code: u16) -> bool {
    matches!(code, 1000..=1003 | 1007..=1011 | 3000..=4999)
}

/// Returns true if `code` must never appear in a close frame on the wire.
///
/// Codes below 1000 are out of range, 1004 is reserved, and 1005 / 1006 /
/// 1015 are defined only for local reporting.
#[must_use]
pub const fn is_reserved_on_wire(code: u16) -> bool {
    matches!(code, 0..=999 | 1004 | 1005 | 1006 | 1015)
}

/// A successfully parsed close frame payload.
///
/// An absent or empty payload synthesizes status 1005 ("No Status
/// Received") with an empty reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosePayload {
    /// Close status code.
    pub code: u16,
    /// Close reason text (empty if absent).
    pub reason: String,
}

impl ClosePayload {
    /// Creates a close payload from a code and reason.
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Parses a received close frame body.
    ///
    /// # Errors
    ///
    /// Fails when the body is exactly one byte, when the status code is in
    /// the reserved-on-wire set, or when the reason is not valid UTF-8.
    pub fn parse(payload: &[u8]) -> Result<Self, CloseParseError> {
        match payload.len() {
            0 => Ok(Self::from_code(CloseCode::NoStatusReceived, "")),
            1 => Err(CloseParseError::InvalidSizeBody),
            _ => {
                let code = u16::from_be_bytes([payload[0], payload[1]]);
                if is_reserved_on_wire(code) {
                    return Err(CloseParseError::ReservedCode(code));
                }
                if !StreamingUtf8Validator::validate(&payload[2..]) {
                    return Err(CloseParseError::InvalidUtf8);
                }
                // Validated above.
                let reason = String::from_utf8_lossy(&payload[2..]).into_owned();
                Ok(Self { code, reason })
            }
        }
    }

    /// Encodes this payload as a close frame body.
    ///
    /// Status 1005 must never appear on the wire; it encodes as an empty
    /// body, which the peer will in turn read back as "no status".
    #[must_use]
    pub fn encode(&self) -> Bytes {
        if self.code == u16::from(CloseCode::NoStatusReceived) {
            return Bytes::new();
        }
        let mut buf = BytesMut::with_capacity(2 + self.reason.len());
        buf.put_u16(self.code);
        buf.put_slice(self.reason.as_bytes());
        buf.freeze()
    }
}

impl ClosePayload {
    /// Creates a close payload from a well-known code.
    #[must_use]
    pub fn from_code(code: CloseCode, reason: impl Into<String>) -> Self {
        Self::new(u16::from(code), reason)
    }
}

/// Ways a received close frame body can be malformed.
///
/// Each variant maps to the channel-failure diagnostic the consumer sees
/// and the reason text written in the responding close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseParseError {
    /// The body was exactly one byte; a valid body is empty or >= 2 bytes.
    InvalidSizeBody,
    /// The status code is in the reserved-on-wire set.
    ReservedCode(u16),
    /// The reason text is not valid UTF-8.
    InvalidUtf8,
}

impl CloseParseError {
    /// The diagnostic reported through `on_fail_channel`.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidSizeBody => {
                "Received a broken close frame containing an invalid size body."
            }
            Self::ReservedCode(_) => {
                "Received a broken close frame containing a reserved status code."
            }
            Self::InvalidUtf8 => "Received a broken close frame containing invalid UTF-8.",
        }
    }

    /// The reason text for the protocol-error close frame sent in response.
    #[must_use]
    pub const fn response_reason(self) -> &'static str {
        match self {
            Self::InvalidUtf8 => "Invalid UTF-8 in Close frame",
            Self::InvalidSizeBody | Self::ReservedCode(_) => "",
        }
    }
}

impl std::fmt::Display for CloseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CloseParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_synthesizes_1005() {
        let parsed = ClosePayload::parse(&[]).unwrap();
        assert_eq!(parsed.code, 1005);
        assert_eq!(parsed.reason, "");
    }

    #[test]
    fn parse_code_only() {
        let parsed = ClosePayload::parse(&1000u16.to_be_bytes()).unwrap();
        assert_eq!(parsed.code, 1000);
        assert_eq!(parsed.reason, "");
    }

    #[test]
    fn parse_code_and_reason() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1001u16.to_be_bytes());
        payload.extend_from_slice(b"Going away");

        let parsed = ClosePayload::parse(&payload).unwrap();
        assert_eq!(parsed.code, 1001);
        assert_eq!(parsed.reason, "Going away");
    }

    #[test]
    fn parse_one_byte_body_is_invalid() {
        let result = ClosePayload::parse(&[0x03]);
        assert_eq!(result, Err(CloseParseError::InvalidSizeBody));
    }

    #[test]
    fn parse_reserved_codes_rejected() {
        for code in [999u16, 0, 1004, 1005, 1006, 1015] {
            let result = ClosePayload::parse(&code.to_be_bytes());
            assert_eq!(result, Err(CloseParseError::ReservedCode(code)), "{code}");
        }
    }

    #[test]
    fn parse_unknown_but_legal_codes_accepted() {
        for code in [1012u16, 2999, 3000, 4999, 5000] {
            let parsed = ClosePayload::parse(&code.to_be_bytes()).unwrap();
            assert_eq!(parsed.code, code);
        }
    }

    #[test]
    fn parse_invalid_utf8_reason_rejected() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1000u16.to_be_bytes());
        payload.push(0xFF);

        let result = ClosePayload::parse(&payload);
        assert_eq!(result, Err(CloseParseError::InvalidUtf8));
        assert_eq!(
            result.unwrap_err().response_reason(),
            "Invalid UTF-8 in Close frame"
        );
    }

    #[test]
    fn encode_code_and_reason() {
        let encoded = ClosePayload::new(1000, "goodbye").encode();
        assert_eq!(&encoded[..2], &1000u16.to_be_bytes());
        assert_eq!(&encoded[2..], b"goodbye");
    }

    #[test]
    fn encode_1005_is_empty() {
        let encoded = ClosePayload::from_code(CloseCode::NoStatusReceived, "").encode();
        assert!(encoded.is_empty());
    }

    #[test]
    fn roundtrip() {
        let original = ClosePayload::new(4000, "app specific");
        let parsed = ClosePayload::parse(&original.encode()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn user_code_table() {
        assert!(is_valid_user_code(1000));
        assert!(is_valid_user_code(1003));
        assert!(is_valid_user_code(1007));
        assert!(is_valid_user_code(1011));
        assert!(is_valid_user_code(3000));
        assert!(is_valid_user_code(4999));

        assert!(!is_valid_user_code(999));
        assert!(!is_valid_user_code(1004));
        assert!(!is_valid_user_code(1005));
        assert!(!is_valid_user_code(1006));
        assert!(!is_valid_user_code(1015));
        assert!(!is_valid_user_code(2999));
        assert!(!is_valid_user_code(5000));
    }

    #[test]
    fn wire_code_table() {
        assert!(is_reserved_on_wire(0));
        assert!(is_reserved_on_wire(999));
        assert!(is_reserved_on_wire(1004));
        assert!(is_reserved_on_wire(1005));
        assert!(is_reserved_on_wire(1006));
        assert!(is_reserved_on_wire(1015));

        assert!(!is_reserved_on_wire(1000));
        assert!(!is_reserved_on_wire(1012));
        assert!(!is_reserved_on_wire(3000));
        assert!(!is_reserved_on_wire(4999));
    }
}
