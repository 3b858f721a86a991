//! Consumer boundary produced by the channel.
//!
//! The [`EventSink`] receives channel-level events in frame arrival order
//! and reports back-pressure through
//! [`has_pending_data_frames`](EventSink::has_pending_data_frames). It is
//! exclusively owned by one channel. Terminal events
//! ([`on_fail_channel`](EventSink::on_fail_channel) /
//! [`on_drop_channel`](EventSink::on_drop_channel)) are emitted at most
//! once per connection; nothing follows them.

use crate::stream::SocketError;
use bytes::Bytes;

/// Type tag delivered with each relayed data frame.
///
/// The first frame forwarded for a message carries the message's type;
/// every later frame of the same message carries
/// [`MessageKind::Continuation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Continuation of the current message.
    Continuation,
    /// First frame of a text message.
    Text,
    /// First frame of a binary message.
    Binary,
}

/// Opening-handshake request details, relayed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequestInfo {
    /// The URL the request was sent to.
    pub url: String,
    /// Request headers as sent.
    pub headers: Vec<(String, String)>,
}

/// Opening-handshake response details, relayed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeResponseInfo {
    /// The URL the response came from.
    pub url: String,
    /// HTTP status code of the upgrade response.
    pub status_code: u16,
    /// Response headers as received.
    pub headers: Vec<(String, String)>,
}

/// TLS certificate problem reported during connection setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslErrorInfo {
    /// The URL being connected to.
    pub url: String,
    /// The underlying error.
    pub error: SocketError,
    /// True if the error cannot be overridden by the user.
    pub fatal: bool,
}

/// HTTP authentication challenge received during connection setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    /// True when the challenge came from a proxy.
    pub is_proxy: bool,
    /// Origin of the challenge.
    pub origin: String,
    /// Authentication scheme (e.g. "basic").
    pub scheme: String,
    /// Protection space.
    pub realm: String,
}

/// Credentials supplied in response to an [`AuthChallenge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Receiver of channel-level events.
pub trait EventSink {
    /// The opening handshake succeeded. Emitted once, with the negotiated
    /// subprotocol and extensions queried from the stream.
    fn on_add_channel_response(
        &mut self,
        response: HandshakeResponseInfo,
        selected_protocol: String,
        extensions: String,
    );

    /// One validated data frame of a message, in order. `final_` marks the
    /// last frame of the message.
    fn on_data_frame(&mut self, final_: bool, kind: MessageKind, payload: Bytes);

    /// Back-pressure probe: while this returns true the channel stops
    /// pulling from the transport. The consumer resumes delivery by calling
    /// [`WebSocketChannel::read_frames`](crate::channel::WebSocketChannel::read_frames)
    /// once drained.
    fn has_pending_data_frames(&mut self) -> bool;

    /// An outbound write fully drained the send queue.
    fn on_send_data_frame_done(&mut self);

    /// The peer initiated the closing handshake.
    fn on_closing_handshake(&mut self);

    /// Terminal: the channel failed with a protocol or validation error.
    fn on_fail_channel(&mut self, message: String, error: SocketError, response_code: Option<u16>);

    /// Terminal: the connection ended. `was_clean` is true only when the
    /// closing handshake fully completed.
    fn on_drop_channel(&mut self, was_clean: bool, code: u16, reason: String);

    /// Connection-setup passthrough: the opening handshake request was sent.
    fn on_start_opening_handshake(&mut self, request: HandshakeRequestInfo);

    /// Connection-setup passthrough: a TLS certificate error occurred.
    fn on_ssl_certificate_error(&mut self, info: SslErrorInfo);

    /// Connection-setup passthrough: the server demanded authentication.
    /// Returns credentials to retry with, or `None` to give up.
    fn on_auth_required(&mut self, challenge: AuthChallenge) -> Option<AuthCredentials>;
}
