//! The WebSocket channel state machine.
//!
//! [`WebSocketChannel`] drives one logical connection end-to-end once the
//! opening handshake has completed: it pulls deframed frames from the
//! [`Stream`], enforces the RFC 6455 framing invariants, relays validated
//! data-frame payloads to the [`EventSink`], answers control frames, and
//! manages teardown through the closing handshake and its two timeouts.
//!
//! # Connection states
//!
//! ```text
//! Fresh -> Connecting -> Connected -+-> SendClosed -+-> CloseWait -> Closed
//!                                   |               |
//!                                   +-> RecvClosed -+
//! ```
//!
//! No Close sent and none received: `Connected`. Close sent, not yet
//! received: `SendClosed`. Close received, response pending: `RecvClosed`
//! (transient, the response is written in the same call). Both directions
//! closed: `CloseWait`, waiting for the transport to actually close.
//!
//! # The `Deleted` convention
//!
//! Every public entry point returns [`ChannelState`]. `Deleted` means the
//! call triggered connection failure and the owner must drop its channel;
//! completions arriving after that point are ignored. This replaces the
//! original design's self-deleting object with an explicit ownership
//! hand-back.

use crate::close::{self, CloseCode, ClosePayload, MAX_CLOSE_REASON_LENGTH};
use crate::event::{
    AuthChallenge, AuthCredentials, EventSink, HandshakeRequestInfo, HandshakeResponseInfo,
    MessageKind, SslErrorInfo,
};
use crate::frame::{Frame, Opcode};
use crate::stream::{SocketError, Stream, StreamIo};
use crate::time::{OneShotTimer, SharedTimeSource};
use crate::validator::{StreamingUtf8Validator, Utf8State};
use bytes::Bytes;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Liveness reported by every public channel entry point.
#[must_use = "a Deleted channel must be dropped by the caller"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// The channel survived the call.
    Alive,
    /// The call triggered connection failure; drop the channel.
    Deleted,
}

/// Timeout configuration for the closing handshake.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Time allowed between sending/receiving a Close and the peer's Close
    /// arriving.
    pub closing_handshake_timeout: Duration,
    /// Time allowed for the transport to report closure once both Close
    /// frames have been exchanged.
    pub underlying_close_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            closing_handshake_timeout: Duration::from_secs(10),
            underlying_close_timeout: Duration::from_secs(2),
        }
    }
}

impl ChannelConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the closing-handshake timeout.
    #[must_use]
    pub fn closing_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.closing_handshake_timeout = timeout;
        self
    }

    /// Sets the underlying-connection-close timeout.
    #[must_use]
    pub fn underlying_close_timeout(mut self, timeout: Duration) -> Self {
        self.underlying_close_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Connecting,
    Connected,
    SendClosed,
    RecvClosed,
    CloseWait,
    Closed,
}

/// Outbound frames not yet handed to the stream.
///
/// At most one `write_frames` call is outstanding at a time; frames
/// submitted while one is in flight are queued in submission order and
/// flushed as a single batch when it completes.
#[derive(Debug, Default)]
struct SendQueue {
    in_flight: bool,
    queued: Vec<Frame>,
}

/// One WebSocket connection's channel-level protocol logic.
pub struct WebSocketChannel {
    events: Box<dyn EventSink>,
    stream: Option<Box<dyn Stream>>,
    clock: SharedTimeSource,
    state: State,

    // Read side.
    read_pending: bool,
    held_frames: VecDeque<Frame>,
    incoming_kind: Option<MessageKind>,
    initial_frame_forwarded: bool,
    inbound_validator: StreamingUtf8Validator,

    // Write side.
    send_queue: SendQueue,
    outbound_open: bool,
    outbound_text: bool,
    outbound_validator: StreamingUtf8Validator,

    // Closing handshake.
    has_received_close: bool,
    received_close: ClosePayload,
    closing_handshake_timeout: Duration,
    underlying_close_timeout: Duration,
    closing_timer: OneShotTimer,
    underlying_timer: OneShotTimer,
    terminal_event_sent: bool,
}

impl WebSocketChannel {
    /// Creates a channel with default timeouts.
    #[must_use]
    pub fn new(events: Box<dyn EventSink>, clock: SharedTimeSource) -> Self {
        Self::with_config(events, clock, ChannelConfig::default())
    }

    /// Creates a channel with explicit timeout configuration.
    #[must_use]
    pub fn with_config(
        events: Box<dyn EventSink>,
        clock: SharedTimeSource,
        config: ChannelConfig,
    ) -> Self {
        Self {
            events,
            stream: None,
            clock,
            state: State::Fresh,
            read_pending: false,
            held_frames: VecDeque::new(),
            incoming_kind: None,
            initial_frame_forwarded: false,
            inbound_validator: StreamingUtf8Validator::new(),
            send_queue: SendQueue::default(),
            outbound_open: false,
            outbound_text: false,
            outbound_validator: StreamingUtf8Validator::new(),
            has_received_close: false,
            received_close: ClosePayload::from_code(CloseCode::NoStatusReceived, ""),
            closing_handshake_timeout: config.closing_handshake_timeout,
            underlying_close_timeout: config.underlying_close_timeout,
            closing_timer: OneShotTimer::new(),
            underlying_timer: OneShotTimer::new(),
            terminal_event_sent: false,
        }
    }

    /// Overrides the closing-handshake timeout. Takes effect the next time
    /// the timer is armed.
    pub fn set_closing_handshake_timeout(&mut self, timeout: Duration) {
        self.closing_handshake_timeout = timeout;
    }

    /// Overrides the underlying-connection-close timeout. Takes effect the
    /// next time the timer is armed.
    pub fn set_underlying_close_timeout(&mut self, timeout: Duration) {
        self.underlying_close_timeout = timeout;
    }

    /// Marks the opening handshake as started. The owner drives the
    /// handshake itself and reports the outcome through
    /// [`on_connect_success`](Self::on_connect_success) or
    /// [`on_connect_failure`](Self::on_connect_failure).
    pub fn start_connecting(&mut self) {
        debug_assert_eq!(self.state, State::Fresh);
        self.state = State::Connecting;
    }

    /// Connection-setup passthrough: the handshake request went out.
    pub fn on_start_opening_handshake(&mut self, request: HandshakeRequestInfo) -> ChannelState {
        self.events.on_start_opening_handshake(request);
        self.liveness()
    }

    /// Connection-setup passthrough: TLS certificate problem.
    pub fn on_ssl_certificate_error(&mut self, info: SslErrorInfo) -> ChannelState {
        self.events.on_ssl_certificate_error(info);
        self.liveness()
    }

    /// Connection-setup passthrough: authentication challenge. Returns the
    /// sink's credentials unaltered.
    pub fn on_auth_required(&mut self, challenge: AuthChallenge) -> Option<AuthCredentials> {
        self.events.on_auth_required(challenge)
    }

    /// The opening handshake succeeded: takes ownership of the live stream,
    /// queries its negotiated subprotocol and extensions once, and reports
    /// the response to the sink. The owner starts the read loop by calling
    /// [`read_frames`](Self::read_frames).
    pub fn on_connect_success(
        &mut self,
        stream: Box<dyn Stream>,
        response: HandshakeResponseInfo,
    ) -> ChannelState {
        debug_assert!(matches!(self.state, State::Fresh | State::Connecting));
        let selected_protocol = stream.sub_protocol().to_owned();
        let extensions = stream.extensions().to_owned();
        self.stream = Some(stream);
        self.state = State::Connected;
        debug!(protocol = %selected_protocol, %extensions, "connection established");
        self.events
            .on_add_channel_response(response, selected_protocol, extensions);
        ChannelState::Alive
    }

    /// The opening handshake failed. Terminal.
    pub fn on_connect_failure(
        &mut self,
        message: String,
        error: SocketError,
        response_code: Option<u16>,
    ) -> ChannelState {
        debug_assert!(matches!(self.state, State::Fresh | State::Connecting));
        self.state = State::Closed;
        self.emit_fail(message, error, response_code);
        ChannelState::Deleted
    }

    /// Pulls frames from the stream and routes them until the stream has
    /// nothing more (pending), the consumer reports back-pressure, or the
    /// channel dies. The consumer calls this again after draining its
    /// pending data frames.
    pub fn read_frames(&mut self) -> ChannelState {
        if self.state == State::Closed {
            return ChannelState::Deleted;
        }
        if self.read_pending {
            return ChannelState::Alive;
        }
        loop {
            if self.events.has_pending_data_frames() {
                trace!("consumer has pending data frames, not reading");
                return ChannelState::Alive;
            }
            if let Some(frame) = self.held_frames.pop_front() {
                if self.handle_frame(frame) == ChannelState::Deleted {
                    return ChannelState::Deleted;
                }
                continue;
            }
            if !matches!(
                self.state,
                State::Connected | State::SendClosed | State::CloseWait
            ) {
                return ChannelState::Alive;
            }
            let read_result = match self.stream.as_mut() {
                Some(stream) => stream.read_frames(),
                None => return ChannelState::Alive,
            };
            match read_result {
                StreamIo::Pending => {
                    self.read_pending = true;
                    return ChannelState::Alive;
                }
                StreamIo::Ready(Ok(frames)) => self.held_frames.extend(frames),
                StreamIo::Ready(Err(error)) => return self.handle_read_error(error),
            }
        }
    }

    /// Completion of a pending [`Stream::read_frames`] call. Stale
    /// completions for an already-dead channel are ignored.
    pub fn on_read_done(&mut self, result: Result<Vec<Frame>, SocketError>) -> ChannelState {
        if self.state == State::Closed {
            return ChannelState::Deleted;
        }
        self.read_pending = false;
        match result {
            Ok(frames) => {
                self.held_frames.extend(frames);
                self.read_frames()
            }
            Err(error) => self.handle_read_error(error),
        }
    }

    /// Completion of a pending [`Stream::write_frames`] call.
    pub fn on_write_done(&mut self, result: Result<(), SocketError>) -> ChannelState {
        if self.state == State::Closed {
            return ChannelState::Deleted;
        }
        match result {
            Ok(()) => match self.finish_write() {
                Some(next) => self.write_batch(next),
                None => ChannelState::Alive,
            },
            Err(error) => self.handle_write_error(error),
        }
    }

    /// Submits one data frame for sending.
    ///
    /// Fragmentation rules are enforced symmetrically to the receive side,
    /// and text payloads stream through the outbound UTF-8 validator; a
    /// violation fails the channel and the payload never reaches the wire.
    /// After a Close has been sent the payload is silently discarded while
    /// the call still reports the channel alive.
    pub fn send_frame(
        &mut self,
        final_: bool,
        opcode: Opcode,
        payload: impl Into<Bytes>,
    ) -> ChannelState {
        let payload = payload.into();
        match self.state {
            State::Connected => {}
            State::SendClosed | State::CloseWait => {
                // RFC 6455 Section 5.5.1: nothing after a Close.
                trace!("send_frame after close requested, discarding payload");
                return ChannelState::Alive;
            }
            State::Closed => return ChannelState::Deleted,
            State::Fresh | State::Connecting | State::RecvClosed => {
                warn!(state = ?self.state, "send_frame before connection established, discarding");
                return ChannelState::Alive;
            }
        }
        if !opcode.is_data() {
            warn!(?opcode, "send_frame called with a non-data opcode, discarding");
            return ChannelState::Alive;
        }
        match opcode {
            Opcode::Text | Opcode::Binary => {
                if self.outbound_open {
                    return self.fail_channel(
                        "Browser sent start of new message but previous message is unfinished",
                        CloseCode::ProtocolError.into(),
                        "",
                    );
                }
            }
            Opcode::Continuation => {
                if !self.outbound_open {
                    return self.fail_channel(
                        "Browser sent unexpected continuation frame",
                        CloseCode::ProtocolError.into(),
                        "",
                    );
                }
            }
            _ => unreachable!("is_data() checked above"),
        }
        if opcode == Opcode::Text {
            self.outbound_validator.reset();
        }
        let text_frame = opcode == Opcode::Text || (opcode == Opcode::Continuation && self.outbound_text);
        if text_frame {
            let utf8 = self.outbound_validator.feed(&payload);
            if utf8 == Utf8State::Invalid || (final_ && utf8 == Utf8State::ValidMidpoint) {
                return self.fail_channel(
                    "Browser sent a text frame containing invalid UTF-8",
                    CloseCode::GoingAway.into(),
                    "",
                );
            }
        }
        if opcode != Opcode::Continuation {
            self.outbound_text = opcode == Opcode::Text;
        }
        self.outbound_open = !final_;
        self.send_or_queue(Frame::data(final_, opcode, payload).masked())
    }

    /// Starts (or joins) the closing handshake.
    ///
    /// An out-of-range `code` or a `reason` longer than 123 bytes is
    /// replaced on the wire with an internal-error Close frame; the local
    /// intent to close still succeeds.
    pub fn start_closing_handshake(&mut self, code: u16, reason: &str) -> ChannelState {
        match self.state {
            State::Fresh | State::Connecting => {
                debug!("close requested before connection established");
                self.state = State::Closed;
                self.do_drop_channel(false, CloseCode::Abnormal.into(), String::new());
                return ChannelState::Deleted;
            }
            State::SendClosed | State::CloseWait => return ChannelState::Alive,
            State::Closed => return ChannelState::Deleted,
            State::Connected | State::RecvClosed => {}
        }
        let payload = if close::is_valid_user_code(code) && reason.len() <= MAX_CLOSE_REASON_LENGTH
        {
            ClosePayload::new(code, reason)
        } else {
            ClosePayload::from_code(CloseCode::InternalError, "")
        };
        if self.send_close(&payload) == ChannelState::Deleted {
            return ChannelState::Deleted;
        }
        self.closing_timer.arm(&*self.clock, self.closing_handshake_timeout);
        ChannelState::Alive
    }

    /// Fires any expired closing-handshake deadline. The embedder pumps
    /// this; [`next_deadline`](Self::next_deadline) says when it is next
    /// worth calling.
    pub fn poll_timers(&mut self) -> ChannelState {
        if self.state == State::Closed {
            return ChannelState::Deleted;
        }
        let expired = self.closing_timer.is_expired(&*self.clock)
            || self.underlying_timer.is_expired(&*self.clock);
        if !expired {
            return ChannelState::Alive;
        }
        debug!(received_close = self.has_received_close, "close timeout fired");
        self.cancel_timers();
        if let Some(stream) = self.stream.as_mut() {
            stream.close();
        }
        self.state = State::Closed;
        if self.has_received_close {
            let ClosePayload { code, reason } = self.received_close.clone();
            self.do_drop_channel(true, code, reason);
        } else {
            self.do_drop_channel(false, CloseCode::Abnormal.into(), String::new());
        }
        ChannelState::Deleted
    }

    /// The earliest armed deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.closing_timer.deadline(), self.underlying_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    fn liveness(&self) -> ChannelState {
        if self.state == State::Closed {
            ChannelState::Deleted
        } else {
            ChannelState::Alive
        }
    }

    // ---- frame routing ----------------------------------------------------

    fn handle_frame(&mut self, frame: Frame) -> ChannelState {
        if frame.masked {
            // This is the client side; RFC 6455 Section 5.1 forbids masked
            // server frames. Frames after this one in the same batch are
            // dropped along with the channel.
            return self.fail_channel(
                "A server must not mask any frames that it sends to the client.",
                CloseCode::ProtocolError.into(),
                "Masked frame from server",
            );
        }
        if frame.has_reserved_bits() {
            return self.fail_channel(
                format!(
                    "One or more reserved bits are on: reserved1 = {}, reserved2 = {}, reserved3 = {}",
                    u8::from(frame.rsv1),
                    u8::from(frame.rsv2),
                    u8::from(frame.rsv3),
                ),
                CloseCode::ProtocolError.into(),
                "",
            );
        }
        if self.state == State::CloseWait {
            return self.fail_channel(
                "Data frame received after close",
                CloseCode::ProtocolError.into(),
                "",
            );
        }
        trace!(opcode = ?frame.opcode, final_ = frame.final_, len = frame.payload.len(), "routing frame");
        match frame.opcode {
            Opcode::Text | Opcode::Binary | Opcode::Continuation => self.handle_data_frame(frame),
            Opcode::Ping => {
                if self.state == State::Connected {
                    self.send_or_queue(Frame::pong(frame.payload).masked())
                } else {
                    trace!("ignoring ping while closing");
                    ChannelState::Alive
                }
            }
            Opcode::Pong => ChannelState::Alive,
            Opcode::Close => self.handle_close_frame(&frame.payload),
            Opcode::Reserved(value) => self.fail_channel(
                format!("Unrecognized frame opcode: {value}"),
                CloseCode::ProtocolError.into(),
                "Unrecognized frame opcode",
            ),
        }
    }

    fn handle_data_frame(&mut self, frame: Frame) -> ChannelState {
        match frame.opcode {
            Opcode::Text | Opcode::Binary => {
                if self.incoming_kind.is_some() {
                    return self.fail_channel(
                        "Received start of new message but previous message is unfinished.",
                        CloseCode::ProtocolError.into(),
                        "",
                    );
                }
                let kind = if frame.opcode == Opcode::Text {
                    MessageKind::Text
                } else {
                    MessageKind::Binary
                };
                self.incoming_kind = Some(kind);
                self.initial_frame_forwarded = false;
                if kind == MessageKind::Text {
                    self.inbound_validator.reset();
                }
            }
            Opcode::Continuation => {
                if self.incoming_kind.is_none() {
                    return self.fail_channel(
                        "Received unexpected continuation frame.",
                        CloseCode::ProtocolError.into(),
                        "",
                    );
                }
            }
            _ => unreachable!("only data frames are routed here"),
        }
        let Some(message_kind) = self.incoming_kind else {
            return ChannelState::Alive;
        };
        if message_kind == MessageKind::Text {
            let utf8 = self.inbound_validator.feed(&frame.payload);
            if utf8 == Utf8State::Invalid || (frame.final_ && utf8 == Utf8State::ValidMidpoint) {
                return self.fail_channel(
                    "Could not decode a text frame as UTF-8.",
                    CloseCode::ProtocolError.into(),
                    "Invalid UTF-8 in text frame",
                );
            }
        }
        let final_ = frame.final_;
        // A frame must be non-empty or final to be worth forwarding.
        if final_ || !frame.payload.is_empty() {
            let kind = if self.initial_frame_forwarded {
                MessageKind::Continuation
            } else {
                message_kind
            };
            self.initial_frame_forwarded = true;
            self.events.on_data_frame(final_, kind, frame.payload);
        }
        if final_ {
            self.incoming_kind = None;
        }
        ChannelState::Alive
    }

    fn handle_close_frame(&mut self, payload: &Bytes) -> ChannelState {
        let parsed = match ClosePayload::parse(payload) {
            Ok(parsed) => parsed,
            Err(error) => {
                return self.fail_channel(
                    error.message(),
                    CloseCode::ProtocolError.into(),
                    error.response_reason(),
                );
            }
        };
        debug!(code = parsed.code, reason = %parsed.reason, "close frame received");
        self.has_received_close = true;
        self.received_close = parsed.clone();
        match self.state {
            State::Connected => {
                // Peer-initiated: echo the Close (1005 goes out as an empty
                // body) and only then surface the handshake to the sink.
                self.state = State::RecvClosed;
                if self.send_close(&parsed) == ChannelState::Deleted {
                    return ChannelState::Deleted;
                }
                debug_assert_eq!(self.state, State::CloseWait);
                self.events.on_closing_handshake();
                self.enter_close_wait();
                ChannelState::Alive
            }
            State::SendClosed => {
                // Our Close has been answered; the handshake is complete.
                self.state = State::CloseWait;
                self.enter_close_wait();
                ChannelState::Alive
            }
            _ => ChannelState::Alive,
        }
    }

    // ---- closing machinery ------------------------------------------------

    fn send_close(&mut self, payload: &ClosePayload) -> ChannelState {
        debug_assert!(matches!(self.state, State::Connected | State::RecvClosed));
        let body = payload.encode();
        self.state = match self.state {
            State::Connected => State::SendClosed,
            State::RecvClosed => State::CloseWait,
            other => other,
        };
        self.send_or_queue(Frame::close(body).masked())
    }

    fn enter_close_wait(&mut self) {
        self.closing_timer.cancel();
        self.underlying_timer
            .arm(&*self.clock, self.underlying_close_timeout);
    }

    fn cancel_timers(&mut self) {
        self.closing_timer.cancel();
        self.underlying_timer.cancel();
    }

    // ---- failure paths ----------------------------------------------------

    fn fail_channel(
        &mut self,
        message: impl Into<String>,
        close_code: u16,
        close_reason: &str,
    ) -> ChannelState {
        let message = message.into();
        warn!(%message, close_code, "failing channel");
        if self.state == State::Connected {
            // Best-effort; a write failure here tears the channel down
            // through the write-error path and the latch below keeps the
            // event stream single-shot.
            let _ = self.send_close(&ClosePayload::new(close_code, close_reason));
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.close();
        }
        self.state = State::Closed;
        self.emit_fail(message, SocketError::ProtocolError, None);
        ChannelState::Deleted
    }

    fn handle_read_error(&mut self, error: SocketError) -> ChannelState {
        if error == SocketError::ProtocolError {
            return self.fail_channel(
                "Invalid frame header",
                CloseCode::ProtocolError.into(),
                "WebSocket Protocol Error",
            );
        }
        debug!(%error, state = ?self.state, "read failed");
        let clean = error == SocketError::ConnectionClosed && self.state == State::CloseWait;
        self.state = State::Closed;
        if clean {
            let ClosePayload { code, reason } = self.received_close.clone();
            self.do_drop_channel(true, code, reason);
        } else {
            self.do_drop_channel(false, CloseCode::Abnormal.into(), String::new());
        }
        ChannelState::Deleted
    }

    fn handle_write_error(&mut self, error: SocketError) -> ChannelState {
        debug!(%error, "write failed");
        if let Some(stream) = self.stream.as_mut() {
            stream.close();
        }
        self.state = State::Closed;
        self.do_drop_channel(false, CloseCode::Abnormal.into(), String::new());
        ChannelState::Deleted
    }

    fn emit_fail(&mut self, message: String, error: SocketError, response_code: Option<u16>) {
        if self.terminal_event_sent {
            return;
        }
        self.terminal_event_sent = true;
        self.cancel_timers();
        self.events.on_fail_channel(message, error, response_code);
    }

    fn do_drop_channel(&mut self, was_clean: bool, code: u16, reason: String) {
        if self.terminal_event_sent {
            return;
        }
        self.terminal_event_sent = true;
        self.cancel_timers();
        self.events.on_drop_channel(was_clean, code, reason);
    }

    // ---- write queue ------------------------------------------------------

    fn send_or_queue(&mut self, frame: Frame) -> ChannelState {
        if self.send_queue.in_flight {
            self.send_queue.queued.push(frame);
            return ChannelState::Alive;
        }
        self.write_batch(vec![frame])
    }

    fn write_batch(&mut self, mut batch: Vec<Frame>) -> ChannelState {
        loop {
            debug_assert!(batch.iter().all(|frame| frame.masked));
            self.send_queue.in_flight = true;
            let write_result = match self.stream.as_mut() {
                Some(stream) => stream.write_frames(batch),
                None => return ChannelState::Deleted,
            };
            match write_result {
                StreamIo::Pending => return ChannelState::Alive,
                StreamIo::Ready(Ok(())) => match self.finish_write() {
                    Some(next) => batch = next,
                    None => return ChannelState::Alive,
                },
                StreamIo::Ready(Err(error)) => return self.handle_write_error(error),
            }
        }
    }

    /// Returns the next batch to write, or `None` once the queue is
    /// drained (at which point the sink hears about it).
    fn finish_write(&mut self) -> Option<Vec<Frame>> {
        if self.send_queue.queued.is_empty() {
            self.send_queue.in_flight = false;
            if !self.terminal_event_sent {
                self.events.on_send_data_frame_done();
            }
            None
        } else {
            Some(std::mem::take(&mut self.send_queue.queued))
        }
    }
}

impl std::fmt::Debug for WebSocketChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketChannel")
            .field("state", &self.state)
            .field("read_pending", &self.read_pending)
            .field("held_frames", &self.held_frames.len())
            .field("write_in_flight", &self.send_queue.in_flight)
            .field("queued_frames", &self.send_queue.queued.len())
            .field("has_received_close", &self.has_received_close)
            .finish_non_exhaustive()
    }
}
