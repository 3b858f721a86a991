//! Test doubles for the channel's two collaborators.
//!
//! [`FakeStream`] plays back a script of read results and records every
//! write; [`RecordingEvents`] records every sink call and answers the
//! back-pressure probe from a script. Both hand out cheap handles so a
//! test can keep inspecting them after moving the double into the channel.
//!
//! These are ordinary (non-`cfg(test)`) items so integration tests and
//! downstream embedders can drive a channel without a real transport.

use crate::event::{
    AuthChallenge, AuthCredentials, EventSink, HandshakeRequestInfo, HandshakeResponseInfo,
    MessageKind, SslErrorInfo,
};
use crate::frame::Frame;
use crate::stream::{SocketError, Stream, StreamIo};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// One scripted outcome for [`Stream::read_frames`].
#[derive(Debug, Clone)]
pub enum ReadScript {
    /// Complete synchronously with these frames.
    Frames(Vec<Frame>),
    /// Complete synchronously with this error.
    Error(SocketError),
    /// Return pending; the test delivers the completion itself through
    /// [`WebSocketChannel::on_read_done`](crate::channel::WebSocketChannel::on_read_done).
    Pending,
}

/// How [`Stream::write_frames`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every write completes synchronously with success.
    SyncOk,
    /// Every write returns pending; the test completes it through
    /// [`WebSocketChannel::on_write_done`](crate::channel::WebSocketChannel::on_write_done).
    Pending,
    /// Every write completes synchronously with this error.
    Error(SocketError),
}

#[derive(Debug)]
struct FakeStreamState {
    reads: VecDeque<ReadScript>,
    write_mode: WriteMode,
    written: Vec<Vec<Frame>>,
    closed: bool,
}

/// Scripted [`Stream`] double.
#[derive(Debug)]
pub struct FakeStream {
    protocol: String,
    extensions: String,
    state: Rc<RefCell<FakeStreamState>>,
}

/// Inspection/scripting handle to a [`FakeStream`], usable after the
/// stream has been moved into a channel.
#[derive(Debug, Clone)]
pub struct FakeStreamHandle {
    state: Rc<RefCell<FakeStreamState>>,
}

impl FakeStream {
    /// Creates a stream with empty protocol and extensions. With no reads
    /// scripted, `read_frames` returns pending.
    #[must_use]
    pub fn new() -> Self {
        Self::with_protocol("", "")
    }

    /// Creates a stream reporting the given negotiated protocol and
    /// extensions.
    #[must_use]
    pub fn with_protocol(protocol: &str, extensions: &str) -> Self {
        Self {
            protocol: protocol.to_owned(),
            extensions: extensions.to_owned(),
            state: Rc::new(RefCell::new(FakeStreamState {
                reads: VecDeque::new(),
                write_mode: WriteMode::SyncOk,
                written: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Returns a handle for scripting and inspection.
    #[must_use]
    pub fn handle(&self) -> FakeStreamHandle {
        FakeStreamHandle {
            state: Rc::clone(&self.state),
        }
    }

    /// Queues a synchronous read completion delivering `frames`.
    pub fn prepare_read_frames(&self, frames: Vec<Frame>) {
        self.state.borrow_mut().reads.push_back(ReadScript::Frames(frames));
    }

    /// Queues a synchronous read error.
    pub fn prepare_read_error(&self, error: SocketError) {
        self.state.borrow_mut().reads.push_back(ReadScript::Error(error));
    }

    /// Sets the write behavior.
    pub fn set_write_mode(&self, mode: WriteMode) {
        self.state.borrow_mut().write_mode = mode;
    }
}

impl Default for FakeStream {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeStreamHandle {
    /// Every batch passed to `write_frames`, in call order.
    #[must_use]
    pub fn written_batches(&self) -> Vec<Vec<Frame>> {
        self.state.borrow().written.clone()
    }

    /// Every written frame, flattened across batches.
    #[must_use]
    pub fn written_frames(&self) -> Vec<Frame> {
        self.state.borrow().written.iter().flatten().cloned().collect()
    }

    /// True once `close` has been called.
    #[must_use]
    pub fn was_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Queues a further synchronous read completion (handles let tests
    /// script reads after the stream has been handed to the channel).
    pub fn prepare_read_frames(&self, frames: Vec<Frame>) {
        self.state.borrow_mut().reads.push_back(ReadScript::Frames(frames));
    }

    /// Queues a further synchronous read error.
    pub fn prepare_read_error(&self, error: SocketError) {
        self.state.borrow_mut().reads.push_back(ReadScript::Error(error));
    }

    /// Changes the write behavior mid-test.
    pub fn set_write_mode(&self, mode: WriteMode) {
        self.state.borrow_mut().write_mode = mode;
    }
}

impl Stream for FakeStream {
    fn read_frames(&mut self) -> StreamIo<Result<Vec<Frame>, SocketError>> {
        let mut state = self.state.borrow_mut();
        match state.reads.pop_front() {
            Some(ReadScript::Frames(frames)) => StreamIo::Ready(Ok(frames)),
            Some(ReadScript::Error(error)) => StreamIo::Ready(Err(error)),
            Some(ReadScript::Pending) | None => StreamIo::Pending,
        }
    }

    fn write_frames(&mut self, frames: Vec<Frame>) -> StreamIo<Result<(), SocketError>> {
        let mut state = self.state.borrow_mut();
        let mode = state.write_mode;
        match mode {
            WriteMode::Error(error) => StreamIo::Ready(Err(error)),
            WriteMode::SyncOk => {
                state.written.push(frames);
                StreamIo::Ready(Ok(()))
            }
            WriteMode::Pending => {
                state.written.push(frames);
                StreamIo::Pending
            }
        }
    }

    fn close(&mut self) {
        self.state.borrow_mut().closed = true;
    }

    fn sub_protocol(&self) -> &str {
        &self.protocol
    }

    fn extensions(&self) -> &str {
        &self.extensions
    }
}

/// Everything a [`RecordingEvents`] sink observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `on_add_channel_response`.
    AddChannelResponse {
        /// Negotiated subprotocol.
        protocol: String,
        /// Negotiated extensions.
        extensions: String,
    },
    /// `on_data_frame`.
    DataFrame {
        /// Final-frame flag.
        final_: bool,
        /// Forwarded frame type.
        kind: MessageKind,
        /// Frame payload.
        payload: Vec<u8>,
    },
    /// `on_send_data_frame_done`.
    SendDataFrameDone,
    /// `on_closing_handshake`.
    ClosingHandshake,
    /// `on_fail_channel`.
    FailChannel {
        /// Failure diagnostic.
        message: String,
    },
    /// `on_drop_channel`.
    DropChannel {
        /// True when the closing handshake fully completed.
        was_clean: bool,
        /// Close status code.
        code: u16,
        /// Close reason.
        reason: String,
    },
    /// `on_start_opening_handshake`.
    StartOpeningHandshake,
    /// `on_ssl_certificate_error`.
    SslCertificateError,
    /// `on_auth_required`.
    AuthRequired,
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<Event>,
    pending_answers: VecDeque<bool>,
    auth_answer: Option<AuthCredentials>,
}

/// Recording [`EventSink`] double.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    state: Rc<RefCell<RecordingState>>,
}

/// Inspection/scripting handle to a [`RecordingEvents`] sink.
#[derive(Debug, Clone)]
pub struct EventLog {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingEvents {
    /// Creates a sink that reports no back-pressure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle for scripting and inspection.
    #[must_use]
    pub fn handle(&self) -> EventLog {
        EventLog {
            state: Rc::clone(&self.state),
        }
    }
}

impl EventLog {
    /// Everything observed so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    /// Only the relayed data frames, in order.
    #[must_use]
    pub fn data_frames(&self) -> Vec<(bool, MessageKind, Vec<u8>)> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::DataFrame {
                    final_,
                    kind,
                    payload,
                } => Some((*final_, *kind, payload.clone())),
                _ => None,
            })
            .collect()
    }

    /// The terminal fail-channel message, if one was emitted.
    #[must_use]
    pub fn fail_message(&self) -> Option<String> {
        self.state.borrow().events.iter().find_map(|event| match event {
            Event::FailChannel { message } => Some(message.clone()),
            _ => None,
        })
    }

    /// The terminal drop-channel event, if one was emitted.
    #[must_use]
    pub fn drop_event(&self) -> Option<(bool, u16, String)> {
        self.state.borrow().events.iter().find_map(|event| match event {
            Event::DropChannel {
                was_clean,
                code,
                reason,
            } => Some((*was_clean, *code, reason.clone())),
            _ => None,
        })
    }

    /// Number of terminal events (fail + drop) observed. At most one is
    /// ever legal.
    #[must_use]
    pub fn terminal_event_count(&self) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|event| {
                matches!(event, Event::FailChannel { .. } | Event::DropChannel { .. })
            })
            .count()
    }

    /// Scripts the next answers to `has_pending_data_frames`; once the
    /// script runs out the answer is `false`.
    pub fn script_pending_answers(&self, answers: impl IntoIterator<Item = bool>) {
        self.state.borrow_mut().pending_answers.extend(answers);
    }

    /// Sets the credentials `on_auth_required` replies with.
    pub fn set_auth_answer(&self, credentials: Option<AuthCredentials>) {
        self.state.borrow_mut().auth_answer = credentials;
    }
}

impl EventSink for RecordingEvents {
    fn on_add_channel_response(
        &mut self,
        _response: HandshakeResponseInfo,
        selected_protocol: String,
        extensions: String,
    ) {
        self.state.borrow_mut().events.push(Event::AddChannelResponse {
            protocol: selected_protocol,
            extensions,
        });
    }

    fn on_data_frame(&mut self, final_: bool, kind: MessageKind, payload: bytes::Bytes) {
        self.state.borrow_mut().events.push(Event::DataFrame {
            final_,
            kind,
            payload: payload.to_vec(),
        });
    }

    fn has_pending_data_frames(&mut self) -> bool {
        self.state
            .borrow_mut()
            .pending_answers
            .pop_front()
            .unwrap_or(false)
    }

    fn on_send_data_frame_done(&mut self) {
        self.state.borrow_mut().events.push(Event::SendDataFrameDone);
    }

    fn on_closing_handshake(&mut self) {
        self.state.borrow_mut().events.push(Event::ClosingHandshake);
    }

    fn on_fail_channel(
        &mut self,
        message: String,
        _error: SocketError,
        _response_code: Option<u16>,
    ) {
        self.state.borrow_mut().events.push(Event::FailChannel { message });
    }

    fn on_drop_channel(&mut self, was_clean: bool, code: u16, reason: String) {
        self.state.borrow_mut().events.push(Event::DropChannel {
            was_clean,
            code,
            reason,
        });
    }

    fn on_start_opening_handshake(&mut self, _request: HandshakeRequestInfo) {
        self.state.borrow_mut().events.push(Event::StartOpeningHandshake);
    }

    fn on_ssl_certificate_error(&mut self, _info: SslErrorInfo) {
        self.state.borrow_mut().events.push(Event::SslCertificateError);
    }

    fn on_auth_required(&mut self, _challenge: AuthChallenge) -> Option<AuthCredentials> {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::AuthRequired);
        state.auth_answer.clone()
    }
}
