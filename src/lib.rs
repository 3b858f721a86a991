//! wschannel: sans-IO RFC 6455 WebSocket channel state machine.
//!
//! # Overview
//!
//! A [`WebSocketChannel`] drives one WebSocket connection end-to-end after
//! the opening handshake: it turns the transport's deframed frame stream
//! into the application contract: message fragmentation, control frames,
//! the closing handshake and its timeouts, streaming UTF-8 validation of
//! text messages, and outbound masking/batching.
//!
//! The crate is sans-IO: the transport sits behind the [`Stream`] trait,
//! the consumer behind the [`EventSink`] trait, and time behind
//! [`time::TimeSource`]. Every suspension point is an explicit
//! immediate-or-pending result ([`StreamIo`]); pending completions are
//! delivered back by the embedder on the same logical sequence, so the
//! channel needs no locks and no runtime.
//!
//! # Core Guarantees
//!
//! - **Ordering**: events reach the sink in frame arrival order; outbound
//!   frames reach the stream in submission order, with at most one write
//!   in flight and waiting frames coalesced into one batch.
//! - **Back-pressure**: the channel stops pulling from the transport while
//!   the consumer reports pending data frames.
//! - **Single-shot teardown**: exactly one terminal event
//!   (`on_fail_channel` or `on_drop_channel`) per connection, after which
//!   the channel is inert.
//! - **Fail closed**: invalid UTF-8 is never relayed in either direction,
//!   and protocol violations kill the connection with a specific
//!   diagnostic and a best-effort Close frame.
//!
//! # Module Structure
//!
//! - [`frame`]: frame model (header bits + payload)
//! - [`close`]: close payloads and the RFC 6455 Section 7.4 code tables
//! - [`validator`]: streaming UTF-8 validation across frame boundaries
//! - [`stream`]: transport boundary
//! - [`event`]: consumer boundary
//! - [`time`]: time source and one-shot timers
//! - [`channel`]: the channel state machine
//! - [`testing`]: scripted stream / recording sink test doubles

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod close;
pub mod event;
pub mod frame;
pub mod stream;
pub mod testing;
pub mod time;
pub mod validator;

pub use channel::{ChannelConfig, ChannelState, WebSocketChannel};
pub use close::{CloseCode, ClosePayload};
pub use event::{EventSink, HandshakeRequestInfo, HandshakeResponseInfo, MessageKind};
pub use frame::{Frame, Opcode};
pub use stream::{SocketError, Stream, StreamIo};
pub use validator::{StreamingUtf8Validator, Utf8State};
