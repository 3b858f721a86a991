//! Transport boundary consumed by the channel.
//!
//! A [`Stream`] supplies and accepts already-deframed frames; the byte
//! socket, TLS and the HTTP upgrade all live behind it. Both I/O methods
//! follow one explicit two-outcome contract: they either complete
//! immediately with a result or return [`StreamIo::Pending`], in which case
//! the embedder later delivers the completion back into the channel
//! ([`WebSocketChannel::on_read_done`] / [`WebSocketChannel::on_write_done`])
//! on the same logical sequence. A synchronous completion never re-enters
//! the channel; the channel loops instead of recursing.
//!
//! [`WebSocketChannel::on_read_done`]: crate::channel::WebSocketChannel::on_read_done
//! [`WebSocketChannel::on_write_done`]: crate::channel::WebSocketChannel::on_write_done

use crate::frame::Frame;
use thiserror::Error;

/// Outcome of an I/O call: an immediate result or a pending completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamIo<T> {
    /// The call completed synchronously.
    Ready(T),
    /// The call will complete later through the matching `on_*_done`
    /// channel entry point.
    Pending,
}

impl<T> StreamIo<T> {
    /// Returns true for [`StreamIo::Pending`].
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Transport-level failures surfaced by a [`Stream`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SocketError {
    /// The connection was closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection was reset.
    #[error("connection reset")]
    ConnectionReset,

    /// The transport detected malformed WebSocket framing.
    #[error("websocket protocol error")]
    ProtocolError,

    /// The operation timed out.
    #[error("operation timed out")]
    TimedOut,

    /// Unspecified failure.
    #[error("operation failed")]
    Failed,
}

/// One WebSocket connection's transport, exclusively owned by one channel.
///
/// Reads and writes are each strictly ordered: the channel never issues a
/// second `read_frames` (or `write_frames`) before the first has completed,
/// though one of each may be in flight at the same time.
pub trait Stream {
    /// Requests the next batch of frames.
    ///
    /// `Ready(Ok(frames))` may carry zero or more frames; zero frames means
    /// the channel simply asks again. A pending call completes later with
    /// the frames (or error) passed to
    /// [`WebSocketChannel::on_read_done`](crate::channel::WebSocketChannel::on_read_done).
    fn read_frames(&mut self) -> StreamIo<Result<Vec<Frame>, SocketError>>;

    /// Writes a batch of frames, preserving order.
    ///
    /// A pending call completes later through
    /// [`WebSocketChannel::on_write_done`](crate::channel::WebSocketChannel::on_write_done).
    fn write_frames(&mut self, frames: Vec<Frame>) -> StreamIo<Result<(), SocketError>>;

    /// Closes the underlying connection. Fire-and-forget, best-effort.
    fn close(&mut self);

    /// The subprotocol negotiated during the opening handshake, or "" if
    /// none. Queried once, at connection-success time.
    fn sub_protocol(&self) -> &str;

    /// The extensions negotiated during the opening handshake, passed
    /// through verbatim. Queried once, at connection-success time.
    fn extensions(&self) -> &str;
}
