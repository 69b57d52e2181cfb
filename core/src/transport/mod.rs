//! Transport Layer
//!
//! Narrow seam between the session and whatever carries its frames:
//! - [`websocket::WebSocketTransport`]: production transport over
//!   `tokio-tungstenite`
//! - [`in_process::InProcessTransport`]: channel-backed transport for
//!   embedding and tests
//!
//! # Lifecycle Contract
//!
//! [`Transport::open`] allocates a handle and begins the asynchronous
//! connect. Everything the connection does afterwards (completion, inbound
//! frames, closure, failures) arrives on the event channel handed to
//! `open`, in the order the connection produced it. That channel is the
//! marshaling point between the connection's I/O context and the host's
//! thread: implementations never call back into session state, and the host
//! drains the channel from its own loop. Dropping the receiving end is how
//! the session unsubscribes; implementations must tolerate it silently.

pub mod in_process;
pub mod websocket;

// Re-exports for convenience
pub use in_process::{ClientCommand, InProcessConn, InProcessPeer, InProcessTransport};
pub use websocket::WebSocketTransport;

use tokio::sync::mpsc;
use url::Url;

/// Connection-lifecycle notifications produced by a transport.
///
/// Delivered FIFO per connection on the event channel passed to
/// [`Transport::open`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The asynchronous connect completed; the connection is open.
    Connected,

    /// One inbound text frame.
    Message(String),

    /// The connection closed.
    Closed {
        /// Close status code (1005 when the peer sent none, 1006 for
        /// abnormal termination).
        status_code: u16,
        /// Close reason, possibly empty.
        reason: String,
        /// Whether this was a clean protocol-level close. Recorded for
        /// diagnostics only.
        was_clean: bool,
    },

    /// A connection-level failure. Not necessarily terminal: depending on
    /// how the connection died, a `Closed` event may or may not follow.
    Error(String),
}

/// Factory for connections.
pub trait Transport: Send {
    /// Open a new connection to `url`, delivering its lifecycle on `events`.
    ///
    /// Must not block: the handle is returned immediately and the connect
    /// completes (or fails) asynchronously via the event channel.
    fn open(
        &mut self,
        url: &Url,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Box<dyn TransportHandle>;
}

/// A live connection.
///
/// All operations are non-blocking and best-effort: outcomes surface as
/// [`TransportEvent`]s, never as return values.
pub trait TransportHandle: Send {
    /// Queue one outbound text frame.
    fn send(&self, text: String);

    /// Request connection close. Does not wait for confirmation.
    fn close(&self);

    /// Whether the connection is currently open.
    fn is_open(&self) -> bool;
}
