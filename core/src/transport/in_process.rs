//! In-Process Transport
//!
//! Channel-backed transport for embedding and tests: no sockets, no spawned
//! tasks, everything observable from a single thread.
//!
//! # Usage
//!
//! ```ignore
//! let (transport, mut peer) = InProcessTransport::new_pair();
//! let mut session = Session::with_transport(&config, Box::new(transport))?;
//!
//! session.connect();
//! let conn = peer.try_accept().unwrap();
//! conn.complete_connect();           // the async connect "finishes"
//! conn.send_text("CHUNK|Hello");     // server pushes a frame
//! session.pump();                    // host drains and dispatches
//! ```
//!
//! The peer side plays the server: it accepts each opened connection,
//! injects inbound frames, failures and closes, and observes what the client
//! sent. Connect completion is explicit (`complete_connect`), so tests can
//! hold a connection in the connecting phase for as long as they need.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use url::Url;

use super::{Transport, TransportEvent, TransportHandle};

/// What the client side asked a connection to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientCommand {
    /// One outbound text frame.
    Frame(String),
    /// A close request.
    Close,
}

/// In-process transport factory.
///
/// Every `open` produces a new [`InProcessConn`] on the paired
/// [`InProcessPeer`].
pub struct InProcessTransport {
    conn_tx: mpsc::UnboundedSender<InProcessConn>,
}

/// Far side of an in-process transport pair.
pub struct InProcessPeer {
    conn_rx: mpsc::UnboundedReceiver<InProcessConn>,
}

/// One opened in-process connection, seen from the peer (server) side.
pub struct InProcessConn {
    events: mpsc::UnboundedSender<TransportEvent>,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
    open: Arc<AtomicBool>,
    /// Endpoint the client asked for.
    pub url: Url,
}

struct InProcessHandle {
    cmd_tx: mpsc::UnboundedSender<ClientCommand>,
    open: Arc<AtomicBool>,
}

impl InProcessTransport {
    /// Create a connected factory/peer pair.
    #[must_use]
    pub fn new_pair() -> (Self, InProcessPeer) {
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();
        (Self { conn_tx }, InProcessPeer { conn_rx })
    }
}

impl Transport for InProcessTransport {
    fn open(
        &mut self,
        url: &Url,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Box<dyn TransportHandle> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let conn = InProcessConn {
            events,
            commands: cmd_rx,
            open: Arc::clone(&open),
            url: url.clone(),
        };
        // A peer that has gone away behaves like an unreachable server: the
        // connect simply never completes.
        let _ = self.conn_tx.send(conn);
        Box::new(InProcessHandle { cmd_tx, open })
    }
}

impl InProcessPeer {
    /// Take the next opened connection, if one is pending.
    pub fn try_accept(&mut self) -> Option<InProcessConn> {
        self.conn_rx.try_recv().ok()
    }

    /// Wait for the next opened connection. `None` once the factory side is
    /// gone.
    pub async fn accept(&mut self) -> Option<InProcessConn> {
        self.conn_rx.recv().await
    }
}

impl InProcessConn {
    /// Complete the asynchronous connect: mark the connection open and
    /// deliver `Connected`.
    pub fn complete_connect(&self) {
        self.open.store(true, Ordering::SeqCst);
        let _ = self.events.send(TransportEvent::Connected);
    }

    /// Deliver one inbound text frame.
    pub fn send_text(&self, frame: &str) {
        let _ = self.events.send(TransportEvent::Message(frame.to_string()));
    }

    /// Report a connection-level failure without closing.
    pub fn fail(&self, message: &str) {
        let _ = self
            .events
            .send(TransportEvent::Error(message.to_string()));
    }

    /// Close the connection from the server side.
    pub fn close(&self, status_code: u16, reason: &str, was_clean: bool) {
        self.open.store(false, Ordering::SeqCst);
        let _ = self.events.send(TransportEvent::Closed {
            status_code,
            reason: reason.to_string(),
            was_clean,
        });
    }

    /// Next command the client issued, if one is pending.
    pub fn try_next_command(&mut self) -> Option<ClientCommand> {
        self.commands.try_recv().ok()
    }

    /// Wait for the next client command. `None` once the client handle is
    /// gone.
    pub async fn next_command(&mut self) -> Option<ClientCommand> {
        self.commands.recv().await
    }
}

impl TransportHandle for InProcessHandle {
    fn send(&self, text: String) {
        let _ = self.cmd_tx.send(ClientCommand::Frame(text));
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        let _ = self.cmd_tx.send(ClientCommand::Close);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
