//! WebSocket Transport
//!
//! Production transport over `tokio-tungstenite`. Each `open` spawns one
//! connection task that performs the asynchronous connect and then services
//! the socket: outbound frames arrive on a command channel, inbound frames
//! and lifecycle changes leave on the event channel. The handle shares
//! nothing with the task beyond those channels and an atomic open flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::{Transport, TransportEvent, TransportHandle};

/// Close code reported when a connection dies without a close handshake.
const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported when the peer's close frame carries no code.
const NO_STATUS_RECEIVED: u16 = 1005;

/// WebSocket transport factory.
///
/// Requires a tokio runtime: `open` spawns the connection task onto the
/// current runtime.
#[derive(Debug, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create the factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

enum Command {
    Send(String),
    Close,
}

struct WebSocketHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    open: Arc<AtomicBool>,
}

impl Transport for WebSocketTransport {
    fn open(
        &mut self,
        url: &Url,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Box<dyn TransportHandle> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        tokio::spawn(connection_task(
            url.clone(),
            events,
            cmd_rx,
            Arc::clone(&open),
        ));
        Box::new(WebSocketHandle { cmd_tx, open })
    }
}

impl TransportHandle for WebSocketHandle {
    fn send(&self, text: String) {
        if self.cmd_tx.send(Command::Send(text)).is_err() {
            tracing::warn!("send on a finished connection, frame dropped");
        }
    }

    fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Connection task, one per `open`.
///
/// Event sends are deliberately unchecked: once the session releases the
/// receiving end, anything still in flight is meant to be dropped.
async fn connection_task(
    url: Url,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    open: Arc<AtomicBool>,
) {
    tracing::debug!(%url, "connecting");
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            // No close handshake ever happened, so no Closed follows; the
            // session learns the rest when it is told to close explicitly.
            tracing::error!(%url, error = %e, "connect failed");
            let _ = events.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    tracing::info!(%url, "connected");
    let _ = events.send(TransportEvent::Connected);

    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(text)) => {
                    if let Err(e) = ws_tx.send(Message::Text(text)).await {
                        tracing::warn!(error = %e, "write failed");
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                    }
                }
                // Close was requested, or the handle itself was dropped;
                // either way the session is done with this connection.
                Some(Command::Close) | None => {
                    tracing::debug!("closing connection");
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    let (status_code, reason) = match frame {
                        Some(f) => (u16::from(f.code), f.reason.to_string()),
                        None => (NO_STATUS_RECEIVED, String::new()),
                    };
                    tracing::info!(status_code, %reason, "closed by server");
                    let _ = events.send(TransportEvent::Closed {
                        status_code,
                        reason,
                        was_clean: true,
                    });
                    break;
                }
                // Pings are answered by tungstenite while the stream is
                // polled; binary frames are outside this protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "connection error");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    let _ = events.send(TransportEvent::Closed {
                        status_code: ABNORMAL_CLOSURE,
                        reason: String::new(),
                        was_clean: false,
                    });
                    break;
                }
                None => {
                    tracing::warn!("connection ended without close handshake");
                    let _ = events.send(TransportEvent::Closed {
                        status_code: ABNORMAL_CLOSURE,
                        reason: String::new(),
                        was_clean: false,
                    });
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::SeqCst);
}
