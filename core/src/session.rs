//! Session
//!
//! The connection state machine. A [`Session`] owns the transport handle,
//! enforces the single-active-connection invariant, frames outbound commands
//! and pumps inbound transport events into host notifications.
//!
//! # Threading
//!
//! A session lives on the host's thread. Connection I/O happens on the
//! transport's own tasks; everything they produce crosses back through a
//! FIFO queue that only [`Session::pump`] drains. Sink subscribers therefore
//! run on the host's thread, in delivery order. Every mutation goes through
//! `&mut self`, so handle lifecycle is serialized by the borrow checker
//! rather than a lock.
//!
//! # Error Policy
//!
//! Commands issued in the wrong state (connect while connected, send while
//! disconnected) are logged at warn level and ignored; they are never
//! surfaced to the caller as faults. Connection-level failures arrive as
//! [`ClientEvent::Error`] / [`ClientEvent::Closed`] notifications.

use tokio::sync::mpsc;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::events::ClientEvent;
use crate::frame::{self, OutboundKind};
use crate::sink::EventSink;
use crate::transport::{Transport, TransportEvent, TransportHandle, WebSocketTransport};

/// Lifecycle phase of the session's connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection has been attempted yet.
    Idle,
    /// An asynchronous connect is in flight.
    Connecting,
    /// The connection is established.
    Open,
    /// The connection was closed, locally or by the server.
    Closed,
    /// The transport reported an error. The handle is kept until an explicit
    /// close or a closed notification arrives.
    Faulted,
}

/// The single logical connection to the assistant service.
///
/// At most one live transport handle exists per session: a connect while one
/// is being established or open is rejected. A dropped connection surfaces
/// as `Closed`/`Error` notifications and requires a new [`Session::connect`];
/// the session never reconnects on its own.
pub struct Session {
    endpoint: Url,
    transport: Box<dyn Transport>,
    handle: Option<Box<dyn TransportHandle>>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    status: ConnectionStatus,
    sink: EventSink,
}

impl Session {
    /// Create a session over the production WebSocket transport.
    ///
    /// # Errors
    ///
    /// Fails when the configured endpoint is not a valid `ws`/`wss` URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Box::new(WebSocketTransport::new()))
    }

    /// Create a session over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Fails when the configured endpoint is not a valid `ws`/`wss` URL.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: config.endpoint()?,
            transport,
            handle: None,
            events: None,
            status: ConnectionStatus::Idle,
            sink: EventSink::new(),
        })
    }

    /// The validated endpoint this session connects to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Subscriber registry for this session's notifications.
    pub fn sink_mut(&mut self) -> &mut EventSink {
        &mut self.sink
    }

    /// Begin connecting.
    ///
    /// Rejected (logged, no-op) while a connect is in flight or a connection
    /// is open. Completion arrives later as a `Connected` notification
    /// during [`Session::pump`]; a connect that never completes leaves the
    /// session connecting until an explicit [`Session::close`].
    pub fn connect(&mut self) {
        if matches!(
            self.status,
            ConnectionStatus::Connecting | ConnectionStatus::Open
        ) {
            tracing::warn!(
                url = %self.endpoint,
                status = ?self.status,
                "already connecting or connected, ignoring connect"
            );
            return;
        }

        // A dead handle can still be around after a fault; it goes away with
        // its queue before the new one is created.
        self.release_handle();

        let (tx, rx) = mpsc::unbounded_channel();
        tracing::info!(url = %self.endpoint, "connecting");
        self.handle = Some(self.transport.open(&self.endpoint, tx));
        self.events = Some(rx);
        self.status = ConnectionStatus::Connecting;
    }

    /// Close the connection.
    ///
    /// Best-effort: asks the transport to close and releases the handle
    /// immediately, without waiting for confirmation; no `Closed`
    /// notification follows a local close. Safe no-op when no handle exists.
    pub fn close(&mut self) {
        if let Some(handle) = &self.handle {
            tracing::info!("closing connection");
            handle.close();
            self.release_handle();
            self.status = ConnectionStatus::Closed;
        }
    }

    /// Whether a handle exists and the transport reports it open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_open())
    }

    /// Send a chat turn (`USER|text`). The server answers with a stream of
    /// `CHUNK` frames followed by one `FINAL` frame.
    pub fn send_user_message(&mut self, text: &str) {
        self.send(OutboundKind::User, text);
    }

    /// Ask the server for a structured JSON spec describing `text`
    /// (`SPEC|text`). The server answers with one `SPEC` frame.
    pub fn request_spec_from_text(&mut self, text: &str) {
        self.send(OutboundKind::Spec, text);
    }

    fn send(&mut self, kind: OutboundKind, text: &str) {
        if !self.is_connected() {
            tracing::warn!(kind = kind.as_str(), "not connected, dropping outbound frame");
            return;
        }
        if let Some(handle) = &self.handle {
            handle.send(frame::encode(kind, text));
        }
    }

    /// Drain pending transport events and fan the resulting notifications
    /// out to the sink's subscribers.
    ///
    /// Call this from the host's loop; it is the only place session state
    /// changes in response to the connection. Returns the number of
    /// notifications emitted.
    pub fn pump(&mut self) -> usize {
        let mut emitted = 0;
        loop {
            let event = match self.events.as_mut().map(|rx| rx.try_recv()) {
                Some(Ok(event)) => event,
                _ => break,
            };
            emitted += 1;
            match event {
                TransportEvent::Connected => {
                    self.status = ConnectionStatus::Open;
                    self.sink.emit(&ClientEvent::Connected);
                }
                TransportEvent::Message(text) => {
                    let (kind, payload) = frame::decode(&text);
                    let event = ClientEvent::from_frame(kind, payload);
                    self.sink.emit(&event);
                }
                TransportEvent::Closed {
                    status_code,
                    reason,
                    was_clean,
                } => {
                    tracing::warn!(status_code, was_clean, %reason, "connection closed");
                    self.sink.emit(&ClientEvent::Closed {
                        status_code,
                        reason,
                    });
                    self.release_handle();
                    self.status = ConnectionStatus::Closed;
                }
                TransportEvent::Error(message) => {
                    tracing::error!(%message, "transport error");
                    // The handle is kept: transports that still deliver a
                    // close after an error trigger the release there, and an
                    // explicit close covers the ones that never do.
                    self.status = ConnectionStatus::Faulted;
                    self.sink.emit(&ClientEvent::Error { message });
                }
            }
        }
        emitted
    }

    /// Drop the handle and its event queue. Anything the dead connection
    /// still had in flight is discarded with the queue. Safe to call twice.
    fn release_handle(&mut self) {
        self.handle.take();
        self.events.take();
    }
}
