//! Chatlink Core - Streaming Assistant Chat Client
//!
//! This crate is a client-side protocol adapter: it maintains one persistent
//! bidirectional WebSocket connection to a remote conversational-assistant
//! service, translates the service's pipe-delimited text framing into typed
//! notifications, and exposes a small command surface for hosts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Host (single thread)                    │
//! │   commands: connect / close / send_user_message /            │
//! │             request_spec_from_text            pump()         │
//! │        │                                        ▲            │
//! └────────┼────────────────────────────────────────┼────────────┘
//!          ▼                                        │
//! ┌──────────────────┐   notifications   ┌──────────────────┐
//! │     Session      ├──────────────────►│    EventSink     │
//! │  state machine   │                   │ multicast, five  │
//! │  frame codec     │                   │ ordered channels │
//! └────────┬─────────┘                   └──────────────────┘
//!          │ open / send / close
//!          ▼
//! ┌──────────────────┐   TransportEvent (FIFO queue)
//! │    Transport     ├──────────────────► drained by pump()
//! │ (connection I/O  │
//! │  on its own task)│
//! └──────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Session`]: the connection state machine and command surface
//! - [`ClientEvent`]: notifications delivered to the host
//! - [`EventSink`]: per-channel multicast subscriber registry
//! - [`Transport`]: seam over the connection I/O ([`WebSocketTransport`]
//!   in production, [`InProcessTransport`] for embedding and tests)
//! - [`ClientConfig`]: endpoint configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use chatlink_core::{ClientConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new(&ClientConfig::from_env())?;
//!     session.sink_mut().on_chat_chunk(|text| print!("{text}"));
//!     session.connect();
//!
//!     // Host loop: pump regularly; subscribers run here, in order.
//!     loop {
//!         session.pump();
//!         tokio::time::sleep(std::time::Duration::from_millis(30)).await;
//!     }
//! }
//! ```
//!
//! # Threading Model
//!
//! Connection I/O runs on the transport's own tasks. Everything it produces
//! crosses back to the host through a FIFO queue drained only by
//! [`Session::pump`], so notifications and all session state changes happen
//! on the host's thread. Frames of one kind are delivered in the order the
//! server sent them; there is no ordering across kinds.
//!
//! # Module Overview
//!
//! - [`config`]: endpoint configuration and validation
//! - [`frame`]: the `KIND|payload` wire codec
//! - [`events`]: typed notifications and the inbound dispatch table
//! - [`session`]: connection state machine and command surface
//! - [`sink`]: multicast notification registry
//! - [`transport`]: connection seam and its implementations
//!
//! # No UI Dependencies
//!
//! This crate has no dependency on any UI framework; it is pure protocol
//! logic that any single-threaded, event-driven host can embed.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod events;
pub mod frame;
pub mod session;
pub mod sink;
pub mod transport;

// Re-exports for convenience
pub use config::{ClientConfig, ConfigError, DEFAULT_URL};
pub use events::ClientEvent;
pub use frame::OutboundKind;
pub use session::{ConnectionStatus, Session};
pub use sink::EventSink;
pub use transport::{
    ClientCommand, InProcessConn, InProcessPeer, InProcessTransport, Transport, TransportEvent,
    TransportHandle, WebSocketTransport,
};
