//! Client Events
//!
//! Typed notifications delivered to the host, and the dispatch table that
//! demultiplexes decoded inbound frames onto them.
//!
//! # Design Philosophy
//!
//! The host is a renderer: it subscribes to these notifications and displays
//! them, it does not interpret wire strings. Everything frame-shaped stays in
//! [`frame`](crate::frame); everything the host sees is a `ClientEvent`.

use serde::{Deserialize, Serialize};

/// Notifications delivered to the host by a session.
///
/// Ordering is guaranteed within one kind (frames of a kind arrive in the
/// order the server sent them); no ordering is guaranteed across kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// The asynchronous connect completed and the session is open.
    Connected,

    /// A streaming token of assistant chat output (`CHUNK|...`).
    ChatChunk {
        /// Token text, possibly empty.
        text: String,
    },

    /// The final message of a chat turn (`FINAL|...`).
    ChatFinal {
        /// Complete text of the turn.
        text: String,
    },

    /// A structured spec document (`SPEC|...`).
    SpecJson {
        /// JSON document body, passed through verbatim and unparsed.
        json: String,
    },

    /// The connection closed.
    Closed {
        /// Close status code reported by the transport.
        status_code: u16,
        /// Human-readable close reason, possibly empty.
        reason: String,
    },

    /// A server-reported (`ERROR|...`) or connection-level failure.
    Error {
        /// Error description.
        message: String,
    },
}

impl ClientEvent {
    /// Build the notification for one decoded inbound frame.
    ///
    /// Kinds match case-insensitively. An unrecognized kind is treated as
    /// plain streaming text and becomes [`ClientEvent::ChatChunk`] rather
    /// than being dropped, so every frame produces exactly one event.
    #[must_use]
    pub fn from_frame(kind: &str, payload: &str) -> Self {
        if kind.eq_ignore_ascii_case("FINAL") {
            Self::ChatFinal {
                text: payload.to_string(),
            }
        } else if kind.eq_ignore_ascii_case("SPEC") {
            Self::SpecJson {
                json: payload.to_string(),
            }
        } else if kind.eq_ignore_ascii_case("ERROR") {
            Self::Error {
                message: payload.to_string(),
            }
        } else {
            // CHUNK, and the fallback for anything unknown.
            Self::ChatChunk {
                text: payload.to_string(),
            }
        }
    }
}
