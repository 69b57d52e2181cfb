//! Event Sink
//!
//! Multicast notification registry: one ordered subscriber list per event
//! channel, invoked synchronously in subscription order whenever the host
//! pumps the session. Fire-and-forget; zero subscribers is fine.
//!
//! Subscribing and emitting both happen on the host's thread. The sink is
//! never touched from a connection task, so no synchronization is needed
//! around the subscriber lists.

use crate::events::ClientEvent;

type Callback0 = Box<dyn FnMut() + Send>;
type Callback1 = Box<dyn FnMut(&str) + Send>;
type CallbackClosed = Box<dyn FnMut(u16, &str) + Send>;

/// Registry of host callbacks for the five notification channels.
#[derive(Default)]
pub struct EventSink {
    connected: Vec<Callback0>,
    chat_chunk: Vec<Callback1>,
    chat_final: Vec<Callback1>,
    spec_json: Vec<Callback1>,
    closed: Vec<CallbackClosed>,
    error: Vec<Callback1>,
}

impl EventSink {
    /// Create an empty sink with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to [`ClientEvent::Connected`].
    pub fn on_connected(&mut self, f: impl FnMut() + Send + 'static) {
        self.connected.push(Box::new(f));
    }

    /// Subscribe to [`ClientEvent::ChatChunk`].
    pub fn on_chat_chunk(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.chat_chunk.push(Box::new(f));
    }

    /// Subscribe to [`ClientEvent::ChatFinal`].
    pub fn on_chat_final(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.chat_final.push(Box::new(f));
    }

    /// Subscribe to [`ClientEvent::SpecJson`].
    pub fn on_spec_json(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.spec_json.push(Box::new(f));
    }

    /// Subscribe to [`ClientEvent::Closed`].
    pub fn on_closed(&mut self, f: impl FnMut(u16, &str) + Send + 'static) {
        self.closed.push(Box::new(f));
    }

    /// Subscribe to [`ClientEvent::Error`].
    pub fn on_error(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.error.push(Box::new(f));
    }

    /// Fan one notification out to its channel's subscribers, in
    /// subscription order.
    pub fn emit(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Connected => {
                for f in &mut self.connected {
                    f();
                }
            }
            ClientEvent::ChatChunk { text } => {
                for f in &mut self.chat_chunk {
                    f(text);
                }
            }
            ClientEvent::ChatFinal { text } => {
                for f in &mut self.chat_final {
                    f(text);
                }
            }
            ClientEvent::SpecJson { json } => {
                for f in &mut self.spec_json {
                    f(json);
                }
            }
            ClientEvent::Closed {
                status_code,
                reason,
            } => {
                for f in &mut self.closed {
                    f(*status_code, reason);
                }
            }
            ClientEvent::Error { message } => {
                for f in &mut self.error {
                    f(message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_emit_with_no_subscribers_is_fine() {
        let mut sink = EventSink::new();
        sink.emit(&ClientEvent::Connected);
        sink.emit(&ClientEvent::ChatChunk {
            text: "x".to_string(),
        });
    }

    #[test]
    fn test_subscribers_run_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sink = EventSink::new();

        let first = Arc::clone(&log);
        sink.on_chat_chunk(move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&log);
        sink.on_chat_chunk(move |_| second.lock().unwrap().push("second"));

        sink.emit(&ClientEvent::ChatChunk {
            text: "hi".to_string(),
        });
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_channels_are_isolated() {
        let chunks = Arc::new(Mutex::new(Vec::new()));
        let finals = Arc::new(Mutex::new(Vec::new()));
        let mut sink = EventSink::new();

        let c = Arc::clone(&chunks);
        sink.on_chat_chunk(move |text| c.lock().unwrap().push(text.to_string()));
        let f = Arc::clone(&finals);
        sink.on_chat_final(move |text| f.lock().unwrap().push(text.to_string()));

        sink.emit(&ClientEvent::ChatChunk {
            text: "a".to_string(),
        });
        sink.emit(&ClientEvent::ChatFinal {
            text: "b".to_string(),
        });
        sink.emit(&ClientEvent::ChatChunk {
            text: "c".to_string(),
        });

        assert_eq!(*chunks.lock().unwrap(), vec!["a", "c"]);
        assert_eq!(*finals.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_closed_carries_code_and_reason() {
        let seen = Arc::new(Mutex::new(None));
        let mut sink = EventSink::new();

        let s = Arc::clone(&seen);
        sink.on_closed(move |code, reason| {
            *s.lock().unwrap() = Some((code, reason.to_string()));
        });

        sink.emit(&ClientEvent::Closed {
            status_code: 1000,
            reason: "normal".to_string(),
        });
        assert_eq!(
            *seen.lock().unwrap(),
            Some((1000, "normal".to_string()))
        );
    }
}
