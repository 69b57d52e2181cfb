//! End-to-end tests over a real WebSocket loopback server.
//!
//! Each test binds an ephemeral port, runs a scripted server on it, and
//! drives a [`Session`] against it the way a host would: commands on one
//! side, `pump()` in a loop on the other.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use chatlink_core::{ClientConfig, ClientEvent, ConnectionStatus, Session};

/// Subscribe every channel, recording notifications in order.
fn record_events(session: &mut Session) -> Arc<Mutex<Vec<ClientEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = session.sink_mut();

    let log = Arc::clone(&events);
    sink.on_connected(move || log.lock().unwrap().push(ClientEvent::Connected));
    let log = Arc::clone(&events);
    sink.on_chat_chunk(move |text| {
        log.lock().unwrap().push(ClientEvent::ChatChunk {
            text: text.to_string(),
        });
    });
    let log = Arc::clone(&events);
    sink.on_chat_final(move |text| {
        log.lock().unwrap().push(ClientEvent::ChatFinal {
            text: text.to_string(),
        });
    });
    let log = Arc::clone(&events);
    sink.on_spec_json(move |json| {
        log.lock().unwrap().push(ClientEvent::SpecJson {
            json: json.to_string(),
        });
    });
    let log = Arc::clone(&events);
    sink.on_closed(move |status_code, reason| {
        log.lock().unwrap().push(ClientEvent::Closed {
            status_code,
            reason: reason.to_string(),
        });
    });
    let log = Arc::clone(&events);
    sink.on_error(move |message| {
        log.lock().unwrap().push(ClientEvent::Error {
            message: message.to_string(),
        });
    });

    events
}

/// Pump until the recorded notifications satisfy `done`, or fail after 5s.
async fn pump_until(
    session: &mut Session,
    events: &Arc<Mutex<Vec<ClientEvent>>>,
    done: impl Fn(&[ClientEvent]) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            session.pump();
            if done(&events.lock().unwrap()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for events");
}

#[tokio::test]
async fn test_chat_roundtrip_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let msg = ws.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::Text("USER|hi".to_string()));

        ws.send(Message::Text("CHUNK|Hel".to_string())).await.unwrap();
        ws.send(Message::Text("CHUNK|lo".to_string())).await.unwrap();
        ws.send(Message::Text("FINAL|Hello".to_string())).await.unwrap();
        ws.send(Message::Text(format!(
            "SPEC|{}",
            serde_json::json!({"item": "chair", "color": "red"})
        )))
        .await
        .unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "done".into(),
        }))
        .await
        .unwrap();
    });

    let config = ClientConfig {
        url: format!("ws://{addr}"),
        auto_connect: false,
    };
    let mut session = Session::new(&config).unwrap();
    let events = record_events(&mut session);

    session.connect();
    pump_until(&mut session, &events, |evs| {
        evs.contains(&ClientEvent::Connected)
    })
    .await;
    assert!(session.is_connected());

    session.send_user_message("hi");
    pump_until(&mut session, &events, |evs| {
        evs.iter().any(|e| matches!(e, ClientEvent::Closed { .. }))
    })
    .await;

    let evs = events.lock().unwrap().clone();
    assert_eq!(
        evs,
        vec![
            ClientEvent::Connected,
            ClientEvent::ChatChunk {
                text: "Hel".to_string()
            },
            ClientEvent::ChatChunk {
                text: "lo".to_string()
            },
            ClientEvent::ChatFinal {
                text: "Hello".to_string()
            },
            ClientEvent::SpecJson {
                json: "{\"color\":\"red\",\"item\":\"chair\"}".to_string()
            },
            ClientEvent::Closed {
                status_code: 1000,
                reason: "done".to_string()
            },
        ]
    );
    assert!(!session.is_connected());
    assert_eq!(session.status(), ConnectionStatus::Closed);

    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused_surfaces_error_only() {
    // Bind and drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        url: format!("ws://{addr}"),
        auto_connect: false,
    };
    let mut session = Session::new(&config).unwrap();
    let events = record_events(&mut session);

    session.connect();
    pump_until(&mut session, &events, |evs| {
        evs.iter().any(|e| matches!(e, ClientEvent::Error { .. }))
    })
    .await;

    // A refused connect reports the failure and nothing else; the session
    // stays recoverable through an explicit close + connect.
    let evs = events.lock().unwrap().clone();
    assert_eq!(evs.len(), 1);
    assert!(matches!(evs[0], ClientEvent::Error { .. }));
    assert_eq!(session.status(), ConnectionStatus::Faulted);
    assert!(!session.is_connected());

    session.close();
    assert_eq!(session.status(), ConnectionStatus::Closed);
}

#[tokio::test]
async fn test_local_close_reaches_server_and_stays_silent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // The client's close arrives as a close frame (or end of stream).
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            }
        }
    });

    let config = ClientConfig {
        url: format!("ws://{addr}"),
        auto_connect: false,
    };
    let mut session = Session::new(&config).unwrap();
    let events = record_events(&mut session);

    session.connect();
    pump_until(&mut session, &events, |evs| {
        evs.contains(&ClientEvent::Connected)
    })
    .await;

    session.close();
    assert!(!session.is_connected());
    assert_eq!(session.status(), ConnectionStatus::Closed);

    // Give anything in flight a chance to (wrongly) show up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.pump();
    assert_eq!(*events.lock().unwrap(), vec![ClientEvent::Connected]);

    server.await.unwrap();
}

#[tokio::test]
async fn test_unknown_kinds_stream_as_chat_text() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        ws.send(Message::Text("NOTICE|maintenance at noon".to_string()))
            .await
            .unwrap();
        ws.send(Message::Text("PING".to_string())).await.unwrap();
        ws.send(Message::Text("chunk|lower case".to_string()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
    });

    let config = ClientConfig {
        url: format!("ws://{addr}"),
        auto_connect: false,
    };
    let mut session = Session::new(&config).unwrap();
    let events = record_events(&mut session);

    session.connect();
    pump_until(&mut session, &events, |evs| {
        evs.iter().any(|e| matches!(e, ClientEvent::Closed { .. }))
    })
    .await;

    let evs = events.lock().unwrap().clone();
    assert_eq!(
        &evs[..4],
        &[
            ClientEvent::Connected,
            ClientEvent::ChatChunk {
                text: "maintenance at noon".to_string()
            },
            ClientEvent::ChatChunk {
                text: String::new()
            },
            ClientEvent::ChatChunk {
                text: "lower case".to_string()
            },
        ]
    );

    server.await.unwrap();
}
