//! Chatlink CLI
//!
//! Minimal line-oriented chat host: connects to the assistant service,
//! prints streaming chunks as they arrive, and maps slash commands onto the
//! session's command surface. All protocol logic lives in `chatlink-core`;
//! this binary only renders notifications and forwards input.

use std::io::Write as _;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use chatlink_core::{ClientConfig, Session};

/// How often the host drains the session between input lines.
const PUMP_INTERVAL: Duration = Duration::from_millis(30);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let mut session = Session::new(&config)?;

    let sink = session.sink_mut();
    sink.on_connected(|| println!("* connected"));
    sink.on_chat_chunk(|text| {
        print!("{text}");
        let _ = std::io::stdout().flush();
    });
    sink.on_chat_final(|_text| println!());
    sink.on_spec_json(|json| match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) => println!(
            "* spec:\n{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| json.to_string())
        ),
        Err(_) => println!("* spec (unparsed): {json}"),
    });
    sink.on_closed(|code, reason| println!("* closed ({code}) {reason}"));
    sink.on_error(|message| eprintln!("* error: {message}"));

    println!("chatlink @ {}", session.endpoint());
    println!("commands: /connect /close /spec <text> /quit; anything else is sent as chat");

    if config.auto_connect {
        session.connect();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(PUMP_INTERVAL);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                session.pump();
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                match line {
                    "" => {}
                    "/quit" => break,
                    "/connect" => session.connect(),
                    "/close" => session.close(),
                    _ => {
                        if let Some(text) = line.strip_prefix("/spec ") {
                            session.request_spec_from_text(text.trim());
                        } else if line.starts_with('/') {
                            println!("* unknown command: {line}");
                        } else {
                            session.send_user_message(line);
                        }
                    }
                }
            }
        }
    }

    session.close();
    Ok(())
}
