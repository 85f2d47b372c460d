//! Interactive chat session.

use plugchat_client::{ChatClient, NullSink, StoreEvent, SyncConfig};
use plugchat_protocol::Sender;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Runs an interactive session until stdin closes.
pub async fn run(
    url: &str,
    nickname: Option<String>,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::new(url).with_poll_interval(interval);
    let client = ChatClient::connect(config, Arc::new(NullSink));

    if let Some(nickname) = nickname {
        // Nickname changes go through the same callable a host would
        // use, so there is exactly one rename path.
        client.dispatch(
            "__receiveStateChange__",
            &json!({ "currentUser": nickname }).to_string(),
        )?;
    }

    // Print messages as the store commits them.
    let events = client.subscribe();
    let printer = tokio::task::spawn_blocking(move || {
        while let Ok(event) = events.recv() {
            match event {
                StoreEvent::MessageAppended(m) => {
                    let marker = match m.sender {
                        Sender::User => "you",
                        Sender::Remote => m.username.as_str(),
                    };
                    println!("[{marker}] {}", m.text);
                }
                StoreEvent::ErrorSet(e) => eprintln!("error: {}", e.message),
                StoreEvent::CurrentUserChanged(user) => {
                    println!("chatting as {user}");
                }
                StoreEvent::MessagesReplaced { count } => {
                    debug!(count, "message list replaced");
                }
                StoreEvent::ErrorCleared => {}
            }
        }
    });

    println!("connected to {url} as {}", client.current_user());

    // Show the backlog right away instead of waiting out the first tick.
    if client.engine().fetch_new().await.is_err() {
        eprintln!("initial fetch failed; will keep polling");
        client.clear_error();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if let Err(e) = client.send(text).await {
            eprintln!("send failed: {e}");
            client.clear_error();
        }
    }

    drop(client);
    printer.abort();
    Ok(())
}
