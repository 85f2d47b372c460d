//! One-shot message send.

use plugchat_client::{ChatClient, NullSink, RetryPolicy, SyncConfig};
use std::sync::Arc;

/// Sends a single message and exits.
pub async fn run(
    url: &str,
    nickname: Option<String>,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // One-shot: no delayed retry, the exit code is the outcome.
    let config = SyncConfig::new(url).with_retry(RetryPolicy::no_retry());
    let client = ChatClient::connect(config, Arc::new(NullSink));

    if let Some(nickname) = nickname {
        client.dispatch(
            "__receiveStateChange__",
            &serde_json::json!({ "currentUser": nickname }).to_string(),
        )?;
    }

    client.send(message).await?;
    println!("sent as {}", client.current_user());
    Ok(())
}
