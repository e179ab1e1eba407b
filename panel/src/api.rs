//! HTTP client for the bot-supervisor backend.
//!
//! Four endpoints, no auth, no envelope beyond the fields below. Command
//! endpoints reply `{"message": "..."}` on both success and rejection;
//! the status endpoint replies a JSON object keyed by bot id whose entry
//! order is meaningful (the panel renders bots in server order).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::state::{BotStatus, Snapshot};

/// Errors a backend call can produce. `Rejected` means the server answered
/// with a non-2xx and (usually) a human-readable message; `Transport` means
/// the request never completed cleanly, so the server's actual effect is
/// unknown to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.without_url().to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct StartBotRequest {
    pub bot_id: String,
    pub data_file: String,
    pub symbol: String,
}

#[derive(Serialize)]
struct StopBotRequest<'a> {
    bot_id: &'a str,
}

#[derive(Deserialize)]
struct CommandReply {
    message: String,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /list_datasets — the selectable input files. Called once at startup.
    pub async fn list_datasets(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/list_datasets", self.base_url);
        let datasets = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<String>>()
            .await?;
        Ok(datasets)
    }

    /// GET /status — the full snapshot of every known bot, in server order.
    pub async fn fetch_status(&self) -> Result<Snapshot, ApiError> {
        let url = format!("{}/status", self.base_url);
        // serde_json is built with `preserve_order`, so Map iteration follows
        // the response object's insertion order.
        let map = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Map<String, Value>>()
            .await?;

        let mut bots = Vec::with_capacity(map.len());
        for (bot_id, value) in map {
            let status: BotStatus = serde_json::from_value(value)
                .map_err(|e| ApiError::Transport(format!("bad status entry {bot_id}: {e}")))?;
            bots.push((bot_id, status));
        }
        Ok(bots)
    }

    /// POST /start_bot — launch a new bot. Returns the server message.
    pub async fn start_bot(&self, req: &StartBotRequest) -> Result<String, ApiError> {
        self.post_command("/start_bot", req).await
    }

    /// POST /stop_bot — stop a running bot. Returns the server message.
    pub async fn stop_bot(&self, bot_id: &str) -> Result<String, ApiError> {
        self.post_command("/stop_bot", &StopBotRequest { bot_id }).await
    }

    async fn post_command<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let message = reply_message(&text);

        if status.is_success() {
            Ok(message)
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Pull the `message` field out of a command reply, falling back to the raw
/// body when it is not the expected JSON shape.
fn reply_message(body: &str) -> String {
    serde_json::from_str::<CommandReply>(body)
        .map(|r| r.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_message_reads_json_field() {
        assert_eq!(
            reply_message(r#"{"message": "Bot alpha started."}"#),
            "Bot alpha started."
        );
    }

    #[test]
    fn reply_message_falls_back_to_raw_body() {
        assert_eq!(reply_message("502 Bad Gateway\n"), "502 Bad Gateway");
    }

    #[test]
    fn reply_message_ignores_extra_fields() {
        // start_bot can attach `output`/`error` alongside the message
        assert_eq!(
            reply_message(r#"{"message": "crashed", "output": "", "error": "boom"}"#),
            "crashed"
        );
    }
}
