use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub notice_ttl_secs: u64,
    pub log_file: String,
}

impl Config {
    /// Load config from the environment, reading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server_url: env("PANEL_SERVER_URL", "http://127.0.0.1:5000"),
            poll_interval_secs: env_u64("PANEL_POLL_INTERVAL_SECS", "2")?,
            http_timeout_secs: env_u64("PANEL_HTTP_TIMEOUT_SECS", "10")?,
            notice_ttl_secs: env_u64("PANEL_NOTICE_TTL_SECS", "5")?,
            log_file: env("PANEL_LOG_FILE", "botpanel.log"),
        })
    }
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: &str) -> Result<u64> {
    let val = env(key, default);
    val.parse()
        .with_context(|| format!("Invalid integer for {key}: {val}"))
}
