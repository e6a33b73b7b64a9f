/// Configuration management
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HISTORY_PAGE_SIZE: usize = 50;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST API (e.g. https://api.example.com)
    pub api_url: String,

    /// URL of the realtime websocket endpoint (e.g. wss://api.example.com/socket)
    pub socket_url: String,

    /// Bearer token for the authenticated session
    pub token: String,

    /// Our own user id (sender identity for optimistic placeholders)
    pub user_id: String,

    /// Timeout applied to every REST request
    pub request_timeout: Duration,

    /// Number of messages fetched per history page
    pub history_page_size: usize,
}

impl Config {
    /// Create config from command line arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() < 3 {
            return Err(ChatError::Config(format!(
                "Usage: {} <api-url> <socket-url> [--token <token>] [--user <id>] [--timeout-secs <n>] [--page-size <n>]",
                args.first().map(|s| s.as_str()).unwrap_or("shelfchat")
            )));
        }

        let api_url = args[1].trim_end_matches('/').to_string();
        let socket_url = args[2].to_string();

        let mut token: Option<String> = None;
        let mut user_id: Option<String> = None;
        let mut timeout_secs: u64 = 10;
        let mut history_page_size = DEFAULT_HISTORY_PAGE_SIZE;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--token" => {
                    let t = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--token requires a value".to_string())
                    })?;
                    token = Some(t.clone());
                    i += 2;
                }
                "--user" => {
                    let u = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--user requires a value".to_string())
                    })?;
                    user_id = Some(u.clone());
                    i += 2;
                }
                "--timeout-secs" => {
                    let s = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--timeout-secs requires a value".to_string())
                    })?;
                    timeout_secs = s.parse::<u64>().map_err(|_| {
                        ChatError::Config("--timeout-secs must be a number".to_string())
                    })?;
                    i += 2;
                }
                "--page-size" => {
                    let s = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--page-size requires a value".to_string())
                    })?;
                    history_page_size = s.parse::<usize>().map_err(|_| {
                        ChatError::Config("--page-size must be a number".to_string())
                    })?;
                    i += 2;
                }
                other => {
                    return Err(ChatError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }

        // Env overrides (nice for scripts)
        if let Ok(t) = std::env::var("SHELFCHAT_TOKEN") {
            token = Some(t);
        }
        if let Ok(u) = std::env::var("SHELFCHAT_USER") {
            user_id = Some(u);
        }
        if let Some(s) = std::env::var("SHELFCHAT_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            history_page_size = s;
        }

        let token = token.ok_or_else(|| {
            ChatError::Config("A session token is required (--token or SHELFCHAT_TOKEN)".to_string())
        })?;
        let user_id = user_id.ok_or_else(|| {
            ChatError::Config("A user id is required (--user or SHELFCHAT_USER)".to_string())
        })?;

        Ok(Self {
            api_url,
            socket_url,
            token,
            user_id,
            request_timeout: Duration::from_secs(timeout_secs),
            history_page_size,
        })
    }
}
