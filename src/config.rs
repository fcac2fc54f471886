// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// How the MCP server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Line-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl FromStr for Transport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(AppError::BadRequest(format!(
                "Unknown MCP_TRANSPORT '{}', expected 'stdio' or 'http'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CodeForge REST API, always ending in `/`.
    pub api_url: Url,
    pub api_timeout: Duration,
    pub cache_ttl: Duration,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub transport: Transport,
    pub listen_addr: String,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = parse_api_url(
            &env::var("CODEFORGE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;

        let api_timeout = Duration::from_secs(parse_secs("CODEFORGE_API_TIMEOUT_SECS", 30)?);
        let cache_ttl = Duration::from_secs(parse_secs("CODEFORGE_CACHE_TTL_SECS", 30)?);

        let token = env::var("CODEFORGE_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let token_file = env::var("CODEFORGE_TOKEN_FILE").ok().map(PathBuf::from);

        let transport = env::var("MCP_TRANSPORT")
            .unwrap_or_else(|_| "stdio".to_string())
            .parse()?;

        let listen_addr = env::var("MCP_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            api_url,
            api_timeout,
            cache_ttl,
            token,
            token_file,
            transport,
            listen_addr,
            rust_log,
            log_dir,
        })
    }

    /// Configuration pointing at `api_url` with every other value defaulted.
    pub fn for_api(api_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            api_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(30),
            token: None,
            token_file: None,
            transport: Transport::Http,
            listen_addr: "127.0.0.1:0".to_string(),
            rust_log: "error".to_string(),
            log_dir: "logs".to_string(),
        })
    }
}

/// Parses the API base URL and normalizes it so relative joins keep the path prefix.
pub fn parse_api_url(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(format!(
            "CODEFORGE_API_URL must be http(s), got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

fn parse_secs(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{} must be a number of seconds", key))),
        Err(_) => Ok(default),
    }
}
