use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Production endpoint of the Roblox Open Cloud APIs.
pub const DEFAULT_ROBLOX_API_BASE: &str = "https://apis.roblox.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Scheme + host of the asset API, without a trailing slash
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub timeout_secs: u64,
    pub interval_secs: u64,
}

impl PollingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_ROBLOX_API_BASE.to_string(),
                request_timeout_secs: 30,
            },
            polling: PollingConfig {
                timeout_secs: 120,
                interval_secs: 3,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            upstream: UpstreamConfig {
                base_url: env::var("ROBLOX_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_ROBLOX_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                request_timeout_secs: env::var("UPSTREAM_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
            polling: PollingConfig {
                timeout_secs: env::var("UPLOAD_POLL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()?,
                interval_secs: env::var("UPLOAD_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
            },
        })
    }
}
