use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::downloader::DownloaderConfig;
use crate::pipeline::PipelineConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Telegram bot settings. Without them only the admin endpoint runs.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Admin HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    10000
}

/// Authentication configuration for the admin endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when `method = "api_key"`.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Registry database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("classrelay.db")
}

/// Course site and playback resolver endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginConfig {
    /// Course site root (e.g., "https://rarestudy.site")
    #[serde(default = "default_origin_url")]
    pub base_url: String,
    /// Third-party service exchanging a video-data payload for an m3u8 URL
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,
    /// Per-request timeout. Unset means requests may stall indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: default_origin_url(),
            resolver_url: default_resolver_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_origin_url() -> String {
    "https://rarestudy.site".to_string()
}

fn default_resolver_url() -> String {
    "https://pdablu-yourl.wasmer.app".to_string()
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Long-poll timeout passed to getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Skip updates that queued up while the bot was offline
    #[serde(default = "default_true")]
    pub drop_pending_updates: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub origin: OriginConfig,
    pub downloader: DownloaderConfig,
    pub pipeline: PipelineConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<SanitizedTelegramConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Telegram config with the bot token hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub api_url: String,
    pub bot_token_configured: bool,
    pub poll_timeout_secs: u64,
    pub drop_pending_updates: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            server: config.server.clone(),
            database: config.database.clone(),
            origin: config.origin.clone(),
            downloader: config.downloader.clone(),
            pipeline: config.pipeline.clone(),
            telegram: config.telegram.as_ref().map(|t| SanitizedTelegramConfig {
                api_url: t.api_url.clone(),
                bot_token_configured: !t.bot_token.is_empty(),
                poll_timeout_secs: t.poll_timeout_secs,
                drop_pending_updates: t.drop_pending_updates,
            }),
        }
    }
}
