//! Runtime configuration and its defaults.
//!
//! Every value can be given on the command line or through the environment variable
//! named next to its default.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::chess::Color;
use crate::engine::EngineKind;

/// Peer to connect to, overridden by `BOARDLINK_URL`.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080";

/// Websocket sub-protocol both ends insist on, overridden by `BOARDLINK_PROTOCOL`.
pub const DEFAULT_PROTOCOL: &str = "rust-websocket";

/// Engine search depth in plies, overridden by `BOARDLINK_DEPTH`.
pub const DEFAULT_DEPTH: u32 = 3;

/// Address the peer listens on, overridden by `BOARDLINK_BIND`.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// How long the session sleeps when nothing happened.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

pub const URL_ENV: &str = "BOARDLINK_URL";
pub const PROTOCOL_ENV: &str = "BOARDLINK_PROTOCOL";
pub const DEPTH_ENV: &str = "BOARDLINK_DEPTH";
pub const BIND_ENV: &str = "BOARDLINK_BIND";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid url \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported scheme \"{0}\", expected ws or wss")]
    UnsupportedScheme(String),
    #[error("invalid bind address \"{0}\"")]
    InvalidBind(String),
}

/// Parses a peer address, accepting only websocket schemes.
pub fn parse_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|err| ConfigError::InvalidUrl {
        url: s.to_owned(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme(scheme.to_owned())),
    }
}

pub fn parse_bind(s: &str) -> Result<SocketAddr, ConfigError> {
    s.parse().map_err(|_| ConfigError::InvalidBind(s.to_owned()))
}

/// Settings for playing against the engine through a peer.
#[derive(Debug, Clone)]
pub struct PlayConfig {
    pub url: Url,
    pub protocol: String,
    pub human: Color,
    pub engine: EngineKind,
    pub depth: u32,
    pub poll_interval: Duration,
}

impl Default for PlayConfig {
    fn default() -> Self {
        PlayConfig {
            url: Url::parse(DEFAULT_URL).expect("default url is valid"),
            protocol: DEFAULT_PROTOCOL.to_owned(),
            human: Color::White,
            engine: EngineKind::Minimax,
            depth: DEFAULT_DEPTH,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}
