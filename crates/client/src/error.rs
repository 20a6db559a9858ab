use enginedash_core::DecodeError;
use thiserror::Error;

/// Why a telemetry poll failed. All variants end the poll session the same way.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("telemetry request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("telemetry endpoint answered HTTP {0}")]
    Http(u16),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("command endpoint answered HTTP {0}")]
    Status(u16),
    #[error("command socket error: {0}")]
    Socket(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("command socket is closed")]
    Closed,
    #[error("{0} has no route on the REST transport")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL {url:?} must use {expected}")]
    Scheme { url: String, expected: &'static str },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connect(#[from] CommandError),
}
