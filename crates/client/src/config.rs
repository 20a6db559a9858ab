use std::env;
use std::time::Duration;

use serde::de::value::{self, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    #[serde(alias = "http")]
    Rest,
    #[serde(alias = "ws", alias = "websocket")]
    Socket,
}

/// Whether command sends are detached or awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delivery {
    #[default]
    #[serde(alias = "best_effort", alias = "besteffort")]
    BestEffort,
    #[serde(alias = "ack")]
    Acknowledged,
}

/// Reads a unit-variant enum from a raw env value by its serde name.
fn parse_variant<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let name = raw.trim().to_ascii_lowercase();
    let de: StrDeserializer<'_, value::Error> = name.as_str().into_deserializer();
    T::deserialize(de).ok()
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub transport: TransportKind,
    pub socket_url: Option<String>,
    pub delivery: Delivery,
    pub request_timeout: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.1.185:5000".to_string(),
            poll_interval: Duration::from_millis(500),
            transport: TransportKind::Rest,
            socket_url: None,
            delivery: Delivery::BestEffort,
            request_timeout: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = DashboardConfig::default();

        if let Some(v) = lookup("ENGINEDASH_BASE_URL") {
            if !v.is_empty() {
                cfg.base_url = v;
            }
        }
        if let Some(v) = lookup("ENGINEDASH_POLL_INTERVAL_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                if ms > 0 {
                    cfg.poll_interval = Duration::from_millis(ms);
                }
            }
        }
        if let Some(v) = lookup("ENGINEDASH_TRANSPORT") {
            if let Some(kind) = parse_variant::<TransportKind>(&v) {
                cfg.transport = kind;
            }
        }
        if let Some(v) = lookup("ENGINEDASH_SOCKET_URL") {
            if !v.is_empty() {
                cfg.socket_url = Some(v);
            }
        }
        if let Some(v) = lookup("ENGINEDASH_DELIVERY") {
            if let Some(delivery) = parse_variant::<Delivery>(&v) {
                cfg.delivery = delivery;
            }
        }
        if let Some(v) = lookup("ENGINEDASH_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                if ms > 0 {
                    cfg.request_timeout = Some(Duration::from_millis(ms));
                }
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = parse_url(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Scheme { url: self.base_url.clone(), expected: "http or https" });
        }
        if let Some(socket) = &self.socket_url {
            let url = parse_url(socket)?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(ConfigError::Scheme { url: socket.clone(), expected: "ws or wss" });
            }
        }
        Ok(())
    }

    /// Explicit socket URL, or the base URL with its scheme swapped to ws/wss.
    pub fn resolved_socket_url(&self) -> Result<String, ConfigError> {
        if let Some(socket) = &self.socket_url {
            return Ok(socket.clone());
        }
        let mut url = parse_url(&self.base_url)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::Scheme { url: self.base_url.clone(), expected: "http or https" })?;
        Ok(url.to_string())
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(ConfigError::HttpClient)
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { url: raw.to_string(), source })
}
