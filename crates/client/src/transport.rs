use std::sync::Arc;

use enginedash_core::{endpoints, Command};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::config::{DashboardConfig, TransportKind};
use crate::error::{CommandError, TransportSetupError};

/// One-shot GETs against the device's HTTP routes.
#[derive(Clone)]
pub struct RestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl RestTransport {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    pub fn url_for(&self, command: &Command) -> Result<String, CommandError> {
        let path = command
            .rest_path()
            .ok_or_else(|| CommandError::Unsupported(format!("{:?}", command)))?;
        Ok(endpoints::join(&self.base_url, &path))
    }

    pub async fn send(&self, command: &Command) -> Result<(), CommandError> {
        let url = self.url_for(command)?;
        debug!(%url, "Sending command");
        let response = self.http.get(&url).send().await.map_err(CommandError::Request)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CommandError::Status(status.as_u16()))
        }
    }
}

struct Outbound {
    payload: String,
    ack: Option<oneshot::Sender<Result<(), CommandError>>>,
}

/// Persistent WebSocket carrying commands as text frames.
#[derive(Clone)]
pub struct SocketTransport {
    tx: mpsc::UnboundedSender<Outbound>,
    // Keep the IO tasks tied to the transport's lifetime
    _writer: Arc<AbortOnDrop>,
    _reader: Arc<AbortOnDrop>,
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl SocketTransport {
    pub async fn connect(url: &str) -> Result<Self, CommandError> {
        info!(%url, "Connecting command socket");
        let (ws_stream, _) = connect_async(url).await.map_err(CommandError::Socket)?;
        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();

        let writer = tokio::spawn(async move {
            while let Some(outbound) = rx.recv().await {
                let result = write.send(Message::Text(outbound.payload)).await.map_err(CommandError::Socket);
                match outbound.ack {
                    Some(ack) => {
                        let _ = ack.send(result);
                    }
                    None => {
                        if let Err(err) = result {
                            debug!(error = %err, "Dropped command frame");
                        }
                    }
                }
            }
            let _ = write.close().await;
        });

        // Draining the read half keeps ping/pong and close handshakes flowing
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Close(frame)) => {
                        info!(?frame, "Command socket closed by device");
                        break;
                    }
                    Ok(other) => trace!(?other, "Command socket inbound frame"),
                    Err(err) => {
                        warn!(error = %err, "Command socket read error");
                        break;
                    }
                }
            }
        });

        Ok(Self { tx, _writer: Arc::new(AbortOnDrop(writer)), _reader: Arc::new(AbortOnDrop(reader)) })
    }

    /// Queues a frame without waiting for it to be written.
    pub fn send_detached(&self, command: &Command) -> Result<(), CommandError> {
        self.tx
            .send(Outbound { payload: command.socket_payload(), ack: None })
            .map_err(|_| CommandError::Closed)
    }

    /// Queues a frame and waits until the writer has flushed it.
    pub async fn send(&self, command: &Command) -> Result<(), CommandError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Outbound { payload: command.socket_payload(), ack: Some(ack_tx) })
            .map_err(|_| CommandError::Closed)?;
        ack_rx.await.map_err(|_| CommandError::Closed)?
    }
}

#[derive(Clone)]
pub enum CommandTransport {
    Rest(RestTransport),
    Socket(SocketTransport),
}

impl CommandTransport {
    pub async fn from_config(config: &DashboardConfig) -> Result<Self, TransportSetupError> {
        match config.transport {
            TransportKind::Rest => {
                let http = config.http_client()?;
                Ok(CommandTransport::Rest(RestTransport::new(http, config.base_url.clone())))
            }
            TransportKind::Socket => {
                let url = config.resolved_socket_url()?;
                Ok(CommandTransport::Socket(SocketTransport::connect(&url).await?))
            }
        }
    }

    pub async fn send(&self, command: &Command) -> Result<(), CommandError> {
        match self {
            CommandTransport::Rest(rest) => rest.send(command).await,
            CommandTransport::Socket(socket) => socket.send(command).await,
        }
    }

    /// Fire-and-forget: failures are logged and dropped.
    pub fn send_detached(&self, command: Command) {
        match self {
            CommandTransport::Rest(rest) => {
                let rest = rest.clone();
                tokio::spawn(async move {
                    if let Err(err) = rest.send(&command).await {
                        debug!(error = %err, ?command, "Best-effort command not delivered");
                    }
                });
            }
            CommandTransport::Socket(socket) => {
                if let Err(err) = socket.send_detached(&command) {
                    debug!(error = %err, ?command, "Best-effort command not delivered");
                }
            }
        }
    }
}
