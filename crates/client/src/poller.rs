use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use enginedash_core::{endpoints, TelemetrySnapshot, TELEMETRY_PATH};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::{ConfigError, PollError};
use crate::view::TelemetryView;

pub const POLL_ERROR_MESSAGE: &str = "Error while downloading data!";

/// How a poll session ended.
#[derive(Debug)]
pub enum PollExit {
    Failed(PollError),
    Stopped,
}

pub struct TelemetryPoller {
    http: reqwest::Client,
    url: String,
    interval: Duration,
}

impl TelemetryPoller {
    pub fn new(http: reqwest::Client, url: impl Into<String>, interval: Duration) -> Self {
        // tokio intervals reject a zero period
        let interval = interval.max(Duration::from_millis(1));
        Self { http, url: url.into(), interval }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, ConfigError> {
        let http = config.http_client()?;
        let url = endpoints::join(&config.base_url, TELEMETRY_PATH);
        Ok(Self::new(http, url, config.poll_interval))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Starts the recurring fetch. The first request goes out one interval
    /// from now.
    pub fn start<V: TelemetryView>(self, view: V) -> PollHandle {
        let active = Arc::new(AtomicBool::new(true));
        let active_clone = active.clone();
        info!(url = %self.url, interval_ms = self.interval.as_millis() as u64, "Starting telemetry polling");
        let task = tokio::spawn(async move { run_poll_loop(self, view, active_clone).await });
        PollHandle { active, task: Some(task) }
    }
}

/// Owned handle to a running poll session. Dropping it stops the session.
pub struct PollHandle {
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<PollExit>>,
}

impl PollHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Cancels the timer. Safe to call any number of times.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            debug!("Telemetry polling stopped");
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Waits for the session to end, either through failure or [`stop`](Self::stop).
    pub async fn finished(mut self) -> PollExit {
        let Some(task) = self.task.take() else {
            return PollExit::Stopped;
        };
        match task.await {
            Ok(exit) => exit,
            Err(err) if err.is_cancelled() => PollExit::Stopped,
            Err(err) => {
                warn!(?err, "Telemetry poll task panicked");
                PollExit::Stopped
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn run_poll_loop<V: TelemetryView>(poller: TelemetryPoller, mut view: V, active: Arc<AtomicBool>) -> PollExit {
    let mut ticker = interval_at(Instant::now() + poller.interval, poller.interval);
    // A slow device must not cause a burst of catch-up requests
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !active.load(Ordering::Acquire) {
            return PollExit::Stopped;
        }

        let result = fetch_snapshot(&poller.http, &poller.url).await;
        if !active.load(Ordering::Acquire) {
            return PollExit::Stopped;
        }

        match result {
            Ok(snapshot) => {
                for (slot, reading) in snapshot.rendered().iter().enumerate() {
                    view.render_engine(slot, reading);
                }
            }
            Err(err) => {
                warn!(error = %err, url = %poller.url, "Telemetry poll failed; polling stopped");
                active.store(false, Ordering::Release);
                view.render_error(POLL_ERROR_MESSAGE);
                return PollExit::Failed(err);
            }
        }
    }
}

/// Performs one telemetry request and decodes the answer.
pub async fn fetch_snapshot(http: &reqwest::Client, url: &str) -> Result<TelemetrySnapshot, PollError> {
    let response = http.get(url).send().await.map_err(PollError::Network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(PollError::Http(status.as_u16()));
    }
    let body = response.bytes().await.map_err(PollError::Network)?;
    let snapshot = TelemetrySnapshot::decode(&body)?;
    debug!(%snapshot, "Telemetry received");
    Ok(snapshot)
}
