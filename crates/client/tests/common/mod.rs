#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use enginedash_client::{PowerReadout, TelemetryView};

#[derive(Clone)]
pub enum TelemetryReply {
    Json(&'static str),
    Status(u16),
    Body(&'static str),
    /// Answers with the JSON body after the given delay.
    Slow(Duration, &'static str),
}

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<String>>>,
    frames: Arc<Mutex<Vec<String>>>,
    telemetry: Arc<Mutex<TelemetryReply>>,
    command_status: Arc<AtomicU16>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

// Counts a telemetry request as in flight until the handler finishes or is dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(state: &StubState) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state.in_flight.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-process stand-in for the device's HTTP and WebSocket server.
pub struct DeviceStub {
    pub addr: SocketAddr,
    state: StubState,
}

impl DeviceStub {
    pub async fn spawn(telemetry: TelemetryReply) -> Self {
        let state = StubState {
            requests: Arc::new(Mutex::new(Vec::new())),
            frames: Arc::new(Mutex::new(Vec::new())),
            telemetry: Arc::new(Mutex::new(telemetry)),
            command_status: Arc::new(AtomicU16::new(200)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        };
        let app = Router::new()
            .route("/get-data", get(telemetry_handler))
            .route("/ws", get(ws_handler))
            .fallback(command_handler)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn socket_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn set_command_status(&self, status: u16) {
        self.state.command_status.store(status, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.requests().into_iter().filter(|p| p.starts_with(prefix)).collect()
    }

    /// Highest number of telemetry requests the stub was serving at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<String> {
        self.state.frames.lock().unwrap().clone()
    }
}

async fn telemetry_handler(State(state): State<StubState>) -> Response {
    state.requests.lock().unwrap().push("/get-data".to_string());
    let _in_flight = InFlight::enter(&state);
    let reply = state.telemetry.lock().unwrap().clone();
    match reply {
        TelemetryReply::Slow(delay, body) => {
            tokio::time::sleep(delay).await;
            ([("content-type", "application/json")], body).into_response()
        }
        TelemetryReply::Json(body) => ([("content-type", "application/json")], body).into_response(),
        TelemetryReply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        TelemetryReply::Body(body) => body.into_response(),
    }
}

async fn command_handler(State(state): State<StubState>, uri: Uri) -> StatusCode {
    state.requests.lock().unwrap().push(uri.path().to_string());
    StatusCode::from_u16(state.command_status.load(Ordering::SeqCst)).unwrap()
}

async fn ws_handler(State(state): State<StubState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| record_frames(state, socket))
}

async fn record_frames(state: StubState, mut socket: WebSocket) {
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => state.frames.lock().unwrap().push(text),
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Address nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[derive(Clone, Default)]
pub struct RecordingView {
    pub engines: Arc<Mutex<Vec<(usize, String)>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingView {
    pub fn engines(&self) -> Vec<(usize, String)> {
        self.engines.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl TelemetryView for RecordingView {
    fn render_engine(&mut self, slot: usize, reading: &str) {
        self.engines.lock().unwrap().push((slot, reading.to_string()));
    }

    fn render_error(&mut self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[derive(Clone, Default)]
pub struct RecordingReadout(pub Arc<Mutex<Vec<String>>>);

impl RecordingReadout {
    pub fn shown(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl PowerReadout for RecordingReadout {
    fn render_power(&mut self, text: &str) {
        self.0.lock().unwrap().push(text.to_string());
    }
}
