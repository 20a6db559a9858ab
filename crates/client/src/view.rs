//! Rendering boundary between the client logic and whatever shows it.

/// Display slots fed by the telemetry poller.
pub trait TelemetryView: Send + 'static {
    /// `slot` is the engine position, `0..ENGINE_COUNT`.
    fn render_engine(&mut self, slot: usize, reading: &str);

    fn render_error(&mut self, message: &str);
}

/// Readout next to the power slider.
pub trait PowerReadout: Send {
    fn render_power(&mut self, text: &str);
}

/// Readout that shows nothing, for headless callers.
impl PowerReadout for () {
    fn render_power(&mut self, _text: &str) {}
}
