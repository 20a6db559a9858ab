use enginedash_core::{power_from_percent, Command, Control};
use tracing::debug;

use crate::config::Delivery;
use crate::error::CommandError;
use crate::transport::CommandTransport;
use crate::view::PowerReadout;

/// Turns operator gestures into device commands. Independent of telemetry
/// polling: commands go out whether or not a poll session is alive.
pub struct CommandDispatcher<R: PowerReadout> {
    transport: CommandTransport,
    delivery: Delivery,
    readout: R,
    slider_percent: f64,
}

impl<R: PowerReadout> CommandDispatcher<R> {
    pub fn new(transport: CommandTransport, delivery: Delivery, readout: R) -> Self {
        Self { transport, delivery, readout, slider_percent: 0.0 }
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Last slider position seen; `Stay` re-sends the power for it.
    pub fn slider_percent(&self) -> f64 {
        self.slider_percent
    }

    pub async fn handle(&mut self, control: Control) -> Result<(), CommandError> {
        let command = self.command_for(control);
        debug!(?command, delivery = ?self.delivery, "Dispatching command");
        match self.delivery {
            Delivery::BestEffort => {
                self.transport.send_detached(command);
                Ok(())
            }
            Delivery::Acknowledged => self.transport.send(&command).await,
        }
    }

    fn command_for(&mut self, control: Control) -> Command {
        match control {
            Control::Slider(percent) => {
                self.slider_percent = percent;
                self.readout.render_power(&format!("{} %", percent));
                Command::Power(power_from_percent(percent))
            }
            Control::Stay => Command::Power(power_from_percent(self.slider_percent)),
            Control::Direction(direction) => Command::Direction(direction),
            Control::Rotation(rotation) => Command::Rotation(rotation),
            Control::Button(class_name) => Command::Button(class_name),
        }
    }
}
