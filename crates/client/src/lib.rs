pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod transport;
pub mod view;

pub use config::{DashboardConfig, Delivery, TransportKind};
pub use dispatcher::CommandDispatcher;
pub use error::{CommandError, ConfigError, PollError, TransportSetupError};
pub use poller::{fetch_snapshot, PollExit, PollHandle, TelemetryPoller, POLL_ERROR_MESSAGE};
pub use transport::{CommandTransport, RestTransport, SocketTransport};
pub use view::{PowerReadout, TelemetryView};
