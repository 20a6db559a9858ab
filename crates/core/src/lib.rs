pub mod commands;
pub mod endpoints;
pub mod telemetry;

pub use commands::{power_from_percent, Command, Control, Direction, Rotation, MAX_POWER, MIN_POWER};
pub use endpoints::{direction_path, power_path, rotation_path, TELEMETRY_PATH};
pub use telemetry::{format_reading, round_hundredths, DecodeError, KeyBase, TelemetrySnapshot, ENGINE_COUNT};
