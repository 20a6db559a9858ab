use serde::{Deserialize, Serialize};

use crate::endpoints::{direction_path, power_path, rotation_path};

pub const MIN_POWER: f64 = 5.0;
pub const MAX_POWER: f64 = 10.0;

/// Maps a slider percentage onto the motor power range. The input is not
/// clamped, so values outside 0..=100 land outside 5..=10.
pub fn power_from_percent(percent: f64) -> f64 {
    MIN_POWER + (MAX_POWER - MIN_POWER) * percent / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub fn code(self) -> u8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => 2,
            Direction::Left => 3,
            Direction::Right => 4,
        }
    }

    /// Name of the button that triggers this direction on the control page.
    pub fn class_name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Left,
    Right,
}

impl Rotation {
    pub fn code(self) -> u8 {
        match self {
            Rotation::Left => 1,
            Rotation::Right => 2,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Rotation::Left => "leftRotation",
            Rotation::Right => "rightRotation",
        }
    }
}

/// An operator gesture on the control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Control {
    Slider(f64), // percent, nominally 0..=100
    Direction(Direction),
    Rotation(Rotation),
    Stay,
    Button(String),
}

/// A one-shot outbound message for the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Command {
    Power(f64),
    Direction(Direction),
    Rotation(Rotation),
    Button(String),
}

impl Command {
    /// Route on the device's HTTP server, if this command has one.
    pub fn rest_path(&self) -> Option<String> {
        match self {
            Command::Power(power) => Some(power_path(*power)),
            Command::Direction(direction) => Some(direction_path(direction.code())),
            Command::Rotation(rotation) => Some(rotation_path(rotation.code())),
            Command::Button(_) => None,
        }
    }

    /// Text frame sent over the persistent socket.
    pub fn socket_payload(&self) -> String {
        match self {
            Command::Power(power) => format!("{:.2}", power),
            Command::Direction(direction) => direction.class_name().to_string(),
            Command::Rotation(rotation) => rotation.class_name().to_string(),
            Command::Button(class_name) => class_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_mapping_endpoints() {
        assert_eq!(power_from_percent(0.0), 5.0);
        assert_eq!(power_from_percent(50.0), 7.5);
        assert_eq!(power_from_percent(100.0), 10.0);
    }

    #[test]
    fn power_mapping_stays_in_range() {
        for p in 0..=100 {
            let power = power_from_percent(p as f64);
            assert!((MIN_POWER..=MAX_POWER).contains(&power), "p={} power={}", p, power);
        }
    }

    #[test]
    fn out_of_range_percent_is_not_clamped() {
        assert_eq!(power_from_percent(200.0), 15.0);
        assert_eq!(power_from_percent(-100.0), 0.0);
    }

    #[test]
    fn direction_and_rotation_codes() {
        assert_eq!(Direction::Forward.code(), 1);
        assert_eq!(Direction::Backward.code(), 2);
        assert_eq!(Direction::Left.code(), 3);
        assert_eq!(Direction::Right.code(), 4);
        assert_eq!(Rotation::Left.code(), 1);
        assert_eq!(Rotation::Right.code(), 2);
    }

    #[test]
    fn rest_paths() {
        assert_eq!(Command::Power(7.5).rest_path().as_deref(), Some("/power/7.5"));
        assert_eq!(Command::Direction(Direction::Left).rest_path().as_deref(), Some("/direction/3"));
        assert_eq!(Command::Rotation(Rotation::Right).rest_path().as_deref(), Some("/rotation/2"));
        assert_eq!(Command::Button("dot".into()).rest_path(), None);
    }

    #[test]
    fn socket_payloads() {
        assert_eq!(Command::Power(7.5).socket_payload(), "7.50");
        assert_eq!(Command::Power(5.0).socket_payload(), "5.00");
        assert_eq!(Command::Rotation(Rotation::Left).socket_payload(), "leftRotation");
        assert_eq!(Command::Button("dot".into()).socket_payload(), "dot");
    }

    #[test]
    fn control_serde_shape() {
        let json = serde_json::to_string(&Control::Direction(Direction::Right)).unwrap();
        assert_eq!(json, r#"{"type":"Direction","value":"right"}"#);
        let back: Control = serde_json::from_str(r#"{"type":"Slider","value":42.0}"#).unwrap();
        assert_eq!(back, Control::Slider(42.0));
    }
}
