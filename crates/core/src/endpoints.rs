// Route layout helpers matching the device's HTTP server

pub const TELEMETRY_PATH: &str = "/get-data";

pub fn power_path(power: f64) -> String {
    format!("/power/{}", power)
}

pub fn direction_path(code: u8) -> String {
    format!("/direction/{}", code)
}

pub fn rotation_path(code: u8) -> String {
    format!("/rotation/{}", code)
}

/// Joins a base URL such as `http://host:5000/` with one of the paths above.
pub fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
