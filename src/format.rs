pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// Two-decimal gibibytes, e.g. `15.98`.
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2}", bytes_to_gib(bytes))
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}")
}

pub fn format_uptime_hours(secs: u64) -> String {
    format!("{:.1}", secs as f64 / 3600.0)
}
