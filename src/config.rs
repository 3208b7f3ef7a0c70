use std::time::Duration;

use crate::system::cpu::DEFAULT_WINDOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runtime settings, assembled from command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Refresh period; `None` samples once and exits.
    pub watch: Option<Duration>,
    pub cpu_window: Duration,
    pub format: OutputFormat,
    pub color: bool,
    pub per_core: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch: None,
            cpu_window: DEFAULT_WINDOW,
            format: OutputFormat::Text,
            color: true,
            per_core: false,
        }
    }
}

/// Parse a watch interval given in (possibly fractional) seconds.
pub fn parse_interval(raw: &str) -> Result<Duration, String> {
    let invalid = || format!("`{raw}` is not a valid positive number of seconds");
    let secs: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

/// Parse the CPU measurement window in whole milliseconds.
pub fn parse_window_ms(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(format!("`{raw}` is not a valid positive number of milliseconds")),
    }
}

/// Colors are on unless disabled by flag, by `NO_COLOR`, or by a non-terminal stdout.
pub fn color_enabled(no_color_flag: bool, no_color_env: bool, stdout_is_tty: bool) -> bool {
    !no_color_flag && !no_color_env && stdout_is_tty
}
