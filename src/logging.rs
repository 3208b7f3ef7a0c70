use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `VITALS_LOG=debug`.
pub const LOG_ENV: &str = "VITALS_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so they never mix with
/// the report on stdout.
pub fn init(json: bool, ansi: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(ansi).try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}
