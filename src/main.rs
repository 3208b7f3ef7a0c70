use std::io::IsTerminal;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use vitals::app::App;
use vitals::config::{self, Config, OutputFormat, parse_interval, parse_window_ms};
use vitals::logging;
use vitals::watch::{Cycle, Scheduler, stop_channel};

#[derive(Parser, Debug)]
#[command(
    name = "vitals",
    version,
    about = "CPU, memory and uptime at a glance"
)]
struct Cli {
    /// Keep refreshing every SECONDS (fractions allowed) until Ctrl-C
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        num_args = 0..=1,
        default_missing_value = "1",
        allow_negative_numbers = true,
        value_parser = parse_interval
    )]
    watch: Option<Duration>,

    /// CPU measurement window in milliseconds
    #[arg(long, value_name = "MS", default_value = "1000", value_parser = parse_window_ms)]
    window_ms: Duration,

    /// Print one JSON object per refresh instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Also list utilization for each core
    #[arg(long, default_value_t = false)]
    per_core: bool,

    /// Disable colored output
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Emit diagnostics on stderr as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = config_for_cli(&cli);
    logging::init(cli.log_json, config.color)?;

    let mut app = App::new(config);
    match app.config().watch {
        None => app.run_once().await,
        Some(period) => {
            let (handle, signal) = stop_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.stop();
                }
            });
            Scheduler::new(period).run(&mut app, signal).await?;
            Ok(())
        }
    }
}

fn config_for_cli(cli: &Cli) -> Config {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());

    Config {
        watch: cli.watch,
        cpu_window: cli.window_ms,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        color: config::color_enabled(cli.no_color, no_color_env, std::io::stdout().is_terminal()),
        per_core: cli.per_core,
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("vitals").chain(args.iter().copied()))
    }

    #[test]
    fn one_shot_by_default() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.watch, None);
        assert_eq!(cli.window_ms, Duration::from_millis(1000));
        assert!(!cli.json);
    }

    #[test]
    fn bare_watch_flag_defaults_to_one_second() {
        let cli = parse(&["--watch"]).unwrap();
        assert_eq!(cli.watch, Some(Duration::from_secs(1)));
        let cli = parse(&["-w"]).unwrap();
        assert_eq!(cli.watch, Some(Duration::from_secs(1)));
    }

    #[test]
    fn fractional_watch_interval() {
        let cli = parse(&["-w", "2.5"]).unwrap();
        assert_eq!(cli.watch, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn invalid_watch_interval_is_a_usage_error() {
        for bad in ["0", "-1", "abc"] {
            let err = parse(&["--watch", bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{bad}");
        }
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = parse(&["--window-ms", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = parse(&["--json", "--per-core", "--no-color", "--window-ms", "250"]).unwrap();
        let config = config_for_cli(&cli);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.per_core);
        assert!(!config.color);
        assert_eq!(config.cpu_window, Duration::from_millis(250));
    }
}
