//! Gridpulse CLI
//!
//! Runs the dashboard against a headless grid and reports what it measured.
//!
//! # Configuration
//!
//! Settings come from `--config`, else `~/.config/gridpulse/config.toml` or
//! `./gridpulse.toml`, with these environment overrides:
//! - `GRIDPULSE_FRAME_INTERVAL_MS`: Minimum time between frames
//! - `GRIDPULSE_HIGH_RATE`: High-rate alert threshold (updates/sec)
//! - `GRIDPULSE_GAPS_ENABLED`: Enable synthetic message gaps
//! - `GRIDPULSE_LOG_LEVEL` / `GRIDPULSE_LOG_FORMAT`: Logging (pretty or json)
//! - `RUST_LOG`: Full filter directive, wins over the configured level

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridpulse::config::{generate_default_config, Config, LoggingConfig};
use gridpulse::{Command, Dashboard, DashboardEvent, DashboardSnapshot, HeadlessGrid};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gridpulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bounded-rate grid updates with rate monitoring and alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dashboard against a headless grid
    Run {
        /// Config file (default: search standard locations)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// How long to run, in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,
        /// Seed for reproducible datasets and gaps
        #[arg(long)]
        seed: Option<u64>,
        /// Disable synthetic message gaps
        #[arg(long)]
        no_gaps: bool,
        /// Enable the stream panel
        #[arg(long)]
        stream: bool,
        /// First visible row
        #[arg(long)]
        first: Option<usize>,
        /// Last visible row (default: first + 49)
        #[arg(long, requires = "first")]
        last: Option<usize>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            duration,
            seed,
            no_gaps,
            stream,
            first,
            last,
            json,
        } => {
            let mut config = match config {
                Some(path) => Config::load_with_env(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?,
                // Logging is not configured yet; a scoped subscriber keeps
                // warnings about unreadable config files visible
                None => tracing::subscriber::with_default(
                    bootstrap_subscriber(std::io::stderr),
                    Config::load_default,
                ),
            };

            if seed.is_some() {
                config.data.seed = seed;
            }
            if no_gaps {
                config.gaps.enabled = false;
            }
            if stream {
                config.stream.enabled = true;
            }

            init_tracing(&config.logging);
            tracing::info!("Gridpulse v{}", env!("CARGO_PKG_VERSION"));

            let snapshot = run(config, Duration::from_secs(duration), viewport(first, last)).await?;
            print_summary(&snapshot, json)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("Failed to create {:?}", parent))?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Subscriber used while the config (and with it the log settings) loads
fn bootstrap_subscriber<W>(make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "gridpulse=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("gridpulse={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Viewport from `--first`/`--last`; `last` defaults to a 50-row window
fn viewport(first: Option<usize>, last: Option<usize>) -> Option<(usize, usize)> {
    first.map(|first| (first, last.unwrap_or(first.saturating_add(49))))
}

async fn run(
    config: Config,
    duration: Duration,
    viewport: Option<(usize, usize)>,
) -> Result<DashboardSnapshot> {
    let dashboard =
        Dashboard::new(config, HeadlessGrid::new()).context("Failed to build dashboard")?;
    let mut events = dashboard.subscribe();
    let handle = dashboard.spawn();

    if let Some((first, last)) = viewport {
        handle.send(Command::ViewportChanged { first, last })?;
    }

    let logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for ctrl-c")?;
            tracing::info!("Interrupted");
        }
    }

    tracing::info!("Shutting down...");
    let final_snapshot = handle.watch();
    let grid = handle.shutdown().await?;
    logger.abort();
    let snapshot = final_snapshot.borrow().clone();

    tracing::info!(
        rows = grid.rows().len(),
        transactions = grid.transactions,
        rows_applied = grid.rows_applied,
        "Grid totals"
    );

    Ok(snapshot)
}

fn log_event(event: &DashboardEvent) {
    match event {
        DashboardEvent::AlertRaised { alert } => {
            tracing::warn!(kind = %alert.kind, id = alert.id, "{}", alert.message);
        }
        DashboardEvent::AlertCleared { kind } => {
            tracing::info!(%kind, "Alert cleared");
        }
        DashboardEvent::PauseChanged { paused, source } => {
            tracing::info!(paused, ?source, "Pause changed");
        }
        DashboardEvent::RateSample(_) | DashboardEvent::StreamAverage { .. } => {
            tracing::debug!(event = event.name(), "Dashboard event");
        }
    }
}

fn print_summary(snapshot: &DashboardSnapshot, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(snapshot).context("Failed to encode snapshot")?;
        println!("{}", out);
        return Ok(());
    }

    let paused = if snapshot.paused { " (paused)" } else { "" };
    println!("Rate:      {:.0} updates/s{}", snapshot.current_rate, paused);
    println!(
        "Frames:    {} rendered, {} suppressed",
        snapshot.render.frames_rendered, snapshot.render.frames_suppressed
    );
    println!("Latency:   {:.3} ms", snapshot.average_latency_ms);
    println!("Viewport:  rows {}..={}", snapshot.visible.start, snapshot.visible.end);

    if let Some(average) = snapshot.stream_average {
        println!("Stream:    {:.2} average", average);
    }

    let chart: Vec<String> = snapshot
        .samples
        .iter()
        .map(|s| format!("{} {:.0}", s.time, s.rate))
        .collect();
    if !chart.is_empty() {
        println!("Samples:   {}", chart.join(", "));
    }

    if snapshot.alerts.is_empty() {
        println!("Alerts:    none");
    } else {
        println!("Alerts:");
        for alert in &snapshot.alerts {
            println!("  [{}] {}: {}", alert.timestamp, alert.kind, alert.message);
        }
    }
    for alert in &snapshot.stream_alerts {
        println!("  [{}] {}: {}", alert.timestamp, alert.kind, alert.message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Log output captured in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_broken_config_file_is_reported_before_logging_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridpulse.toml");
        std::fs::write(&path, "[render\nframe_interval_ms = ").unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let config = tracing::subscriber::with_default(
            bootstrap_subscriber(move || writer.clone()),
            || Config::load_first(&[path.clone()]),
        );

        // Falls back to defaults, but says so
        assert_eq!(config.render.frame_interval_ms, 66);
        let logs = captured.text();
        assert!(logs.contains("Failed to load config"), "logs: {}", logs);
        assert!(logs.contains("gridpulse.toml"), "logs: {}", logs);
    }

    #[test]
    fn test_viewport_defaults_to_fifty_rows() {
        assert_eq!(viewport(None, Some(10)), None);
        assert_eq!(viewport(Some(100), None), Some((100, 149)));
        assert_eq!(viewport(Some(100), Some(120)), Some((100, 120)));
    }

    #[test]
    fn test_viewport_near_usize_max_saturates() {
        assert_eq!(
            viewport(Some(usize::MAX - 10), None),
            Some((usize::MAX - 10, usize::MAX))
        );
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "gridpulse", "run", "--duration", "3", "--seed", "7", "--no-gaps", "--first", "20",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { duration, seed, no_gaps, first, last, .. } => {
                assert_eq!(duration, 3);
                assert_eq!(seed, Some(7));
                assert!(no_gaps);
                assert_eq!(first, Some(20));
                assert_eq!(last, None);
            }
            Commands::Config { .. } => panic!("Expected run command"),
        }
    }
}
