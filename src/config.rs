//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::grid::VisibleRange;
use crate::monitor::MonitorConfig;
use crate::render::{RateBasis, RenderConfig};
use crate::stream::StreamConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub monitor: MonitorSettings,

    #[serde(default)]
    pub gaps: GapSettings,

    #[serde(default)]
    pub stream: StreamSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Synthetic dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_dataset_count")]
    pub dataset_count: usize,

    #[serde(default = "default_rows_per_dataset")]
    pub rows_per_dataset: usize,

    /// Fixed seed for reproducible datasets and gaps
    pub seed: Option<u64>,
}

fn default_dataset_count() -> usize {
    10
}

fn default_rows_per_dataset() -> usize {
    1000
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_count: default_dataset_count(),
            rows_per_dataset: default_rows_per_dataset(),
            seed: None,
        }
    }
}

/// Render loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,

    /// Scheduling tick; frames run on the first tick past the frame interval
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_latency_window")]
    pub latency_window: usize,

    #[serde(default)]
    pub rate_basis: RateBasis,

    #[serde(default = "default_visible_start")]
    pub visible_start: usize,

    #[serde(default = "default_visible_end")]
    pub visible_end: usize,
}

fn default_frame_interval() -> u64 {
    66 // ~15 frames per second
}

fn default_tick_interval() -> u64 {
    16
}

fn default_latency_window() -> usize {
    10
}

fn default_visible_start() -> usize {
    0
}

fn default_visible_end() -> usize {
    50
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            tick_interval_ms: default_tick_interval(),
            latency_window: default_latency_window(),
            rate_basis: RateBasis::default(),
            visible_start: default_visible_start(),
            visible_end: default_visible_end(),
        }
    }
}

impl RenderSettings {
    pub fn render_config(&self, flush_interval: Duration) -> RenderConfig {
        RenderConfig {
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            frame_tolerance: self.tick_interval() / 2,
            flush_interval,
            latency_window: self.latency_window,
            rate_basis: self.rate_basis,
        }
    }

    pub fn visible_range(&self) -> VisibleRange {
        VisibleRange::new(self.visible_start, self.visible_end)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Rate monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_monitor_interval")]
    pub interval_ms: u64,

    #[serde(default = "default_high_rate")]
    pub high_rate_threshold: f64,

    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,

    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    #[serde(default = "default_min_sample_interval")]
    pub min_sample_interval_ms: u64,
}

fn default_monitor_interval() -> u64 {
    1000
}

fn default_high_rate() -> f64 {
    1000.0
}

fn default_max_alerts() -> usize {
    3
}

fn default_max_samples() -> usize {
    20
}

fn default_min_sample_interval() -> u64 {
    50
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_monitor_interval(),
            high_rate_threshold: default_high_rate(),
            max_alerts: default_max_alerts(),
            max_samples: default_max_samples(),
            min_sample_interval_ms: default_min_sample_interval(),
        }
    }
}

impl MonitorSettings {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_millis(self.interval_ms),
            high_rate_threshold: self.high_rate_threshold,
            max_alerts: self.max_alerts,
            max_samples: self.max_samples,
            min_sample_interval: Duration::from_millis(self.min_sample_interval_ms),
        }
    }
}

/// Synthetic gap injection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GapSettings {
    #[serde(default = "default_gaps_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gap_min_delay")]
    pub min_delay_ms: u64,

    #[serde(default = "default_gap_max_delay")]
    pub max_delay_ms: u64,

    #[serde(default = "default_gap_hold")]
    pub hold_ms: u64,
}

fn default_gaps_enabled() -> bool {
    true
}

fn default_gap_min_delay() -> u64 {
    5000
}

fn default_gap_max_delay() -> u64 {
    15000
}

fn default_gap_hold() -> u64 {
    3000
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            enabled: default_gaps_enabled(),
            min_delay_ms: default_gap_min_delay(),
            max_delay_ms: default_gap_max_delay(),
            hold_ms: default_gap_hold(),
        }
    }
}

/// Stream processor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_stream_interval")]
    pub interval_ms: u64,

    #[serde(default = "default_stream_window")]
    pub window_ms: u64,

    #[serde(default)]
    pub lower_bound: f64,

    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,

    /// Synthetic values are drawn from `[0, max_value)`
    #[serde(default = "default_max_value")]
    pub max_value: f64,

    #[serde(default = "default_stream_alerts")]
    pub max_alerts: usize,
}

fn default_stream_interval() -> u64 {
    100
}

fn default_stream_window() -> u64 {
    1000
}

fn default_upper_bound() -> f64 {
    10_000.0
}

fn default_max_value() -> f64 {
    15_000.0
}

fn default_stream_alerts() -> usize {
    5
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_stream_interval(),
            window_ms: default_stream_window(),
            lower_bound: 0.0,
            upper_bound: default_upper_bound(),
            max_value: default_max_value(),
            max_alerts: default_stream_alerts(),
        }
    }
}

impl StreamSettings {
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            window: Duration::from_millis(self.window_ms),
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            max_alerts: self.max_alerts,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        Self::load_first(&Self::default_paths())
    }

    /// Standard config locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("gridpulse").join("config.toml"))
            .into_iter()
            .chain(std::iter::once(PathBuf::from("./gridpulse.toml")))
            .collect()
    }

    /// Load the first of `paths` that exists and parses, else defaults
    ///
    /// A file that exists but fails to load is skipped with a warning.
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {:?}: {}", path, e);
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("render.frame_interval_ms must be > 0".into()));
        }
        if self.render.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("render.tick_interval_ms must be > 0".into()));
        }
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::Invalid("monitor.interval_ms must be > 0".into()));
        }
        if self.monitor.max_alerts == 0 || self.stream.max_alerts == 0 {
            return Err(ConfigError::Invalid("max_alerts must be > 0".into()));
        }
        if self.gaps.min_delay_ms > self.gaps.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "gaps.min_delay_ms ({}) exceeds gaps.max_delay_ms ({})",
                self.gaps.min_delay_ms, self.gaps.max_delay_ms
            )));
        }
        if self.stream.enabled && self.stream.interval_ms == 0 {
            return Err(ConfigError::Invalid("stream.interval_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("GRIDPULSE_FRAME_INTERVAL_MS") {
            if let Ok(ms) = value.parse() {
                self.render.frame_interval_ms = ms;
            }
        }

        if let Ok(value) = std::env::var("GRIDPULSE_HIGH_RATE") {
            if let Ok(rate) = value.parse() {
                self.monitor.high_rate_threshold = rate;
            }
        }

        if let Ok(value) = std::env::var("GRIDPULSE_GAPS_ENABLED") {
            if let Ok(enabled) = value.parse() {
                self.gaps.enabled = enabled;
            }
        }

        if let Ok(level) = std::env::var("GRIDPULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GRIDPULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Gridpulse Configuration
#
# Environment variables override these settings:
# - GRIDPULSE_FRAME_INTERVAL_MS
# - GRIDPULSE_HIGH_RATE
# - GRIDPULSE_GAPS_ENABLED
# - GRIDPULSE_LOG_LEVEL
# - GRIDPULSE_LOG_FORMAT

[data]
# Number of precomputed datasets in rotation
dataset_count = 10

# Rows per dataset
rows_per_dataset = 1000

# Fixed seed for reproducible runs
# seed = 42

[render]
# Minimum time between frames (ms); 66 is ~15 frames per second
frame_interval_ms = 66

# Scheduling tick (ms)
tick_interval_ms = 16

# Frame durations kept for the moving-average latency
latency_window = 10

# Counted volume per frame: "dataset" (rows that arrived) or "visible" (rows rendered)
rate_basis = "dataset"

# Initial viewport (inclusive row indices)
visible_start = 0
visible_end = 50

[monitor]
# Rate monitor tick (ms)
interval_ms = 1000

# Rates above this raise a High Rate alert (updates/sec)
high_rate_threshold = 1000.0

# Alerts kept in the panel
max_alerts = 3

# Chart samples kept
max_samples = 20

# Ticks closer than this are skipped rather than divided (ms)
min_sample_interval_ms = 50

[gaps]
# Inject synthetic update gaps to exercise the alert path
enabled = true

# Delay before each gap is drawn uniformly from [min, max) (ms)
min_delay_ms = 5000
max_delay_ms = 15000

# How long each gap lasts (ms)
hold_ms = 3000

[stream]
# Secondary moving-average panel
enabled = false
interval_ms = 100
window_ms = 1000
lower_bound = 0.0
upper_bound = 10000.0
max_value = 15000.0
max_alerts = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Tests that set `GRIDPULSE_*` variables hold this for their duration
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 5] = [
        "GRIDPULSE_FRAME_INTERVAL_MS",
        "GRIDPULSE_HIGH_RATE",
        "GRIDPULSE_GAPS_ENABLED",
        "GRIDPULSE_LOG_LEVEL",
        "GRIDPULSE_LOG_FORMAT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.dataset_count, 10);
        assert_eq!(config.data.rows_per_dataset, 1000);
        assert_eq!(config.render.frame_interval_ms, 66);
        assert_eq!(config.render.rate_basis, RateBasis::Dataset);
        assert_eq!(config.monitor.high_rate_threshold, 1000.0);
        assert_eq!(config.monitor.max_alerts, 3);
        assert!(config.gaps.enabled);
        assert!(!config.stream.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.render.visible_range(), VisibleRange::default());
        assert_eq!(config.gaps.max_delay_ms, 15000);
        assert_eq!(config.stream.max_alerts, 5);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[render]\nframe_interval_ms = 33\nrate_basis = \"visible\"\n\n[gaps]\nenabled = false"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.render.frame_interval_ms, 33);
        assert_eq!(config.render.rate_basis, RateBasis::Visible);
        assert!(!config.gaps.enabled);
        // Untouched sections keep their defaults
        assert_eq!(config.monitor.interval_ms, 1000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/gridpulse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[render\nframe_interval_ms = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.render.frame_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.gaps.min_delay_ms = 20_000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.monitor.max_alerts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settings_conversion() {
        let config = Config::default();
        let render = config.render.render_config(Duration::from_secs(1));
        assert_eq!(render.frame_interval, Duration::from_millis(66));
        assert_eq!(render.frame_tolerance, Duration::from_millis(8));
        assert_eq!(render.flush_interval, Duration::from_secs(1));

        let monitor = config.monitor.monitor_config();
        assert_eq!(monitor.max_samples, 20);
        assert_eq!(monitor.min_sample_interval, Duration::from_millis(50));

        let stream = config.stream.stream_config();
        assert_eq!(stream.upper_bound, 10_000.0);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[render]\nframe_interval_ms = 33\n\n[monitor]\nhigh_rate_threshold = 500.0\n\n[logging]\nlevel = \"warn\""
        )
        .unwrap();

        std::env::set_var("GRIDPULSE_FRAME_INTERVAL_MS", "50");
        std::env::set_var("GRIDPULSE_HIGH_RATE", "2500");
        std::env::set_var("GRIDPULSE_GAPS_ENABLED", "false");
        std::env::set_var("GRIDPULSE_LOG_FORMAT", "json");

        let result = Config::load_with_env(file.path());
        clear_env();
        let config = result.unwrap();

        assert_eq!(config.render.frame_interval_ms, 50);
        assert_eq!(config.monitor.high_rate_threshold, 2500.0);
        assert!(!config.gaps.enabled);
        assert_eq!(config.logging.format, "json");
        // Not overridden, so the file value stands
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unparseable_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("GRIDPULSE_FRAME_INTERVAL_MS", "fast");
        std::env::set_var("GRIDPULSE_GAPS_ENABLED", "maybe");
        let config = Config::from_env();
        clear_env();

        assert_eq!(config.render.frame_interval_ms, 66);
        assert!(config.gaps.enabled);
    }

    #[test]
    fn test_env_override_still_validated() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let file = NamedTempFile::new().unwrap();
        std::env::set_var("GRIDPULSE_FRAME_INTERVAL_MS", "0");
        let result = Config::load_with_env(file.path());
        clear_env();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
