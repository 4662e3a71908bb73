use crate::app::ticker::TickerData;
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chart dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u16, height: u16 },
    #[error("visible range {start}..{end} is empty")]
    EmptyRange { start: usize, end: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Candlestick,
    HollowCandlestick,
    HeikinAshi,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Line,
        ChartType::Area,
        ChartType::Candlestick,
        ChartType::HollowCandlestick,
        ChartType::HeikinAshi,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Line => "Line",
            ChartType::Area => "Area",
            ChartType::Candlestick => "Candles",
            ChartType::HollowCandlestick => "Hollow",
            ChartType::HeikinAshi => "Heikin-Ashi",
        }
    }

    pub fn next(&self) -> ChartType {
        match self {
            ChartType::Line => ChartType::Area,
            ChartType::Area => ChartType::Candlestick,
            ChartType::Candlestick => ChartType::HollowCandlestick,
            ChartType::HollowCandlestick => ChartType::HeikinAshi,
            ChartType::HeikinAshi => ChartType::Line,
        }
    }

    pub fn is_ohlc(&self) -> bool {
        matches!(
            self,
            ChartType::Candlestick | ChartType::HollowCandlestick | ChartType::HeikinAshi
        )
    }
}

/// Raw, unvalidated chart options. Build a [`ChartConfig`] from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub chart_type: ChartType,
    pub show_volume: bool,
    pub show_navigator: bool,
    pub show_range_selector: bool,
    pub show_token_header: bool,
    /// Upper bound on the chart panel size, in terminal cells.
    pub chart_width: u16,
    pub chart_height: u16,
    /// Initially visible candles, `start..end`.
    pub visible_range: (usize, usize),
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            show_volume: false,
            show_navigator: false,
            show_range_selector: false,
            show_token_header: false,
            chart_width: 1000,
            chart_height: 450,
            visible_range: (50, 100),
        }
    }
}

impl ChartOptions {
    pub fn build(self) -> Result<ChartConfig, ConfigError> {
        ChartConfig::new(self)
    }
}

/// Validated chart configuration. Every way of obtaining one goes through
/// [`ChartConfig::new`], so render code never re-checks options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ChartOptions", into = "ChartOptions")]
pub struct ChartConfig {
    options: ChartOptions,
}

impl ChartConfig {
    pub fn new(options: ChartOptions) -> Result<Self, ConfigError> {
        if options.chart_width == 0 || options.chart_height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: options.chart_width,
                height: options.chart_height,
            });
        }
        let (start, end) = options.visible_range;
        if start >= end {
            return Err(ConfigError::EmptyRange { start, end });
        }
        Ok(Self { options })
    }

    pub fn chart_type(&self) -> ChartType {
        self.options.chart_type
    }

    pub fn show_volume(&self) -> bool {
        self.options.show_volume
    }

    pub fn show_navigator(&self) -> bool {
        self.options.show_navigator
    }

    pub fn show_range_selector(&self) -> bool {
        self.options.show_range_selector
    }

    pub fn show_token_header(&self) -> bool {
        self.options.show_token_header
    }

    pub fn max_size(&self) -> (u16, u16) {
        (self.options.chart_width, self.options.chart_height)
    }

    pub fn visible_range(&self) -> (usize, usize) {
        self.options.visible_range
    }

    // Toggling a flag or swapping the series kind cannot invalidate the
    // options, so these skip `new`.

    pub fn with_chart_type(&self, chart_type: ChartType) -> Self {
        let mut options = self.options.clone();
        options.chart_type = chart_type;
        Self { options }
    }

    pub fn with_volume(&self, show_volume: bool) -> Self {
        let mut options = self.options.clone();
        options.show_volume = show_volume;
        Self { options }
    }

    pub fn with_navigator(&self, show_navigator: bool) -> Self {
        let mut options = self.options.clone();
        options.show_navigator = show_navigator;
        Self { options }
    }
}

impl TryFrom<ChartOptions> for ChartConfig {
    type Error = ConfigError;

    fn try_from(options: ChartOptions) -> Result<Self, Self::Error> {
        ChartConfig::new(options)
    }
}

impl From<ChartConfig> for ChartOptions {
    fn from(config: ChartConfig) -> Self {
        config.options
    }
}

/// Invalid chart options in the config file fall back to defaults instead of
/// refusing to start.
fn lenient_chart<'de, D>(deserializer: D) -> Result<ChartConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let options = match ChartOptions::deserialize(raw) {
        Ok(options) => options,
        Err(e) => {
            warn!(error = %e, "unreadable chart options, using defaults");
            return Ok(ChartConfig::default());
        }
    };
    Ok(ChartConfig::new(options).unwrap_or_else(|e| {
        warn!(error = %e, "invalid chart options, using defaults");
        ChartConfig::default()
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_max_price_length")]
    pub max_price_length: usize,
    /// Live price endpoint; absent means the simulated feed.
    #[serde(default)]
    pub feed_url: Option<String>,
    /// OHLCV endpoint; absent means synthetic candles.
    #[serde(default)]
    pub chart_url: Option<String>,
    #[serde(default = "default_synthetic_points")]
    pub synthetic_points: usize,
    #[serde(default = "default_show_wallet_balance")]
    pub show_wallet_balance: bool,
    #[serde(default)]
    pub token: Option<TickerData>,
    #[serde(default, deserialize_with = "lenient_chart")]
    pub chart: ChartConfig,
}

/// Upper bound on the price character budget.
pub const MAX_PRICE_LENGTH: usize = 64;

fn default_refresh_interval() -> u64 {
    5
}

fn default_max_price_length() -> usize {
    crate::ui::formatters::DEFAULT_MAX_LENGTH
}

fn default_synthetic_points() -> usize {
    100
}

fn default_show_wallet_balance() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            max_price_length: default_max_price_length(),
            feed_url: None,
            chart_url: None,
            synthetic_points: default_synthetic_points(),
            show_wallet_balance: default_show_wallet_balance(),
            token: None,
            chart: ChartConfig::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("token-dash");

        Ok(config_dir.join("config.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from `path`, writing a default file there on first run.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            info!(path = %path.display(), "wrote default config");
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.sanitize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Token identity for the ticker, substituting the default record when
    /// the file carries none.
    pub fn ticker_data(&self) -> TickerData {
        self.token.clone().unwrap_or_default()
    }

    /// Replace out-of-range values with usable ones. Runs on load and again
    /// after command-line overrides.
    pub fn sanitize(&mut self) {
        if self.max_price_length > MAX_PRICE_LENGTH {
            warn!(
                max_price_length = self.max_price_length,
                "max_price_length too large, clamping to {}", MAX_PRICE_LENGTH
            );
            self.max_price_length = MAX_PRICE_LENGTH;
        }
        if self.refresh_interval_secs == 0 {
            warn!("refresh_interval_secs must be positive, using default");
            self.refresh_interval_secs = default_refresh_interval();
        }
        if self.synthetic_points == 0 {
            warn!("synthetic_points must be positive, using default");
            self.synthetic_points = default_synthetic_points();
        }
    }
}
