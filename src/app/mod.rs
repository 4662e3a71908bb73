pub mod chart;
pub mod ticker;

use crate::api::{CandleSource, PriceFeed};
use crate::config::Config;
use anyhow::Result;
use chart::ChartState;
use chrono::Local;
use std::time::Instant;
use ticker::{PriceDirection, PriceFlash, TickerModel, TickerUpdate};
use tracing::{debug, warn};

/// Candles moved per pan keypress.
const PAN_STEP: isize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

pub struct App {
    pub config: Config,
    pub ticker: TickerModel,
    pub flash: PriceFlash,
    pub chart: ChartState,
    pub input_mode: InputMode,
    pub status_message: Option<String>,
    pub loading: bool,
    pub chart_loading: bool,
    pub last_updated: Option<String>,
    feed: PriceFeed,
    candles: CandleSource,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let data = config.ticker_data();
        let feed = PriceFeed::from_url(config.feed_url.as_deref(), data.token_price)?;
        let candles = CandleSource::new(config.chart_url.clone(), config.synthetic_points)?;
        let chart = ChartState::new(config.chart.clone());

        Ok(Self {
            ticker: TickerModel::new(data),
            flash: PriceFlash::default(),
            chart,
            input_mode: InputMode::Normal,
            status_message: None,
            loading: false,
            chart_loading: false,
            last_updated: None,
            feed,
            candles,
            config,
        })
    }

    pub fn feed_label(&self) -> &'static str {
        self.feed.label()
    }

    pub fn chart_is_remote(&self) -> bool {
        self.candles.is_remote()
    }

    /// Poll the feed once. Failures are reported and polling carries on.
    pub async fn refresh_ticker(&mut self) {
        self.loading = true;
        match self.feed.poll().await {
            Ok(update) => {
                self.apply_update(update, Instant::now());
                self.status_message = None;
            }
            Err(e) => {
                warn!(error = %e, "price feed poll failed");
                self.status_message = Some(format!("Error: {}", e));
            }
        }
        self.loading = false;
    }

    /// Merge an update into the ticker and drive the flash state.
    pub fn apply_update(&mut self, update: TickerUpdate, now: Instant) -> PriceDirection {
        let carries_price = update.token_price.is_some();
        self.ticker.apply(update);
        self.last_updated = Some(Local::now().format("%H:%M:%S").to_string());

        if carries_price {
            let previous = self.ticker.previous_price();
            let current = self.ticker.data().token_price;
            let direction = self.flash.on_price(previous, current, now);
            debug!(previous, current, ?direction, "price update");
        }
        self.flash.state()
    }

    pub async fn reload_chart(&mut self) {
        self.chart_loading = true;
        let candles = self.candles.load().await;
        self.chart.set_candles(candles);
        self.chart_loading = false;
    }

    /// Advance timers. Returns true if the display changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.flash.tick(now)
    }

    pub fn cycle_chart_type(&mut self) {
        let config = self.chart.config();
        let next = config.with_chart_type(config.chart_type().next());
        self.chart.set_config(next);
    }

    pub fn toggle_volume(&mut self) {
        let config = self.chart.config();
        let next = config.with_volume(!config.show_volume());
        self.chart.set_config(next);
    }

    pub fn toggle_navigator(&mut self) {
        let config = self.chart.config();
        let next = config.with_navigator(!config.show_navigator());
        self.chart.set_config(next);
    }

    pub fn pan_left(&mut self) {
        self.chart.pan(-PAN_STEP);
    }

    pub fn pan_right(&mut self) {
        self.chart.pan(PAN_STEP);
    }

    pub fn zoom_in(&mut self) {
        self.chart.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.chart.zoom_out();
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn close_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
