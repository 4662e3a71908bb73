use crate::api::Candle;
use crate::config::{ChartConfig, ChartType};

/// Narrowest window zooming in will produce.
pub const MIN_VISIBLE: usize = 5;

/// Heikin-Ashi smoothing of an OHLC series. Volume and timestamps carry over.
pub fn heikin_ashi(candles: &[Candle]) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());

    for c in candles {
        let close = (c.open + c.high + c.low + c.close) / 4.0;
        let open = match out.last() {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => (c.open + c.close) / 2.0,
        };
        out.push(Candle {
            timestamp: c.timestamp,
            open,
            high: c.high.max(open).max(close),
            low: c.low.min(open).min(close),
            close,
            volume: c.volume,
        });
    }

    out
}

/// Chart data plus everything derived from it.
///
/// The derived series and the visible window are recomputed whenever the
/// candles or the config change, and at no other time.
#[derive(Debug, Clone)]
pub struct ChartState {
    config: ChartConfig,
    candles: Vec<Candle>,
    series: Vec<Candle>,
    range: (usize, usize),
}

impl ChartState {
    pub fn new(config: ChartConfig) -> Self {
        let range = config.visible_range();
        Self {
            config,
            candles: Vec::new(),
            series: Vec::new(),
            range,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Full derived series (raw candles, or Heikin-Ashi candles).
    pub fn series(&self) -> &[Candle] {
        &self.series
    }

    pub fn range(&self) -> (usize, usize) {
        self.range
    }

    pub fn visible(&self) -> &[Candle] {
        &self.series[self.range.0..self.range.1]
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Replace the data; the window resets to the configured range.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
        self.range = self.config.visible_range();
        self.recompute();
    }

    /// Swap the config. The current window survives unless it no longer fits.
    pub fn set_config(&mut self, config: ChartConfig) {
        self.config = config;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.series = match self.config.chart_type() {
            ChartType::HeikinAshi => heikin_ashi(&self.candles),
            _ => self.candles.clone(),
        };
        self.range = clamp_range(self.range, self.series.len());
    }

    fn width(&self) -> usize {
        self.range.1 - self.range.0
    }

    /// Shift the window by `delta` candles, stopping at either end.
    pub fn pan(&mut self, delta: isize) {
        let len = self.series.len();
        let width = self.width();
        let max_start = len.saturating_sub(width);
        let start = self.range.0.saturating_add_signed(delta).min(max_start);
        self.range = (start, start + width);
    }

    /// Halve the window, keeping its right edge.
    pub fn zoom_in(&mut self) {
        let width = self.width();
        let narrowed = (width / 2).max(MIN_VISIBLE.min(width));
        self.range.0 = self.range.1 - narrowed;
    }

    /// Double the window, growing left first.
    pub fn zoom_out(&mut self) {
        let len = self.series.len();
        let widened = (self.width() * 2).clamp(MIN_VISIBLE.min(len), len);
        let end = self.range.1.max(widened);
        self.range = (end - widened, end);
    }

    /// Lowest low and highest high in the window.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        let visible = self.visible();
        if visible.is_empty() {
            return None;
        }
        let (lows, highs): (Vec<f64>, Vec<f64>) = if self.config.chart_type().is_ohlc() {
            visible.iter().map(|c| (c.low, c.high)).unzip()
        } else {
            visible.iter().map(|c| (c.close, c.close)).unzip()
        };
        let lo = lows.into_iter().fold(f64::INFINITY, f64::min);
        let hi = highs.into_iter().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

/// Fit a window into `len` candles, keeping its width where possible.
fn clamp_range((start, end): (usize, usize), len: usize) -> (usize, usize) {
    let width = end.saturating_sub(start);
    let end = end.min(len);
    (end.saturating_sub(width), end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartOptions;

    fn candle(ts: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    fn flat_series(n: usize) -> Vec<Candle> {
        (0..n).map(|i| candle(i as i64, 1.0, 2.0, 0.5, 1.5)).collect()
    }

    #[test]
    fn heikin_ashi_first_and_second_bar() {
        let candles = vec![
            candle(0, 10.0, 14.0, 8.0, 12.0),
            candle(1, 12.0, 16.0, 11.0, 15.0),
        ];
        let ha = heikin_ashi(&candles);

        assert_eq!(ha[0].close, 11.0);
        assert_eq!(ha[0].open, 11.0);
        assert_eq!(ha[0].high, 14.0);
        assert_eq!(ha[0].low, 8.0);

        assert_eq!(ha[1].open, 11.0);
        assert_eq!(ha[1].close, 13.5);
        assert_eq!(ha[1].high, 16.0);
        assert_eq!(ha[1].low, 11.0);
    }

    #[test]
    fn default_window_is_last_fifty_of_hundred() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(flat_series(100));
        assert_eq!(state.range(), (50, 100));
        assert_eq!(state.visible().len(), 50);
    }

    #[test]
    fn window_clamps_to_short_series() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(flat_series(30));
        assert_eq!(state.range(), (0, 30));

        state.set_candles(Vec::new());
        assert_eq!(state.range(), (0, 0));
        assert!(state.visible().is_empty());
        assert!(state.price_bounds().is_none());
    }

    #[test]
    fn switching_to_heikin_ashi_recomputes_series() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(vec![
            candle(0, 10.0, 14.0, 8.0, 12.0),
            candle(1, 12.0, 16.0, 11.0, 15.0),
        ]);
        assert_eq!(state.series()[1].close, 15.0);

        let config = state.config().with_chart_type(ChartType::HeikinAshi);
        state.set_config(config);
        assert_eq!(state.series()[1].close, 13.5);
        assert_eq!(state.candles()[1].close, 15.0);
    }

    #[test]
    fn pan_stops_at_edges() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(flat_series(100));
        state.pan(10);
        assert_eq!(state.range(), (50, 100));
        state.pan(-20);
        assert_eq!(state.range(), (30, 80));
        state.pan(-100);
        assert_eq!(state.range(), (0, 50));
    }

    #[test]
    fn zoom_in_and_out() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(flat_series(100));
        state.zoom_in();
        assert_eq!(state.range(), (75, 100));
        state.zoom_out();
        assert_eq!(state.range(), (50, 100));
        state.zoom_out();
        assert_eq!(state.range(), (0, 100));
        state.zoom_out();
        assert_eq!(state.range(), (0, 100));
    }

    #[test]
    fn zoom_in_floors_at_min_visible() {
        let mut state = ChartState::new(ChartConfig::default());
        state.set_candles(flat_series(100));
        for _ in 0..10 {
            state.zoom_in();
        }
        assert_eq!(state.range(), (100 - MIN_VISIBLE, 100));
    }

    #[test]
    fn price_bounds_follow_chart_kind() {
        let candles = vec![
            candle(0, 10.0, 14.0, 8.0, 12.0),
            candle(1, 12.0, 16.0, 11.0, 15.0),
        ];
        let line = ChartOptions {
            visible_range: (0, 2),
            ..Default::default()
        }
        .build()
        .unwrap();
        let mut state = ChartState::new(line.clone());
        state.set_candles(candles);
        assert_eq!(state.price_bounds(), Some((12.0, 15.0)));

        state.set_config(line.with_chart_type(ChartType::Candlestick));
        assert_eq!(state.price_bounds(), Some((8.0, 16.0)));
    }
}
