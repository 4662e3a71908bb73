#![allow(dead_code)]

use token_dash::api::Candle;
use token_dash::app::App;
use token_dash::app::ticker::TickerData;
use token_dash::config::Config;

pub fn make_candle(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp,
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

/// `n` daily candles with closes rising by one from 100.
pub fn rising_series(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64;
            make_candle(i as i64 * 86_400_000, base, base + 1.5, base - 1.0, base + 1.0)
        })
        .collect()
}

pub fn make_ticker(price: f64) -> TickerData {
    TickerData {
        token_price: price,
        ..Default::default()
    }
}

// Offline config: simulated feed, synthetic candles.
pub fn test_config() -> Config {
    Config {
        token: Some(make_ticker(1.0)),
        ..Default::default()
    }
}

pub fn test_app() -> App {
    App::new(test_config()).expect("offline app builds")
}
