use anyhow::{anyhow, Result};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const SYNTHETIC_BASE_PRICE: f64 = 100.0;

/// One OHLCV bar. Series are ordered by ascending `timestamp` (unix ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,
    #[error("record {index} is not an object")]
    NotAnObject { index: usize },
    #[error("record {index}: field `{field}` is missing or not a number")]
    BadField { index: usize, field: &'static str },
}

const PRICE_FIELDS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Check every record field by field and convert the series. Ordering is
/// trusted to the source.
pub fn validate_series(records: &[Value]) -> Result<Vec<Candle>, SeriesError> {
    if records.is_empty() {
        return Err(SeriesError::Empty);
    }

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let obj = record
                .as_object()
                .ok_or(SeriesError::NotAnObject { index })?;

            let timestamp = obj
                .get("timestamp")
                .and_then(Value::as_i64)
                .ok_or(SeriesError::BadField {
                    index,
                    field: "timestamp",
                })?;

            let mut values = [0.0; 5];
            for (slot, field) in values.iter_mut().zip(PRICE_FIELDS) {
                *slot = obj
                    .get(field)
                    .and_then(Value::as_f64)
                    .ok_or(SeriesError::BadField { index, field })?;
            }
            let [open, high, low, close, volume] = values;

            Ok(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect()
}

/// Random-walk daily candles ending at `end_ms`.
pub fn synthetic_series<R: Rng + ?Sized>(points: usize, end_ms: i64, rng: &mut R) -> Vec<Candle> {
    let mut base = SYNTHETIC_BASE_PRICE;
    let mut candles = Vec::with_capacity(points);

    for i in 0..points {
        let timestamp = end_ms - (points - i) as i64 * DAY_MS;
        let open = base + rng.random::<f64>() * 5.0 - 2.5;
        let high = open + rng.random::<f64>() * 3.0;
        let low = open - rng.random::<f64>() * 3.0;
        let close = low + rng.random::<f64>() * (high - low);
        let volume = (rng.random::<f64>() * 100_000.0).floor() + 50_000.0;

        candles.push(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
        base = close;
    }

    candles
}

/// Where chart candles come from: a remote JSON endpoint or the synthetic
/// generator. Remote failures never reach the display.
pub struct CandleSource {
    client: Client,
    url: Option<String>,
    synthetic_points: usize,
}

impl CandleSource {
    pub fn new(url: Option<String>, synthetic_points: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url,
            synthetic_points,
        })
    }

    pub fn is_remote(&self) -> bool {
        self.url.is_some()
    }

    pub async fn load(&self) -> Vec<Candle> {
        let Some(url) = &self.url else {
            return self.synthetic();
        };

        match self.fetch(url).await {
            Ok(candles) => {
                debug!(url = %url, count = candles.len(), "loaded candles");
                candles
            }
            Err(e) => {
                warn!(url = %url, error = %e, "invalid chart data, using synthetic series");
                self.synthetic()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<Candle>> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Chart API error: {}", response.status()));
        }

        let records: Vec<Value> = response.json().await?;
        Ok(validate_series(&records)?)
    }

    fn synthetic(&self) -> Vec<Candle> {
        let now = chrono::Utc::now().timestamp_millis();
        synthetic_series(self.synthetic_points, now, &mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[test]
    fn synthetic_series_is_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        let end = 1_700_000_000_000;
        let candles = synthetic_series(100, end, &mut rng);

        assert_eq!(candles.len(), 100);
        assert_eq!(candles[0].timestamp, end - 100 * DAY_MS);
        assert_eq!(candles[99].timestamp, end - DAY_MS);
        for pair in candles.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
            assert_eq!(pair[1].timestamp - pair[0].timestamp, DAY_MS);
        }
        for c in &candles {
            assert!(c.low <= c.open && c.open <= c.high);
            assert!(c.low <= c.close && c.close <= c.high);
            assert!((50_000.0..150_000.0).contains(&c.volume));
            assert_eq!(c.volume.fract(), 0.0);
        }
    }

    #[test]
    fn synthetic_series_chains_open_from_previous_close() {
        let mut rng = StdRng::seed_from_u64(42);
        let candles = synthetic_series(20, 0, &mut rng);
        for pair in candles.windows(2) {
            assert!((pair[1].open - pair[0].close).abs() <= 2.5);
        }
    }

    #[test]
    fn synthetic_series_zero_points() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(synthetic_series(0, 0, &mut rng).is_empty());
    }

    #[test]
    fn validate_accepts_well_typed_records() {
        let records = vec![
            json!({"timestamp": 1000, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10}),
            json!({"timestamp": 2000, "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0, "volume": 12.5}),
        ];
        let candles = validate_series(&records).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp, 2000);
        assert_eq!(candles[0].volume, 10.0);
    }

    #[test]
    fn validate_reports_first_bad_field() {
        let records = vec![
            json!({"timestamp": 1000, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10}),
            json!({"timestamp": 2000, "open": "1.5", "high": 2.5, "low": 1.0, "close": 2.0, "volume": 12}),
        ];
        assert_eq!(
            validate_series(&records).unwrap_err(),
            SeriesError::BadField {
                index: 1,
                field: "open"
            }
        );
    }

    #[test]
    fn validate_rejects_fractional_timestamp() {
        let records = vec![json!({"timestamp": 1000.5, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10})];
        assert_eq!(
            validate_series(&records).unwrap_err(),
            SeriesError::BadField {
                index: 0,
                field: "timestamp"
            }
        );
    }

    #[test]
    fn validate_rejects_non_objects_and_empty() {
        assert_eq!(validate_series(&[]).unwrap_err(), SeriesError::Empty);
        let records = vec![json!([1000, 1.0, 2.0, 0.5, 1.5, 10])];
        assert_eq!(
            validate_series(&records).unwrap_err(),
            SeriesError::NotAnObject { index: 0 }
        );
    }

    #[tokio::test]
    async fn unreachable_source_falls_back_to_synthetic() {
        let source = CandleSource::new(Some("http://127.0.0.1:9/candles".to_string()), 30).unwrap();
        let candles = source.load().await;
        assert_eq!(candles.len(), 30);
    }
}
