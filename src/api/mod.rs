pub mod candles;
pub mod feed;

pub use candles::{Candle, CandleSource, SeriesError};
pub use feed::{HttpFeed, PriceFeed, SimulatedFeed};
