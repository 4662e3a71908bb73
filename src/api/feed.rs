use crate::app::ticker::TickerUpdate;
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use std::time::Duration;

/// Largest relative move the simulated feed makes per poll.
const MAX_SIMULATED_STEP: f64 = 0.01;
const MIN_SIMULATED_PRICE: f64 = 1e-18;

/// Source of live ticker updates, polled on the refresh interval.
pub enum PriceFeed {
    Http(HttpFeed),
    Simulated(SimulatedFeed),
}

impl PriceFeed {
    /// HTTP feed when `url` is set, otherwise a random walk from `start_price`.
    pub fn from_url(url: Option<&str>, start_price: f64) -> Result<Self> {
        match url {
            Some(url) => Ok(PriceFeed::Http(HttpFeed::new(url)?)),
            None => Ok(PriceFeed::Simulated(SimulatedFeed::new(start_price))),
        }
    }

    pub async fn poll(&mut self) -> Result<TickerUpdate> {
        match self {
            PriceFeed::Http(feed) => feed.fetch().await,
            PriceFeed::Simulated(feed) => Ok(feed.next_update()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceFeed::Http(_) => "Live",
            PriceFeed::Simulated(_) => "Simulated",
        }
    }
}

pub struct HttpFeed {
    client: Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Fetch one partial ticker update from the endpoint.
    pub async fn fetch(&self) -> Result<TickerUpdate> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Price feed error: {}", response.status()));
        }

        Ok(response.json().await?)
    }
}

/// Random walk of at most ±1% per step, for running without a backend.
pub struct SimulatedFeed {
    price: f64,
    rng: StdRng,
}

impl SimulatedFeed {
    pub fn new(start_price: f64) -> Self {
        Self::with_rng(start_price, StdRng::from_os_rng())
    }

    pub fn seeded(start_price: f64, seed: u64) -> Self {
        Self::with_rng(start_price, StdRng::seed_from_u64(seed))
    }

    fn with_rng(start_price: f64, rng: StdRng) -> Self {
        let price = if start_price.is_finite() && start_price > 0.0 {
            start_price
        } else {
            MIN_SIMULATED_PRICE
        };
        Self { price, rng }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn next_update(&mut self) -> TickerUpdate {
        let step = self.rng.random_range(-MAX_SIMULATED_STEP..=MAX_SIMULATED_STEP);
        self.price = (self.price * (1.0 + step)).max(MIN_SIMULATED_PRICE);
        TickerUpdate::price(self.price)
    }
}
