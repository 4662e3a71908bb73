use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How long an up/down flash stays visible after the last price update.
pub const FLASH_DURATION: Duration = Duration::from_millis(1000);

/// Identity of one side of a trading pair. Missing fields deserialize empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenData {
    #[serde(rename = "tokenImageURL")]
    pub token_image_url: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_contract: String,
    pub token_chain: u64,
    pub token_contract_info_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub x: Option<String>,
    pub telegram: Option<String>,
    pub email: Option<String>,
    pub discord: Option<String>,
    pub instagram: Option<String>,
    pub medium: Option<String>,
    pub website: Option<String>,
    pub youtube: Option<String>,
    pub github: Option<String>,
    pub reddit: Option<String>,
}

impl SocialLinks {
    /// Present links as `(network, url)` in a fixed display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("x", &self.x),
            ("telegram", &self.telegram),
            ("email", &self.email),
            ("discord", &self.discord),
            ("instagram", &self.instagram),
            ("medium", &self.medium),
            ("website", &self.website),
            ("youtube", &self.youtube),
            ("github", &self.github),
            ("reddit", &self.reddit),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.as_deref().map(|u| (name, u)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TickerData {
    pub token_primary: TokenData,
    pub token_pair: TokenData,
    pub token_pair_contract: String,
    pub chain_name: String,
    pub chain_logo: String,
    pub token_price: f64,
    pub liquidity: f64,
    pub circulating_market_cap: f64,
    pub market_cap: f64,
    pub user_token_balance: f64,
    pub total_supply: f64,
    pub social_links: SocialLinks,
}

impl Default for TickerData {
    fn default() -> Self {
        Self {
            token_primary: TokenData {
                token_image_url: "https://storage.googleapis.com/pepperbird-www/images/tokens/100BY100/pepperbird_coin_logo_100x100.png".to_string(),
                token_name: "Pepperbird".to_string(),
                token_symbol: "PBIRD".to_string(),
                token_contract: "0x77Ad5F358CD673FCA1673e20E928B3CcADC84706".to_string(),
                token_chain: 56,
                token_contract_info_url: "https://bscscan.com/token/0x77Ad5F358CD673FCA1673e20E928B3CcADC84706#code".to_string(),
            },
            token_pair: TokenData {
                token_image_url: "https://storage.googleapis.com/pepperbird-www/images/tokens/100BY100/wbnb_100x100.png".to_string(),
                token_name: "Wrapped BNB".to_string(),
                token_symbol: "WBNB".to_string(),
                token_contract: "0xBB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".to_string(),
                token_chain: 56,
                token_contract_info_url: "https://bscscan.com/token/0xBB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c#code".to_string(),
            },
            token_pair_contract: "0x1A35FaCe19Ed7229d01627b0a4243FaD826dEa54".to_string(),
            chain_name: "Binance Smart Chain".to_string(),
            chain_logo: "https://storage.googleapis.com/pepperbird-www/images/tokens/100BY100/wbnb_100x100.png".to_string(),
            token_price: 0.1597,
            liquidity: 69_100.0,
            circulating_market_cap: 119_800.0,
            market_cap: 119_800.0,
            user_token_balance: 1_000.0,
            total_supply: 75_000_000_000_000.0,
            social_links: SocialLinks {
                x: Some("https://twitter.com/pepperbird".to_string()),
                telegram: Some("https://t.me/pepperbird".to_string()),
                website: Some("https://pepperbird.com".to_string()),
                youtube: Some("https://youtube.com/pepperbird".to_string()),
                github: Some("https://github.com/pepperbird".to_string()),
                ..Default::default()
            },
        }
    }
}

/// A partial ticker update as delivered by a price feed. Absent fields keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TickerUpdate {
    pub token_primary: Option<TokenData>,
    pub token_pair: Option<TokenData>,
    pub token_pair_contract: Option<String>,
    pub chain_name: Option<String>,
    pub chain_logo: Option<String>,
    pub token_price: Option<f64>,
    pub liquidity: Option<f64>,
    pub circulating_market_cap: Option<f64>,
    pub market_cap: Option<f64>,
    pub user_token_balance: Option<f64>,
    pub total_supply: Option<f64>,
    pub social_links: Option<SocialLinks>,
}

impl TickerUpdate {
    pub fn price(price: f64) -> Self {
        Self {
            token_price: Some(price),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

impl PriceDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            PriceDirection::Up => "▲",
            PriceDirection::Down => "▼",
            PriceDirection::Neutral => " ",
        }
    }
}

/// Current ticker values plus the price before the most recent price update.
#[derive(Debug, Clone)]
pub struct TickerModel {
    data: TickerData,
    previous_price: f64,
}

impl TickerModel {
    pub fn new(data: TickerData) -> Self {
        let previous_price = data.token_price;
        Self {
            data,
            previous_price,
        }
    }

    pub fn data(&self) -> &TickerData {
        &self.data
    }

    pub fn previous_price(&self) -> f64 {
        self.previous_price
    }

    /// Merge a partial update. `previous_price` only moves when the update
    /// carries a price.
    pub fn apply(&mut self, update: TickerUpdate) {
        if update.token_price.is_some() {
            self.previous_price = self.data.token_price;
        }

        let data = &mut self.data;
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field {
                    data.$field = v;
                })*
            };
        }
        merge!(
            token_primary,
            token_pair,
            token_pair_contract,
            chain_name,
            chain_logo,
            token_price,
            liquidity,
            circulating_market_cap,
            market_cap,
            user_token_balance,
            total_supply,
            social_links,
        );
    }

    /// Value of the user's balance at the current price.
    pub fn wallet_value(&self) -> f64 {
        self.data.user_token_balance * self.data.token_price
    }
}

/// Flash indicator for price moves.
///
/// A rise or fall sets `Up`/`Down`; an unchanged price keeps the current
/// state. While not neutral, every price update re-arms a single decay
/// deadline [`FLASH_DURATION`] ahead, replacing any pending one, so a stale
/// deadline can never clear a newer flash.
#[derive(Debug, Clone, Default)]
pub struct PriceFlash {
    state: PriceDirection,
    decay_at: Option<Instant>,
}

impl PriceFlash {
    pub fn state(&self) -> PriceDirection {
        self.state
    }

    pub fn decay_at(&self) -> Option<Instant> {
        self.decay_at
    }

    pub fn on_price(&mut self, previous: f64, current: f64, now: Instant) -> PriceDirection {
        self.tick(now);

        if current > previous {
            self.state = PriceDirection::Up;
        } else if current < previous {
            self.state = PriceDirection::Down;
        }

        self.decay_at = match self.state {
            PriceDirection::Neutral => None,
            _ => Some(now + FLASH_DURATION),
        };
        self.state
    }

    /// Fire the decay if its deadline has passed. Returns true on decay.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(at) = self.decay_at
            && now >= at
        {
            self.state = PriceDirection::Neutral;
            self.decay_at = None;
            return true;
        }
        false
    }
}
