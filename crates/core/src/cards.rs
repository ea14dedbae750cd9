use serde::{Deserialize, Serialize};

/// Card identifier. `0` is reserved for reward entries whose card could not be mapped.
pub type CardId = u32;

pub const UNMAPPED_CARD_ID: CardId = 0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    #[default]
    Market,
    Sell,
}

impl PriceMode {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "market" => Some(Self::Market),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub market_price: f64,
    #[serde(default)]
    pub sell_price: f64,
    #[serde(default)]
    pub manual_price: Option<f64>,
}

impl Card {
    pub fn new(id: CardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            owned: false,
            locked: false,
            market_price: 0.0,
            sell_price: 0.0,
            manual_price: None,
        }
    }

    pub fn with_prices(mut self, market_price: f64, sell_price: f64) -> Self {
        self.market_price = market_price;
        self.sell_price = sell_price;
        self
    }

    pub fn owned(mut self) -> Self {
        self.owned = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Raw price for the mode, ignoring manual prices and overrides.
    pub fn price(&self, mode: PriceMode) -> f64 {
        match mode {
            PriceMode::Market => self.market_price,
            PriceMode::Sell => self.sell_price,
        }
    }

    /// Owned cards that are not locked may be sold, so using them has a cost.
    pub fn is_sellable(&self) -> bool {
        self.owned && !self.locked
    }
}
