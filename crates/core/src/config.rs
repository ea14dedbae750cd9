use crate::{CardId, Inventory, PriceMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_MAX_POINT_TOTAL: u32 = 10_000;
/// About 64 MiB of solver table.
pub const DEFAULT_MAX_TABLE_CELLS: u64 = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on the summed point weights a single points mission may feed
    /// into the solver table.
    #[serde(default = "default_max_point_total")]
    pub max_point_total: u32,
    /// Upper bound on `(cards + 1) * (points + 1)`, the size of that table.
    #[serde(default = "default_max_table_cells")]
    pub max_table_cells: u64,
}

fn default_max_point_total() -> u32 {
    DEFAULT_MAX_POINT_TOTAL
}

fn default_max_table_cells() -> u64 {
    DEFAULT_MAX_TABLE_CELLS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_point_total: DEFAULT_MAX_POINT_TOTAL,
            max_table_cells: DEFAULT_MAX_TABLE_CELLS,
        }
    }
}

impl EngineConfig {
    pub fn with_max_point_total(mut self, max_point_total: u32) -> Self {
        self.max_point_total = max_point_total;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackPrices {
    prices: BTreeMap<String, f64>,
}

impl Default for PackPrices {
    fn default() -> Self {
        let prices = [("standard", 4.0), ("premium", 10.0), ("collector", 25.0)]
            .into_iter()
            .map(|(kind, price)| (kind.to_string(), price))
            .collect();
        Self { prices }
    }
}

impl PackPrices {
    pub fn empty() -> Self {
        Self {
            prices: BTreeMap::new(),
        }
    }

    /// Unconfigured pack types price at zero.
    pub fn price(&self, pack_type: &str) -> f64 {
        self.prices.get(pack_type).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, pack_type: impl Into<String>, price: f64) {
        self.prices.insert(pack_type.into(), price);
    }

    pub fn merge(&mut self, other: &PackPrices) {
        for (kind, price) in &other.prices {
            self.prices.insert(kind.clone(), *price);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(kind, price)| (kind.as_str(), *price))
    }
}

/// Price inputs for one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pricing {
    pub mode: PriceMode,
    pub overrides: HashMap<CardId, f64>,
    pub pack_prices: PackPrices,
}

impl Pricing {
    pub fn new(mode: PriceMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_override(mut self, id: CardId, price: f64) -> Self {
        self.overrides.insert(id, price);
        self
    }

    pub fn with_pack_prices(mut self, pack_prices: PackPrices) -> Self {
        self.pack_prices = pack_prices;
        self
    }

    /// Override, then the card's manual price, then the mode price. Unknown cards are free.
    pub fn card_price(&self, inventory: &Inventory, id: CardId) -> f64 {
        if let Some(price) = self.overrides.get(&id) {
            return *price;
        }
        let Some(card) = inventory.get(id) else {
            return 0.0;
        };
        card.manual_price.unwrap_or_else(|| card.price(self.mode))
    }

    pub fn pack_price(&self, pack_type: &str) -> f64 {
        self.pack_prices.price(pack_type)
    }
}
