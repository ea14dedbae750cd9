use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use cardplan_core::{
    Card, CardId, CardRequirement, EngineConfig, MissionDefinition, MissionKind, PackPrices,
    PriceMode, RewardEntry,
};

/// On-disk snapshot: everything one evaluation pass reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub price_mode: PriceMode,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub missions: Vec<MissionDefinition>,
    /// Merged over the built-in pack prices.
    #[serde(default)]
    pub pack_prices: Option<PackPrices>,
    #[serde(default)]
    pub overrides: BTreeMap<CardId, f64>,
    #[serde(default)]
    pub engine: EngineConfig,
}
