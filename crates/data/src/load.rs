use crate::schema::SnapshotFile;
use anyhow::{bail, Context};
use cardplan_core::{
    Card, EngineConfig, EvaluationPass, Inventory, MissionBook, MissionDefinition, MissionId,
    MissionKind, PackPrices, PriceMode, Pricing, ResolvedMission,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A validated snapshot, ready to be evaluated any number of times. Each
/// evaluation builds a fresh pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub inventory: Inventory,
    pub missions: MissionBook,
    pub pricing: Pricing,
    pub engine: EngineConfig,
}

impl Snapshot {
    pub fn pass(&self) -> EvaluationPass<'_> {
        EvaluationPass::new(&self.inventory, &self.missions, &self.pricing, self.engine)
    }

    pub fn evaluate(&self) -> BTreeMap<MissionId, ResolvedMission> {
        self.pass().resolve_all()
    }

    pub fn set_price_mode(&mut self, mode: PriceMode) {
        self.pricing.mode = mode;
    }
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_snapshot(&raw).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_snapshot(raw: &str) -> anyhow::Result<Snapshot> {
    let file: SnapshotFile = serde_json::from_str(raw)?;
    build_snapshot(file)
}

pub fn build_snapshot(file: SnapshotFile) -> anyhow::Result<Snapshot> {
    for card in &file.cards {
        validate_card(card)?;
    }
    for mission in &file.missions {
        validate_mission(mission)?;
    }
    for (card_id, price) in &file.overrides {
        check_price(*price).with_context(|| format!("override for card {card_id}"))?;
    }

    let inventory = Inventory::from_cards(file.cards)?;
    let missions = MissionBook::from_definitions(file.missions)?;
    let mut pack_prices = PackPrices::default();
    if let Some(custom) = &file.pack_prices {
        for (pack_type, price) in custom.iter() {
            check_price(price).with_context(|| format!("pack price {pack_type}"))?;
        }
        pack_prices.merge(custom);
    }
    let pricing = Pricing {
        mode: file.price_mode,
        overrides: file.overrides.into_iter().collect(),
        pack_prices,
    };
    tracing::debug!(
        cards = inventory.len(),
        missions = missions.len(),
        "snapshot loaded"
    );
    Ok(Snapshot {
        inventory,
        missions,
        pricing,
        engine: file.engine,
    })
}

fn check_price(price: f64) -> anyhow::Result<()> {
    if !price.is_finite() || price < 0.0 {
        bail!("price {price} must be a non-negative number");
    }
    Ok(())
}

fn validate_card(card: &Card) -> anyhow::Result<()> {
    let prices = [Some(card.market_price), Some(card.sell_price), card.manual_price];
    for price in prices.into_iter().flatten() {
        check_price(price).with_context(|| format!("card {} ({})", card.id, card.title))?;
    }
    Ok(())
}

fn validate_mission(mission: &MissionDefinition) -> anyhow::Result<()> {
    match mission.kind {
        MissionKind::Chain if !mission.card_requirements.is_empty() => {
            bail!("chain mission {} lists card requirements", mission.id)
        }
        MissionKind::LeafCount | MissionKind::LeafPoints
            if !mission.child_mission_ids.is_empty() =>
        {
            bail!("leaf mission {} lists child missions", mission.id)
        }
        _ => Ok(()),
    }
}
