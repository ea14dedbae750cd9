use crate::{Inventory, MissionDefinition, Pricing, RewardEntry, UNMAPPED_CARD_ID};

/// Value of a mission's structured rewards. `None` means the mission was never
/// annotated and should display as unknown rather than zero.
pub fn reward_value(
    mission: &MissionDefinition,
    inventory: &Inventory,
    pricing: &Pricing,
) -> Option<f64> {
    let entries = mission.reward_entries.as_ref()?;
    Some(
        entries
            .iter()
            .map(|entry| entry_value(entry, inventory, pricing))
            .sum(),
    )
}

pub fn entry_value(entry: &RewardEntry, inventory: &Inventory, pricing: &Pricing) -> f64 {
    match entry {
        RewardEntry::Pack { pack_type, count } => pricing.pack_price(pack_type) * f64::from(*count),
        RewardEntry::Card { card_id, .. } if *card_id == UNMAPPED_CARD_ID => 0.0,
        RewardEntry::Card { card_id, count } => {
            if inventory.get(*card_id).is_none() && !pricing.overrides.contains_key(card_id) {
                tracing::debug!(card_id, "reward card not in inventory, valued at 0");
            }
            pricing.card_price(inventory, *card_id) * f64::from(*count)
        }
        RewardEntry::Other { .. } => 0.0,
    }
}

/// Value of owned, unlocked cards the mission would consume. Locked cards are
/// kept regardless, so they cost nothing to use.
pub fn opportunity_cost(
    mission: &MissionDefinition,
    inventory: &Inventory,
    pricing: &Pricing,
) -> f64 {
    mission
        .card_ids()
        .filter(|id| inventory.get(*id).is_some_and(|card| card.is_sellable()))
        .map(|id| pricing.card_price(inventory, id))
        .sum()
}
