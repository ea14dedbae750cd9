use cardplan_core::{
    BlockReason, Card, EngineConfig, EvaluationPass, Inventory, MissionBook, MissionDefinition,
    PriceMode, Pricing, RemainingCost, ResolvedMission,
};
use std::collections::BTreeMap;

fn inventory() -> Inventory {
    Inventory::from_cards(vec![
        Card::new(10, "Owned A").with_prices(1.0, 1.0).owned(),
        Card::new(11, "Owned B").with_prices(1.0, 1.0).owned().locked(),
        Card::new(20, "Cheap").with_prices(2.0, 1.0),
        Card::new(21, "Mid").with_prices(5.0, 4.0),
        Card::new(22, "Dear").with_prices(9.0, 8.0),
        Card::new(23, "Free").with_prices(0.0, 0.0),
    ])
    .expect("inventory")
}

fn resolve_all(definitions: Vec<MissionDefinition>) -> BTreeMap<String, ResolvedMission> {
    let inventory = inventory();
    let book = MissionBook::from_definitions(definitions).expect("book");
    let pricing = Pricing::new(PriceMode::Market);
    let mut pass = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
    pass.resolve_all()
}

fn leaves() -> Vec<MissionDefinition> {
    vec![
        MissionDefinition::leaf_count("done_a", 1, &[10]),
        MissionDefinition::leaf_count("done_b", 1, &[11]),
        MissionDefinition::leaf_count("cheap", 1, &[20]),
        MissionDefinition::leaf_count("mid", 1, &[21]),
        MissionDefinition::leaf_count("dear", 1, &[22]),
        MissionDefinition::leaf_count("free", 1, &[23]),
    ]
}

fn with(extra: MissionDefinition) -> Vec<MissionDefinition> {
    let mut definitions = leaves();
    definitions.push(extra);
    definitions
}

#[test]
fn satisfied_chain_costs_nothing() {
    let all = resolve_all(with(MissionDefinition::chain(
        "chain",
        2,
        &["done_a", "done_b", "dear", "mid"],
    )));
    let chain = &all["chain"];
    assert!(chain.completed);
    assert_eq!(chain.remaining_cost, RemainingCost::Cost(0.0));
    assert!(chain.selected_child_ids.is_empty());
    assert_eq!(chain.progress, "2/2 missions");
}

#[test]
fn chain_picks_cheapest_open_children() {
    let all = resolve_all(with(MissionDefinition::chain(
        "chain",
        3,
        &["done_a", "dear", "mid", "cheap"],
    )));
    let chain = &all["chain"];
    assert!(!chain.completed);
    assert_eq!(chain.selected_child_ids, vec!["cheap", "mid"]);
    assert_eq!(chain.cost(), Some(7.0));
    assert_eq!(chain.child_mission_ids.len(), 4);
}

#[test]
fn selection_is_capped_by_pool_size() {
    let all = resolve_all(with(MissionDefinition::chain(
        "chain",
        5,
        &["cheap", "mid", "done_a"],
    )));
    let chain = &all["chain"];
    assert_eq!(chain.selected_child_ids, vec!["cheap", "mid"]);
    assert_eq!(chain.cost(), Some(7.0));
    assert!(!chain.completed);
}

#[test]
fn zero_cost_open_children_are_not_counted() {
    let all = resolve_all(with(MissionDefinition::chain(
        "chain",
        2,
        &["free", "dear", "mid"],
    )));
    let chain = &all["chain"];
    assert!(!all["free"].completed);
    assert_eq!(chain.selected_child_ids, vec!["mid", "dear"]);
    assert_eq!(chain.cost(), Some(14.0));
}

#[test]
fn missing_child_blocks_only_its_chain() {
    let mut definitions = with(MissionDefinition::chain("broken", 1, &["cheap", "gone"]));
    definitions.push(MissionDefinition::chain("parent", 1, &["broken", "mid"]));
    definitions.push(MissionDefinition::chain("sibling", 1, &["cheap"]));
    let all = resolve_all(definitions);

    let broken = &all["broken"];
    assert_eq!(
        broken.remaining_cost,
        RemainingCost::Blocked(BlockReason::MissingChild {
            mission_id: "gone".to_string()
        })
    );
    assert!(!broken.completed);
    assert_eq!(all["sibling"].cost(), Some(2.0));
    // A blocked child has no cost, so it never competes for the parent's slots.
    assert_eq!(all["parent"].selected_child_ids, vec!["mid"]);
    assert_eq!(all["parent"].cost(), Some(5.0));
}

#[test]
fn nested_chains_resolve_bottom_up() {
    let mut definitions = with(MissionDefinition::chain("inner", 2, &["cheap", "mid", "dear"]));
    definitions.push(MissionDefinition::chain("outer", 1, &["inner", "dear"]));
    let all = resolve_all(definitions);
    assert_eq!(all["inner"].cost(), Some(7.0));
    assert_eq!(all["outer"].selected_child_ids, vec!["inner"]);
    assert_eq!(all["outer"].cost(), Some(7.0));
}

#[test]
fn new_pass_sees_updated_inventory() {
    let book = MissionBook::from_definitions(leaves()).expect("book");
    let pricing = Pricing::new(PriceMode::Market);
    let mut inventory = inventory();
    let before = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default())
        .resolve("cheap")
        .expect("resolve");
    assert!(!before.completed);

    let mut cards: Vec<Card> = inventory.cards().cloned().collect();
    for card in cards.iter_mut().filter(|card| card.id == 20) {
        card.owned = true;
    }
    inventory = Inventory::from_cards(cards).expect("inventory");
    let after = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default())
        .resolve("cheap")
        .expect("resolve");
    assert!(after.completed);
    assert_eq!(after.cost(), Some(0.0));
}
