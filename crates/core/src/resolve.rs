//! Mission aggregation for one evaluation pass.
//!
//! An [`EvaluationPass`] borrows an immutable snapshot and resolves missions on
//! demand. Chains recurse into their children through a memo owned by the pass,
//! so a child shared by several chains is resolved once. Dropping the pass drops
//! the memo; any input change means building a new pass.

use crate::{
    is_complete, opportunity_cost, owned_card_count, owned_points, reward_value, solve_count,
    solve_points, sort_by_price, CardId, EngineConfig, Inventory, MissionBook, MissionDefinition,
    MissionId, MissionKind, Pricing, PricedCard, Selection, SolveError,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    MissingChild { mission_id: MissionId },
    MissingCard { card_id: CardId },
    CycleDetected { mission_id: MissionId },
    DependsOnCycle { mission_id: MissionId },
    PointCeiling { total: u64, ceiling: u32 },
    TableTooLarge { cells: u64, limit: u64 },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChild { mission_id } => write!(f, "missing child mission {mission_id}"),
            Self::MissingCard { card_id } => write!(f, "unknown card {card_id}"),
            Self::CycleDetected { mission_id } => write!(f, "cycle through {mission_id}"),
            Self::DependsOnCycle { mission_id } => {
                write!(f, "child {mission_id} is blocked by a cycle")
            }
            Self::PointCeiling { total, ceiling } => {
                write!(f, "point total {total} exceeds ceiling {ceiling}")
            }
            Self::TableTooLarge { cells, limit } => {
                write!(f, "solver table of {cells} cells exceeds limit {limit}")
            }
        }
    }
}

impl From<SolveError> for BlockReason {
    fn from(value: SolveError) -> Self {
        match value {
            SolveError::PointCeiling { total, ceiling } => Self::PointCeiling { total, ceiling },
            SolveError::TableTooLarge { cells, limit } => Self::TableTooLarge { cells, limit },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainingCost {
    Cost(f64),
    Blocked(BlockReason),
}

impl RemainingCost {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Cost(cost) => Some(*cost),
            Self::Blocked(_) => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMission {
    pub id: MissionId,
    pub kind: MissionKind,
    pub completed: bool,
    pub remaining_cost: RemainingCost,
    #[serde(default)]
    pub included_card_ids: Vec<CardId>,
    #[serde(default)]
    pub selected_child_ids: Vec<MissionId>,
    #[serde(default)]
    pub child_mission_ids: Vec<MissionId>,
    pub reward_value: Option<f64>,
    pub mission_value: Option<f64>,
    #[serde(default)]
    pub opportunity_cost: f64,
    pub progress: String,
}

impl ResolvedMission {
    pub fn cost(&self) -> Option<f64> {
        self.remaining_cost.amount()
    }

    pub fn block_reason(&self) -> Option<&BlockReason> {
        match &self.remaining_cost {
            RemainingCost::Blocked(reason) => Some(reason),
            RemainingCost::Cost(_) => None,
        }
    }
}

fn mission_value(reward: Option<f64>, cost: &RemainingCost) -> Option<f64> {
    Some(reward? - cost.amount()?)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown mission {0}")]
    UnknownMission(MissionId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub resolved: usize,
    pub memo_hits: usize,
}

enum Lookup {
    Resolved(ResolvedMission),
    Missing,
    Cycle,
}

#[derive(Debug)]
pub struct EvaluationPass<'a> {
    inventory: &'a Inventory,
    missions: &'a MissionBook,
    pricing: &'a Pricing,
    config: EngineConfig,
    memo: HashMap<MissionId, ResolvedMission>,
    /// Missions currently being resolved, outermost first.
    stack: Vec<MissionId>,
    /// Missions found to sit on a cycle.
    cyclic: HashSet<MissionId>,
    stats: PassStats,
}

impl<'a> EvaluationPass<'a> {
    pub fn new(
        inventory: &'a Inventory,
        missions: &'a MissionBook,
        pricing: &'a Pricing,
        config: EngineConfig,
    ) -> Self {
        tracing::debug!(
            cards = inventory.len(),
            missions = missions.len(),
            mode = pricing.mode.key(),
            "evaluation pass started"
        );
        Self {
            inventory,
            missions,
            pricing,
            config,
            memo: HashMap::new(),
            stack: Vec::new(),
            cyclic: HashSet::new(),
            stats: PassStats::default(),
        }
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    pub fn resolve(&mut self, id: &str) -> Result<ResolvedMission, ResolveError> {
        match self.lookup(id) {
            Lookup::Resolved(resolved) => Ok(resolved),
            Lookup::Missing | Lookup::Cycle => Err(ResolveError::UnknownMission(id.to_string())),
        }
    }

    pub fn resolve_all(&mut self) -> BTreeMap<MissionId, ResolvedMission> {
        let missions = self.missions;
        let mut out = BTreeMap::new();
        for id in missions.ids() {
            if let Lookup::Resolved(resolved) = self.lookup(id) {
                out.insert(id.to_string(), resolved);
            }
        }
        tracing::debug!(
            resolved = self.stats.resolved,
            memo_hits = self.stats.memo_hits,
            "evaluation pass finished"
        );
        out
    }

    fn lookup(&mut self, id: &str) -> Lookup {
        if let Some(done) = self.memo.get(id) {
            self.stats.memo_hits += 1;
            return Lookup::Resolved(done.clone());
        }
        if let Some(pos) = self.stack.iter().position(|open| open == id) {
            self.cyclic.extend(self.stack[pos..].iter().cloned());
            return Lookup::Cycle;
        }
        let missions = self.missions;
        let Some(definition) = missions.get(id) else {
            return Lookup::Missing;
        };

        self.stack.push(id.to_string());
        let resolved = match definition.kind {
            MissionKind::Chain => self.resolve_chain(definition),
            MissionKind::LeafCount | MissionKind::LeafPoints => self.resolve_leaf(definition),
        };
        self.stack.pop();
        self.stats.resolved += 1;

        match resolved.block_reason() {
            Some(reason) => tracing::warn!(mission = %id, %reason, "mission blocked"),
            None => tracing::debug!(
                mission = %id,
                completed = resolved.completed,
                cost = resolved.cost().unwrap_or_default(),
                "mission resolved"
            ),
        }
        self.memo.insert(id.to_string(), resolved.clone());
        Lookup::Resolved(resolved)
    }

    fn resolve_leaf(&self, definition: &MissionDefinition) -> ResolvedMission {
        let reward = reward_value(definition, self.inventory, self.pricing);
        let opportunity = opportunity_cost(definition, self.inventory, self.pricing);
        let base = ResolvedMission {
            id: definition.id.clone(),
            kind: definition.kind,
            completed: false,
            remaining_cost: RemainingCost::Cost(0.0),
            included_card_ids: Vec::new(),
            selected_child_ids: Vec::new(),
            child_mission_ids: Vec::new(),
            reward_value: reward,
            mission_value: None,
            opportunity_cost: opportunity,
            progress: String::new(),
        };

        if let Some(card_id) = definition
            .card_ids()
            .find(|id| self.inventory.get(*id).is_none())
        {
            return blocked(base, BlockReason::MissingCard { card_id });
        }

        let mut unowned: Vec<PricedCard> = definition
            .card_requirements
            .iter()
            .filter(|req| !self.inventory.is_owned(req.card_id))
            .map(|req| {
                PricedCard::new(
                    req.card_id,
                    self.pricing.card_price(self.inventory, req.card_id),
                    req.points(),
                )
            })
            .collect();

        let required = definition.required_amount;
        let (solved, progress) = match definition.kind {
            MissionKind::LeafPoints => {
                let owned = owned_points(definition, self.inventory);
                let residual = required.saturating_sub(i64::try_from(owned).unwrap_or(i64::MAX));
                (
                    solve_points(residual, &unowned, &self.config),
                    format!("{owned}/{required} points"),
                )
            }
            _ => {
                sort_by_price(&mut unowned);
                let owned = owned_card_count(definition, self.inventory);
                (
                    Ok(solve_count(required, owned, &unowned)),
                    format!("{owned}/{required} cards"),
                )
            }
        };

        let Selection { cost, card_ids } = match solved {
            Ok(selection) => selection,
            Err(err) => return blocked(base, err.into()),
        };
        let remaining_cost = RemainingCost::Cost(cost);
        ResolvedMission {
            completed: is_complete(definition, self.inventory),
            mission_value: mission_value(reward, &remaining_cost),
            remaining_cost,
            included_card_ids: card_ids,
            progress,
            ..base
        }
    }

    fn resolve_chain(&mut self, definition: &MissionDefinition) -> ResolvedMission {
        let base = ResolvedMission {
            id: definition.id.clone(),
            kind: definition.kind,
            completed: false,
            remaining_cost: RemainingCost::Cost(0.0),
            included_card_ids: Vec::new(),
            selected_child_ids: Vec::new(),
            child_mission_ids: definition.child_mission_ids.clone(),
            reward_value: reward_value(definition, self.inventory, self.pricing),
            mission_value: None,
            opportunity_cost: 0.0,
            progress: String::new(),
        };

        let mut children = Vec::with_capacity(definition.child_mission_ids.len());
        let mut problem: Option<BlockReason> = None;
        for child_id in &definition.child_mission_ids {
            let reason = match self.lookup(child_id) {
                Lookup::Resolved(child) => {
                    let behind_cycle = matches!(
                        child.block_reason(),
                        Some(
                            BlockReason::CycleDetected { .. }
                                | BlockReason::DependsOnCycle { .. }
                        )
                    );
                    children.push(child);
                    if !behind_cycle {
                        continue;
                    }
                    let mission_id = child_id.clone();
                    if self.cyclic.contains(&definition.id) {
                        BlockReason::CycleDetected { mission_id }
                    } else {
                        BlockReason::DependsOnCycle { mission_id }
                    }
                }
                Lookup::Missing => BlockReason::MissingChild {
                    mission_id: child_id.clone(),
                },
                Lookup::Cycle => BlockReason::CycleDetected {
                    mission_id: child_id.clone(),
                },
            };
            problem.get_or_insert(reason);
        }
        if let Some(reason) = problem {
            return blocked(base, reason);
        }

        let required = definition.required_amount;
        let done = children.iter().filter(|child| child.completed).count();
        let done_i64 = i64::try_from(done).unwrap_or(i64::MAX);
        let remaining_needed = usize::try_from(required.saturating_sub(done_i64).max(0))
            .unwrap_or(usize::MAX);

        // Only children that still cost something compete for the open slots.
        let mut pool: Vec<(&MissionId, f64)> = children
            .iter()
            .filter(|child| !child.completed)
            .filter_map(|child| {
                child
                    .cost()
                    .filter(|cost| *cost > 0.0)
                    .map(|cost| (&child.id, cost))
            })
            .collect();
        pool.sort_by(|a, b| a.1.total_cmp(&b.1));
        pool.truncate(remaining_needed);

        let remaining_cost = RemainingCost::Cost(pool.iter().map(|(_, cost)| cost).sum());
        let selected_child_ids = pool.into_iter().map(|(id, _)| id.clone()).collect();
        ResolvedMission {
            completed: done_i64 >= required,
            mission_value: mission_value(base.reward_value, &remaining_cost),
            remaining_cost,
            selected_child_ids,
            progress: format!("{done}/{required} missions"),
            ..base
        }
    }
}

fn blocked(base: ResolvedMission, reason: BlockReason) -> ResolvedMission {
    ResolvedMission {
        completed: false,
        mission_value: None,
        included_card_ids: Vec::new(),
        selected_child_ids: Vec::new(),
        progress: format!("blocked: {reason}"),
        remaining_cost: RemainingCost::Blocked(reason),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, PriceMode, RewardEntry};

    fn inventory() -> Inventory {
        Inventory::from_cards(vec![
            Card::new(1, "Ember").with_prices(1.0, 0.5).owned(),
            Card::new(2, "Frost").with_prices(3.0, 2.0),
            Card::new(3, "Gale").with_prices(2.0, 1.0),
            Card::new(4, "Husk").with_prices(6.0, 9.0),
        ])
        .expect("inventory")
    }

    fn resolve_one(book: &MissionBook, pricing: &Pricing, id: &str) -> ResolvedMission {
        let inventory = inventory();
        let mut pass = EvaluationPass::new(&inventory, book, pricing, EngineConfig::default());
        pass.resolve(id).expect("resolve")
    }

    #[test]
    fn count_leaf_buys_cheapest_missing_cards() {
        let book = MissionBook::from_definitions(vec![MissionDefinition::leaf_count(
            "collect",
            3,
            &[1, 2, 3, 4],
        )
        .with_rewards(vec![RewardEntry::Card {
            card_id: 4,
            count: 1,
        }])])
        .expect("book");
        let resolved = resolve_one(&book, &Pricing::new(PriceMode::Market), "collect");
        assert!(!resolved.completed);
        assert_eq!(resolved.included_card_ids, vec![3, 2]);
        assert_eq!(resolved.cost(), Some(5.0));
        assert_eq!(resolved.reward_value, Some(6.0));
        assert_eq!(resolved.mission_value, Some(1.0));
        assert_eq!(resolved.opportunity_cost, 1.0);
        assert_eq!(resolved.progress, "1/3 cards");
    }

    #[test]
    fn override_changes_selection() {
        let book =
            MissionBook::from_definitions(vec![MissionDefinition::leaf_count("pick", 1, &[2, 4])])
                .expect("book");
        let market = resolve_one(&book, &Pricing::new(PriceMode::Market), "pick");
        assert_eq!(market.included_card_ids, vec![2]);
        let overridden = resolve_one(
            &book,
            &Pricing::new(PriceMode::Market).with_override(4, 0.25),
            "pick",
        );
        assert_eq!(overridden.included_card_ids, vec![4]);
        assert_eq!(overridden.cost(), Some(0.25));
    }

    #[test]
    fn points_leaf_solves_residual_target() {
        let book = MissionBook::from_definitions(vec![MissionDefinition::leaf_points(
            "score",
            6,
            &[(1, 3), (2, 2), (3, 1), (4, 3)],
        )])
        .expect("book");
        let resolved = resolve_one(&book, &Pricing::new(PriceMode::Market), "score");
        assert_eq!(resolved.progress, "3/6 points");
        assert_eq!(resolved.included_card_ids, vec![2, 3]);
        assert_eq!(resolved.cost(), Some(5.0));
        assert_eq!(resolved.mission_value, None);
    }

    #[test]
    fn unknown_card_blocks_leaf() {
        let book =
            MissionBook::from_definitions(vec![MissionDefinition::leaf_count("ghost", 1, &[99])])
                .expect("book");
        let resolved = resolve_one(&book, &Pricing::default(), "ghost");
        assert_eq!(
            resolved.remaining_cost,
            RemainingCost::Blocked(BlockReason::MissingCard { card_id: 99 })
        );
        assert!(!resolved.completed);
    }

    #[test]
    fn point_ceiling_blocks_leaf() {
        let book = MissionBook::from_definitions(vec![MissionDefinition::leaf_points(
            "huge",
            50,
            &[(2, 40), (3, 40)],
        )])
        .expect("book");
        let inventory = inventory();
        let pricing = Pricing::default();
        let config = EngineConfig::default().with_max_point_total(64);
        let mut pass = EvaluationPass::new(&inventory, &book, &pricing, config);
        let resolved = pass.resolve("huge").expect("resolve");
        assert_eq!(
            resolved.block_reason(),
            Some(&BlockReason::PointCeiling {
                total: 80,
                ceiling: 64
            })
        );
    }

    #[test]
    fn unknown_top_level_mission_is_an_error() {
        let book = MissionBook::new();
        let inventory = inventory();
        let pricing = Pricing::default();
        let mut pass = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
        assert_eq!(
            pass.resolve("nope"),
            Err(ResolveError::UnknownMission("nope".to_string()))
        );
    }

    #[test]
    fn shared_child_is_resolved_once() {
        let book = MissionBook::from_definitions(vec![
            MissionDefinition::leaf_count("shared", 1, &[2]),
            MissionDefinition::chain("left", 1, &["shared"]),
            MissionDefinition::chain("right", 1, &["shared"]),
        ])
        .expect("book");
        let inventory = inventory();
        let pricing = Pricing::default();
        let mut pass = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
        let all = pass.resolve_all();
        assert_eq!(all.len(), 3);
        assert_eq!(pass.stats().resolved, 3);
        assert_eq!(all["left"].cost(), Some(3.0));
        assert_eq!(all["right"].cost(), Some(3.0));
    }

    #[test]
    fn cycle_is_reported_not_followed() {
        let book = MissionBook::from_definitions(vec![
            MissionDefinition::chain("a", 1, &["b"]),
            MissionDefinition::chain("b", 1, &["a"]),
            MissionDefinition::leaf_count("solo", 1, &[3]),
        ])
        .expect("book");
        let inventory = inventory();
        let pricing = Pricing::default();
        let mut pass = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
        let all = pass.resolve_all();
        assert!(matches!(
            all["a"].block_reason(),
            Some(BlockReason::CycleDetected { .. })
        ));
        assert!(matches!(
            all["b"].block_reason(),
            Some(BlockReason::CycleDetected { .. })
        ));
        assert_eq!(all["solo"].cost(), Some(2.0));
    }

    #[test]
    fn chain_above_a_cycle_is_not_part_of_it() {
        let book = MissionBook::from_definitions(vec![
            MissionDefinition::chain("x", 1, &["a"]),
            MissionDefinition::chain("top", 1, &["x"]),
            MissionDefinition::chain("a", 1, &["b"]),
            MissionDefinition::chain("b", 1, &["a"]),
        ])
        .expect("book");
        let inventory = inventory();
        let pricing = Pricing::default();

        // Entering through the outer chain first must not taint it.
        let mut pass = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
        let top = pass.resolve("top").expect("resolve");
        assert_eq!(
            top.block_reason(),
            Some(&BlockReason::DependsOnCycle {
                mission_id: "x".to_string()
            })
        );
        let all = pass.resolve_all();
        assert_eq!(
            all["x"].block_reason(),
            Some(&BlockReason::DependsOnCycle {
                mission_id: "a".to_string()
            })
        );
        assert_eq!(
            all["a"].block_reason(),
            Some(&BlockReason::CycleDetected {
                mission_id: "b".to_string()
            })
        );
        assert_eq!(
            all["b"].block_reason(),
            Some(&BlockReason::CycleDetected {
                mission_id: "a".to_string()
            })
        );

        // Same verdicts when the cycle members are resolved first.
        let mut fresh = EvaluationPass::new(&inventory, &book, &pricing, EngineConfig::default());
        fresh.resolve("a").expect("resolve");
        assert_eq!(
            fresh.resolve("x").expect("resolve").block_reason(),
            Some(&BlockReason::DependsOnCycle {
                mission_id: "a".to_string()
            })
        );
    }
}
