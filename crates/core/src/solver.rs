//! Minimum-cost solvers for leaf missions.
//!
//! Count missions take the cheapest unowned cards. Points missions are a 0/1
//! knapsack run backwards: the cheapest subset of unowned cards whose point
//! weights sum to at least the residual target. The points table keeps every
//! row so the chosen subset can be rebuilt without reusing a card.

use crate::{CardId, EngineConfig, Inventory, MissionDefinition, MissionKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedCard {
    pub id: CardId,
    pub price: f64,
    #[serde(default)]
    pub points: u32,
}

impl PricedCard {
    pub fn new(id: CardId, price: f64, points: u32) -> Self {
        Self { id, price, points }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub cost: f64,
    pub card_ids: Vec<CardId>,
}

impl Selection {
    fn from_cards(cards: &[PricedCard]) -> Self {
        Self {
            cost: cards.iter().map(|card| card.price).sum(),
            card_ids: cards.iter().map(|card| card.id).collect(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("point total {total} exceeds ceiling {ceiling}")]
    PointCeiling { total: u64, ceiling: u32 },
    #[error("solver table of {cells} cells exceeds limit {limit}")]
    TableTooLarge { cells: u64, limit: u64 },
}

/// Stable ascending sort by price; equal prices keep their requirement order.
pub fn sort_by_price(cards: &mut [PricedCard]) {
    cards.sort_by(|a, b| a.price.total_cmp(&b.price));
}

/// Cheapest `required - owned_count` cards from an ascending list. When the
/// list is too short every card is returned and the mission stays incomplete.
pub fn solve_count(
    required: i64,
    owned_count: usize,
    unowned_ascending: &[PricedCard],
) -> Selection {
    let owned = i64::try_from(owned_count).unwrap_or(i64::MAX);
    let needed = required.saturating_sub(owned).max(0);
    let take = usize::try_from(needed)
        .unwrap_or(usize::MAX)
        .min(unowned_ascending.len());
    Selection::from_cards(&unowned_ascending[..take])
}

/// Minimum-cost subset reaching at least `required_points`.
///
/// Ties on cost resolve to the smallest reachable point total; within that
/// total the rebuild walks candidates last to first and keeps a card whenever
/// it is consistent with the table, so later candidates win remaining ties.
/// An unreachable target selects every candidate. Oversized tables are refused
/// before anything is allocated.
pub fn solve_points(
    required_points: i64,
    candidates: &[PricedCard],
    limits: &EngineConfig,
) -> Result<Selection, SolveError> {
    let cards: Vec<PricedCard> = candidates
        .iter()
        .copied()
        .filter(|card| card.points > 0)
        .collect();
    if required_points <= 0 || cards.is_empty() {
        return Ok(Selection::default());
    }

    let total: u64 = cards.iter().map(|card| u64::from(card.points)).sum();
    let ceiling = limits.max_point_total;
    if total > u64::from(ceiling) {
        return Err(SolveError::PointCeiling { total, ceiling });
    }
    let max_points = total as usize;
    let required = usize::try_from(required_points).unwrap_or(usize::MAX);
    if max_points < required {
        return Ok(Selection::from_cards(&cards));
    }
    let cells = (cards.len() as u64 + 1).saturating_mul(total + 1);
    if cells > limits.max_table_cells {
        return Err(SolveError::TableTooLarge {
            cells,
            limit: limits.max_table_cells,
        });
    }

    let table = fill_table(&cards, max_points);
    let Some((target, cost)) = cheapest_total(&table[cards.len()], required) else {
        return Ok(Selection::from_cards(&cards));
    };
    let card_ids = rebuild(&table, &cards, target);
    Ok(Selection { cost, card_ids })
}

type CostRow = Vec<Option<f64>>;

/// `table[i][j]`: cheapest way to hit exactly `j` points with the first `i` cards.
fn fill_table(cards: &[PricedCard], max_points: usize) -> Vec<CostRow> {
    let mut table: Vec<CostRow> = vec![vec![None; max_points + 1]; cards.len() + 1];
    table[0][0] = Some(0.0);
    for (i, card) in cards.iter().enumerate() {
        let weight = card.points as usize;
        let (done, rest) = table.split_at_mut(i + 1);
        let prev = &done[i];
        let next = &mut rest[0];
        for j in 0..=max_points {
            let skip = prev[j];
            let take = if j >= weight {
                prev[j - weight].map(|cost| cost + card.price)
            } else {
                None
            };
            next[j] = cheaper(skip, take);
        }
    }
    table
}

fn cheaper(skip: Option<f64>, take: Option<f64>) -> Option<f64> {
    match (skip, take) {
        (Some(a), Some(b)) => Some(if b < a { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

fn cheapest_total(last_row: &[Option<f64>], required: usize) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (points, cost) in last_row.iter().enumerate().skip(required) {
        let Some(cost) = *cost else {
            continue;
        };
        match best {
            Some((_, current)) if cost >= current => {}
            _ => best = Some((points, cost)),
        }
    }
    best
}

fn rebuild(table: &[CostRow], cards: &[PricedCard], target: usize) -> Vec<CardId> {
    let mut points = target;
    let mut picked = Vec::new();
    for i in (0..cards.len()).rev() {
        if points == 0 {
            break;
        }
        let card = cards[i];
        let weight = card.points as usize;
        if points < weight {
            continue;
        }
        if let (Some(before), Some(after)) = (table[i][points - weight], table[i + 1][points]) {
            if before + card.price == after {
                picked.push(card.id);
                points -= weight;
            }
        }
    }
    picked.reverse();
    picked
}

pub fn owned_card_count(mission: &MissionDefinition, inventory: &Inventory) -> usize {
    mission
        .card_ids()
        .filter(|id| inventory.is_owned(*id))
        .count()
}

pub fn owned_points(mission: &MissionDefinition, inventory: &Inventory) -> u64 {
    mission
        .card_requirements
        .iter()
        .filter(|req| inventory.is_owned(req.card_id))
        .map(|req| u64::from(req.points()))
        .sum()
}

/// Completion straight from ownership, independent of any cost. Chains are
/// completed through their children, never here.
pub fn is_complete(mission: &MissionDefinition, inventory: &Inventory) -> bool {
    match mission.kind {
        MissionKind::LeafCount => {
            (owned_card_count(mission, inventory) as i64) >= mission.required_amount
        }
        MissionKind::LeafPoints => {
            (owned_points(mission, inventory) as i64) >= mission.required_amount
        }
        MissionKind::Chain => false,
    }
}
