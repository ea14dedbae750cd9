use crate::{fits_budget, Candidate, ObjectiveResult, ObjectiveStrategy, PlannerError};
use cardplan_core::MissionKind;
use std::cmp::Ordering;

/// Parses `key` and plans. An unknown key fails this call only.
pub fn run_objective(
    key: &str,
    pool: &[Candidate],
    budget: Option<f64>,
    anchor: Option<&str>,
) -> Result<ObjectiveResult, PlannerError> {
    let strategy: ObjectiveStrategy = key.parse()?;
    plan(strategy, pool, budget, anchor)
}

/// `budget = None` is unlimited.
pub fn plan(
    strategy: ObjectiveStrategy,
    pool: &[Candidate],
    budget: Option<f64>,
    anchor: Option<&str>,
) -> Result<ObjectiveResult, PlannerError> {
    if let Some(limit) = budget {
        if !limit.is_finite() || limit < 0.0 {
            return Err(PlannerError::InvalidBudget(limit));
        }
    }
    let result = match strategy {
        ObjectiveStrategy::CompleteChain => complete_chain(pool, budget, anchor),
        _ => greedy(strategy, pool, budget),
    };
    tracing::debug!(
        strategy = strategy.key(),
        selected = result.selected_ids.len(),
        eligible = result.eligible_pool_size,
        total_cost = result.total_cost,
        "objective planned"
    );
    Ok(result)
}

/// Filtered pool in the strategy's order. Completed and blocked candidates
/// never need spend, so no greedy strategy sees them.
pub fn ranked(strategy: ObjectiveStrategy, pool: &[Candidate]) -> Vec<&Candidate> {
    let mut eligible: Vec<&Candidate> = pool
        .iter()
        .filter(|candidate| !candidate.completed && candidate.cost.is_some())
        .filter(|candidate| passes_filter(strategy, candidate))
        .collect();
    eligible.sort_by(|a, b| compare(strategy, a, b));
    eligible
}

fn passes_filter(strategy: ObjectiveStrategy, candidate: &Candidate) -> bool {
    match strategy {
        ObjectiveStrategy::MaximizeNetValue => candidate.mission_value.is_some(),
        ObjectiveStrategy::MaximizeCount => true,
        ObjectiveStrategy::MaximizeRoi => candidate.roi().is_some(),
        ObjectiveStrategy::AffordableWins => {
            candidate.mission_value.is_some_and(|value| value > 0.0)
        }
        ObjectiveStrategy::CompleteChain => false,
    }
}

fn compare(strategy: ObjectiveStrategy, a: &Candidate, b: &Candidate) -> Ordering {
    match strategy {
        ObjectiveStrategy::MaximizeNetValue | ObjectiveStrategy::AffordableWins => {
            descending(a.mission_value, b.mission_value)
        }
        ObjectiveStrategy::MaximizeCount => ascending(a.cost, b.cost),
        ObjectiveStrategy::MaximizeRoi => descending(a.roi(), b.roi()),
        ObjectiveStrategy::CompleteChain => Ordering::Equal,
    }
}

fn ascending(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY).total_cmp(&b.unwrap_or(f64::INFINITY))
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(f64::NEG_INFINITY)
        .total_cmp(&a.unwrap_or(f64::NEG_INFINITY))
}

/// First fit in rank order: a candidate goes in when it still fits on top of
/// what is already selected. No reordering, no backtracking.
fn greedy(
    strategy: ObjectiveStrategy,
    pool: &[Candidate],
    budget: Option<f64>,
) -> ObjectiveResult {
    let eligible = ranked(strategy, pool);
    let mut result = ObjectiveResult::empty(strategy);
    result.eligible_pool_size = eligible.len();

    let mut running = 0.0;
    for candidate in eligible {
        let cost = candidate.cost.unwrap_or_default();
        if fits_budget(running + cost, budget) {
            running += cost;
            result.total_reward += candidate.reward_value.unwrap_or(0.0);
            result.selected_ids.push(candidate.id.clone());
        } else {
            result.skipped_ids.push(candidate.id.clone());
        }
    }
    result.total_cost = running;
    result.net_gain = result.total_reward - running;
    result.budget_sufficient = result.skipped_ids.is_empty();
    result
}

/// Every unfinished child of the anchor chain, in declaration order. The
/// budget only decides `budget_sufficient`.
fn complete_chain(
    pool: &[Candidate],
    budget: Option<f64>,
    anchor: Option<&str>,
) -> ObjectiveResult {
    let mut result = ObjectiveResult::empty(ObjectiveStrategy::CompleteChain);
    let Some(anchor) = anchor
        .and_then(|id| pool.iter().find(|candidate| candidate.id == id))
        .filter(|candidate| candidate.kind == MissionKind::Chain)
    else {
        return result;
    };

    for child_id in &anchor.child_mission_ids {
        let child = pool.iter().find(|candidate| &candidate.id == child_id);
        if child.is_some_and(|candidate| candidate.completed) {
            continue;
        }
        match child.and_then(|candidate| candidate.cost) {
            Some(cost) => result.total_cost += cost,
            None => result.unpriced_ids.push(child_id.clone()),
        }
        result.total_reward += child
            .and_then(|candidate| candidate.reward_value)
            .unwrap_or(0.0);
        result.selected_ids.push(child_id.clone());
    }
    result.eligible_pool_size = result.selected_ids.len();
    result.net_gain = result.total_reward - result.total_cost;
    result.budget_sufficient = fits_budget(result.total_cost, budget);
    result
}
