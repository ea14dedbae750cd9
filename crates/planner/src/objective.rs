use crate::PlannerError;
use cardplan_core::MissionId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStrategy {
    MaximizeNetValue,
    MaximizeCount,
    MaximizeRoi,
    AffordableWins,
    CompleteChain,
}

impl ObjectiveStrategy {
    pub const ALL: [ObjectiveStrategy; 5] = [
        Self::MaximizeNetValue,
        Self::MaximizeCount,
        Self::MaximizeRoi,
        Self::AffordableWins,
        Self::CompleteChain,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::MaximizeNetValue => "maximize_net_value",
            Self::MaximizeCount => "maximize_count",
            Self::MaximizeRoi => "maximize_roi",
            Self::AffordableWins => "affordable_wins",
            Self::CompleteChain => "complete_chain",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MaximizeNetValue => "maximize net value",
            Self::MaximizeCount => "most missions",
            Self::MaximizeRoi => "best return per spend",
            Self::AffordableWins => "affordable wins",
            Self::CompleteChain => "complete chain",
        }
    }
}

impl FromStr for ObjectiveStrategy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| PlannerError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveResult {
    pub strategy: ObjectiveStrategy,
    pub selected_ids: Vec<MissionId>,
    pub total_cost: f64,
    pub total_reward: f64,
    pub net_gain: f64,
    pub budget_sufficient: bool,
    /// Size of the filtered pool before any budget truncation.
    pub eligible_pool_size: usize,
    /// Eligible candidates passed over because they did not fit the budget.
    #[serde(default)]
    pub skipped_ids: Vec<MissionId>,
    /// Chain children selected without a known cost.
    #[serde(default)]
    pub unpriced_ids: Vec<MissionId>,
}

impl ObjectiveResult {
    pub fn empty(strategy: ObjectiveStrategy) -> Self {
        Self {
            strategy,
            selected_ids: Vec::new(),
            total_cost: 0.0,
            total_reward: 0.0,
            net_gain: 0.0,
            budget_sufficient: true,
            eligible_pool_size: 0,
            skipped_ids: Vec::new(),
            unpriced_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }
}

pub fn fits_budget(total: f64, budget: Option<f64>) -> bool {
    budget.map_or(true, |limit| total <= limit)
}
