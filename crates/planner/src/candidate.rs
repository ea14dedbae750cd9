use cardplan_core::{MissionId, MissionKind, ResolvedMission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved mission flattened to what the planner ranks on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: MissionId,
    pub kind: MissionKind,
    pub completed: bool,
    /// `None` when the mission is blocked.
    pub cost: Option<f64>,
    pub reward_value: Option<f64>,
    pub mission_value: Option<f64>,
    #[serde(default)]
    pub child_mission_ids: Vec<MissionId>,
}

impl Candidate {
    pub fn leaf(id: impl Into<String>, cost: f64, reward_value: Option<f64>) -> Self {
        Self {
            id: id.into(),
            kind: MissionKind::LeafCount,
            completed: false,
            cost: Some(cost),
            reward_value,
            mission_value: reward_value.map(|reward| reward - cost),
            child_mission_ids: Vec::new(),
        }
    }

    pub fn chain(id: impl Into<String>, children: &[&str]) -> Self {
        Self {
            id: id.into(),
            kind: MissionKind::Chain,
            completed: false,
            cost: Some(0.0),
            reward_value: None,
            mission_value: None,
            child_mission_ids: children.iter().map(|child| child.to_string()).collect(),
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.cost = None;
        self.mission_value = None;
        self
    }

    /// Reward per unit of spend; only defined for positive cost and a known reward.
    pub fn roi(&self) -> Option<f64> {
        let cost = self.cost.filter(|cost| *cost > 0.0)?;
        Some(self.reward_value? / cost)
    }
}

impl From<&ResolvedMission> for Candidate {
    fn from(value: &ResolvedMission) -> Self {
        Self {
            id: value.id.clone(),
            kind: value.kind,
            completed: value.completed,
            cost: value.cost(),
            reward_value: value.reward_value,
            mission_value: value.mission_value,
            child_mission_ids: value.child_mission_ids.clone(),
        }
    }
}

/// Every resolved mission as a candidate, in id order. Strategy filters decide
/// eligibility later.
pub fn candidate_pool(resolved: &BTreeMap<MissionId, ResolvedMission>) -> Vec<Candidate> {
    resolved.values().map(Candidate::from).collect()
}
