use crate::CardId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub type MissionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    LeafCount,
    LeafPoints,
    Chain,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRequirement {
    pub card_id: CardId,
    #[serde(default)]
    pub point_weight: Option<u32>,
}

impl CardRequirement {
    pub fn card(card_id: CardId) -> Self {
        Self {
            card_id,
            point_weight: None,
        }
    }

    pub fn weighted(card_id: CardId, points: u32) -> Self {
        Self {
            card_id,
            point_weight: Some(points),
        }
    }

    pub fn points(&self) -> u32 {
        self.point_weight.unwrap_or(0)
    }
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEntry {
    Pack {
        pack_type: String,
        #[serde(default = "default_count")]
        count: u32,
    },
    Card {
        card_id: CardId,
        #[serde(default = "default_count")]
        count: u32,
    },
    Other {
        #[serde(default)]
        label: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionDefinition {
    pub id: MissionId,
    pub kind: MissionKind,
    pub required_amount: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reward_text: String,
    #[serde(default)]
    pub reward_entries: Option<Vec<RewardEntry>>,
    #[serde(default)]
    pub card_requirements: Vec<CardRequirement>,
    #[serde(default)]
    pub child_mission_ids: Vec<MissionId>,
}

impl MissionDefinition {
    pub fn leaf_count(id: impl Into<String>, required: i64, cards: &[CardId]) -> Self {
        Self::leaf(
            id,
            MissionKind::LeafCount,
            required,
            cards.iter().copied().map(CardRequirement::card).collect(),
        )
    }

    pub fn leaf_points(id: impl Into<String>, required: i64, cards: &[(CardId, u32)]) -> Self {
        Self::leaf(
            id,
            MissionKind::LeafPoints,
            required,
            cards
                .iter()
                .map(|(card_id, points)| CardRequirement::weighted(*card_id, *points))
                .collect(),
        )
    }

    pub fn chain(id: impl Into<String>, required: i64, children: &[&str]) -> Self {
        Self {
            id: id.into(),
            kind: MissionKind::Chain,
            required_amount: required,
            category: String::new(),
            reward_text: String::new(),
            reward_entries: None,
            card_requirements: Vec::new(),
            child_mission_ids: children.iter().map(|child| child.to_string()).collect(),
        }
    }

    fn leaf(
        id: impl Into<String>,
        kind: MissionKind,
        required: i64,
        card_requirements: Vec<CardRequirement>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            required_amount: required,
            category: String::new(),
            reward_text: String::new(),
            reward_entries: None,
            card_requirements,
            child_mission_ids: Vec::new(),
        }
    }

    pub fn with_rewards(mut self, entries: Vec<RewardEntry>) -> Self {
        self.reward_entries = Some(entries);
        self
    }

    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.card_requirements.iter().map(|req| req.card_id)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MissionBookError {
    #[error("duplicate mission id {0}")]
    DuplicateMission(MissionId),
}

/// Mission definitions keyed by id. Child references may dangle; they are
/// reported during resolution, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionBook {
    missions: BTreeMap<MissionId, MissionDefinition>,
}

impl MissionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MissionDefinition>,
    ) -> Result<Self, MissionBookError> {
        let mut book = Self::new();
        for definition in definitions {
            book.insert(definition)?;
        }
        Ok(book)
    }

    pub fn insert(&mut self, definition: MissionDefinition) -> Result<(), MissionBookError> {
        if self.missions.contains_key(&definition.id) {
            return Err(MissionBookError::DuplicateMission(definition.id));
        }
        self.missions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MissionDefinition> {
        self.missions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.missions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }
}
