use crate::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Immutable card snapshot read by one evaluation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    cards: BTreeMap<CardId, Card>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("duplicate card id {0}")]
    DuplicateCard(CardId),
    #[error("card id {0} is reserved")]
    ReservedId(CardId),
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Result<Self, InventoryError> {
        let mut inventory = Self::new();
        for card in cards {
            inventory.insert(card)?;
        }
        Ok(inventory)
    }

    pub fn insert(&mut self, card: Card) -> Result<(), InventoryError> {
        if card.id == crate::UNMAPPED_CARD_ID {
            return Err(InventoryError::ReservedId(card.id));
        }
        if self.cards.contains_key(&card.id) {
            return Err(InventoryError::DuplicateCard(card.id));
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn is_owned(&self, id: CardId) -> bool {
        self.cards.get(&id).is_some_and(|card| card.owned)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}
