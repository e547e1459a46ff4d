//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores every card definition known to the server.
//! It is filled once at startup by the card loader and then shared
//! read-only (behind an `Arc`) by all games.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{EngineError, Result};

use super::definition::{Card, CardId, CardType};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{Card, CardId, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(Card::new(CardId::new("009"), "Comet", CardType::Event).with_cost(21))
///     .unwrap();
///
/// let found = registry.get(&CardId::new("009")).unwrap();
/// assert_eq!(found.name, "Comet");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Arc<Card>>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Every behavior is validated; a duplicate ID or malformed behavior is
    /// rejected and leaves the registry unchanged.
    pub fn register(&mut self, card: Card) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::validation(&card.id, "card already registered"));
        }
        for behavior in &card.behaviors {
            behavior.validate(&card.id)?;
        }
        self.cards.insert(card.id.clone(), Arc::new(card));
        Ok(())
    }

    /// Register many cards, stopping at the first error.
    pub fn register_all(&mut self, cards: impl IntoIterator<Item = Card>) -> Result<()> {
        for card in cards {
            self.register(card)?;
        }
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Arc<Card>> {
        self.cards.get(id)
    }

    /// Get a card definition, or `CardNotFound`.
    pub fn lookup(&self, id: &CardId) -> Result<&Arc<Card>> {
        self.cards
            .get(id)
            .ok_or_else(|| EngineError::CardNotFound(id.clone()))
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Card>> {
        self.cards.values()
    }

    /// Find cards by type.
    pub fn find_by_type(&self, card_type: CardType) -> impl Iterator<Item = &Arc<Card>> {
        self.cards.values().filter(move |c| c.card_type == card_type)
    }
}
