//! Player identification and the player aggregate.
//!
//! ## PlayerId
//!
//! Opaque string identifier assigned by the lobby.
//!
//! ## Player
//!
//! Everything the effect engine reads or writes for one seat: hand,
//! corporation, resources, production, active effects, card actions and the
//! derived requirement modifiers. Collections use `im` persistent structures
//! so the store can snapshot a player in O(1) and commit a modified copy
//! atomically.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::cards::{CardBehavior, CardId, TileKind};
use crate::effects::RequirementModifier;

use super::resources::Resources;

/// Player identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A passive behavior currently active for a player.
///
/// Exists exactly as long as the originating card's effects are subscribed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEffect {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
}

/// A manual behavior the player may activate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub card_id: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
}

/// An immediate behavior waiting for the player to pick one of its choices.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingChoice {
    pub card_id: CardId,
    pub behavior_index: usize,
}

/// The player aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub corporation: Option<CardId>,
    pub hand: Vector<CardId>,
    pub played_cards: Vector<CardId>,
    pub resources: Resources,
    pub production: Resources,
    pub terraform_rating: i32,
    pub effects: Vector<PlayerEffect>,
    pub actions: Vector<PlayerAction>,
    pub pending_choices: Vector<PendingChoice>,
    /// FIFO of tiles awaiting placement.
    pub pending_tiles: Vector<TileKind>,
    /// Resources held on cards (microbes, animals, ...).
    pub card_storage: OrdMap<CardId, i32>,
    pub requirement_modifiers: Vector<RequirementModifier>,
}

impl Player {
    /// Starting terraform rating.
    pub const STARTING_TR: i32 = 20;

    /// Create a player with an empty hand and no resources.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            corporation: None,
            hand: Vector::new(),
            played_cards: Vector::new(),
            resources: Resources::default(),
            production: Resources::default(),
            terraform_rating: Self::STARTING_TR,
            effects: Vector::new(),
            actions: Vector::new(),
            pending_choices: Vector::new(),
            pending_tiles: Vector::new(),
            card_storage: OrdMap::new(),
            requirement_modifiers: Vector::new(),
        }
    }

    /// Set starting resources (builder pattern).
    #[must_use]
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Add a card to the starting hand (builder pattern).
    #[must_use]
    pub fn with_hand_card(mut self, card: CardId) -> Self {
        self.hand.push_back(card);
        self
    }

    /// Whether a card is in hand.
    #[must_use]
    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    /// Remove one copy of a card from hand. Returns whether it was there.
    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        match self.hand.index_of(card) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every effect originating from `card`. Returns how many went.
    pub fn remove_effects_for(&mut self, card: &CardId) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| &e.card_id != card);
        before - self.effects.len()
    }

    /// Remove every action originating from `card`. Returns how many went.
    pub fn remove_actions_for(&mut self, card: &CardId) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| &a.card_id != card);
        before - self.actions.len()
    }

    /// Find an action entry.
    #[must_use]
    pub fn action(&self, card: &CardId, behavior_index: usize) -> Option<&PlayerAction> {
        self.actions
            .iter()
            .find(|a| &a.card_id == card && a.behavior_index == behavior_index)
    }

    /// Take a pending choice off the queue. Returns whether it was pending.
    pub fn take_pending_choice(&mut self, card: &CardId, behavior_index: usize) -> bool {
        let position = self
            .pending_choices
            .iter()
            .position(|c| &c.card_id == card && c.behavior_index == behavior_index);
        match position {
            Some(index) => {
                self.pending_choices.remove(index);
                true
            }
            None => false,
        }
    }

    /// Resources stored on a card.
    #[must_use]
    pub fn stored_on(&self, card: &CardId) -> i32 {
        self.card_storage.get(card).copied().unwrap_or(0)
    }

    /// Add resources to a card's storage, never going below zero.
    pub fn add_to_storage(&mut self, card: &CardId, delta: i32) {
        let current = self.stored_on(card);
        self.card_storage.insert(card.clone(), (current + delta).max(0));
    }

    /// Queue a tile for placement.
    pub fn enqueue_tile(&mut self, tile: TileKind) {
        self.pending_tiles.push_back(tile);
    }

    /// Next tile to place, in queue order.
    pub fn next_tile(&mut self) -> Option<TileKind> {
        self.pending_tiles.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id() {
        let id = PlayerId::new("alice");
        assert_eq!(id.as_str(), "alice");
        assert_eq!(format!("{}", id), "alice");
    }

    #[test]
    fn test_hand_operations() {
        let mut player = Player::new(PlayerId::new("p1"), "Alice")
            .with_hand_card(CardId::new("a"))
            .with_hand_card(CardId::new("b"));

        assert!(player.has_in_hand(&CardId::new("a")));
        assert!(player.remove_from_hand(&CardId::new("a")));
        assert!(!player.remove_from_hand(&CardId::new("a")));
        assert_eq!(player.hand.len(), 1);
    }

    #[test]
    fn test_remove_effects_for_card() {
        let mut player = Player::new(PlayerId::new("p1"), "Alice");
        for (card, index) in [("a", 0), ("a", 1), ("b", 0)] {
            player.effects.push_back(PlayerEffect {
                card_id: CardId::new(card),
                card_name: card.to_string(),
                behavior_index: index,
                behavior: CardBehavior::default(),
            });
        }

        assert_eq!(player.remove_effects_for(&CardId::new("a")), 2);
        assert_eq!(player.effects.len(), 1);
        assert_eq!(player.remove_effects_for(&CardId::new("a")), 0);
    }

    #[test]
    fn test_tile_queue_is_fifo() {
        let mut player = Player::new(PlayerId::new("p1"), "Alice");
        player.enqueue_tile(TileKind::Ocean);
        player.enqueue_tile(TileKind::City);

        assert_eq!(player.next_tile(), Some(TileKind::Ocean));
        assert_eq!(player.next_tile(), Some(TileKind::City));
        assert_eq!(player.next_tile(), None);
    }

    #[test]
    fn test_card_storage_floor() {
        let mut player = Player::new(PlayerId::new("p1"), "Alice");
        let card = CardId::new("tardigrades");
        player.add_to_storage(&card, 2);
        player.add_to_storage(&card, -5);
        assert_eq!(player.stored_on(&card), 0);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let original = Player::new(PlayerId::new("p1"), "Alice").with_hand_card(CardId::new("a"));
        let mut copy = original.clone();
        copy.remove_from_hand(&CardId::new("a"));

        assert_eq!(original.hand.len(), 1);
        assert!(copy.hand.is_empty());
    }
}
