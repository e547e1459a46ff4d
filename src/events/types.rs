//! Game-state change events.
//!
//! One struct per change category. Every event carries the game it belongs
//! to; the bus is per game, but handlers still check the ID so a misrouted
//! event is ignored instead of applied to the wrong table.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardId, CardType, Condition, TileKind, TriggerKind};
use crate::core::{GameId, GlobalParameter, ParameterChange, PlayerId, ResourceType};

use super::bus::EventBus;

/// Accessors used by passive handlers to filter events.
pub trait GameEvent: Send + Sync + 'static {
    /// Change category this event belongs to, if any trigger listens for it.
    fn kind(&self) -> Option<TriggerKind>;

    /// Game the event happened in.
    fn game_id(&self) -> &GameId;

    /// Player whose action caused the event.
    ///
    /// `self-player` outputs of a passive effect only fire for the owner's
    /// own actions. Events without an actor fire every output.
    fn actor(&self) -> Option<&PlayerId> {
        None
    }

    /// Card this event is about. A card never reacts to events about itself.
    fn card(&self) -> Option<&CardId> {
        None
    }

    /// Whether a passive effect owned by `owner` reacts to this event.
    fn fires_for(&self, owner: &PlayerId, condition: Option<&Condition>) -> bool;
}

/// Temperature went up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureRaised {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
}

/// Oxygen went up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OxygenRaised {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
}

/// An ocean tile was placed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OceanPlaced {
    pub game_id: GameId,
    pub old_value: i32,
    pub new_value: i32,
}

/// A card was played by some player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPlayed {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub card_type: CardType,
}

/// A player's hand gained or lost cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHandUpdated {
    pub game_id: GameId,
    pub player_id: PlayerId,
}

/// A player's set of passive effects changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEffectsChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
}

/// A tile was placed on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlaced {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub tile: TileKind,
}

/// A tile placement granted bonus resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBonusGained {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub resources: SmallVec<[(ResourceType, i32); 2]>,
}

/// A player's corporation was set or replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporationChanged {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub corporation: CardId,
}

impl TemperatureRaised {
    /// Build the event for a temperature change.
    pub fn from_change(game_id: GameId, change: &ParameterChange) -> Self {
        Self {
            game_id,
            old_value: change.old_value,
            new_value: change.new_value,
        }
    }
}

impl OxygenRaised {
    /// Build the event for an oxygen change.
    pub fn from_change(game_id: GameId, change: &ParameterChange) -> Self {
        Self {
            game_id,
            old_value: change.old_value,
            new_value: change.new_value,
        }
    }
}

impl OceanPlaced {
    /// Build the event for an ocean count change.
    pub fn from_change(game_id: GameId, change: &ParameterChange) -> Self {
        Self {
            game_id,
            old_value: change.old_value,
            new_value: change.new_value,
        }
    }
}

impl GameEvent for TemperatureRaised {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::TemperatureRaise)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn fires_for(&self, _owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        self.new_value > self.old_value
    }
}

impl GameEvent for OxygenRaised {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::OxygenRaise)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn fires_for(&self, _owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        self.new_value > self.old_value
    }
}

impl GameEvent for OceanPlaced {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::OceanPlaced)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn fires_for(&self, _owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        self.new_value > self.old_value
    }
}

impl GameEvent for CardPlayed {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::CardPlayed)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn card(&self) -> Option<&CardId> {
        Some(&self.card_id)
    }

    fn fires_for(&self, _owner: &PlayerId, condition: Option<&Condition>) -> bool {
        condition.is_none_or(|c| c.accepts_card_type(self.card_type))
    }
}

impl GameEvent for TilePlaced {
    fn kind(&self) -> Option<TriggerKind> {
        match self.tile {
            TileKind::City => Some(TriggerKind::CityPlaced),
            TileKind::Greenery => Some(TriggerKind::GreeneryPlaced),
            // Ocean triggers follow the ocean count, not the tile.
            TileKind::Ocean => None,
        }
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn fires_for(&self, _owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        true
    }
}

impl GameEvent for PlacementBonusGained {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::PlacementBonusGained)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn fires_for(&self, _owner: &PlayerId, condition: Option<&Condition>) -> bool {
        condition.is_some_and(|c| c.accepts_resources(self.resources.iter().map(|(r, _)| *r)))
    }
}

impl GameEvent for CardHandUpdated {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::CardHandUpdated)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn fires_for(&self, owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        &self.player_id == owner
    }
}

impl GameEvent for PlayerEffectsChanged {
    fn kind(&self) -> Option<TriggerKind> {
        Some(TriggerKind::PlayerEffectsChanged)
    }

    fn game_id(&self) -> &GameId {
        &self.game_id
    }

    fn fires_for(&self, owner: &PlayerId, _condition: Option<&Condition>) -> bool {
        &self.player_id == owner
    }
}

/// Event published when a global parameter moves.
///
/// Dispatches on the parameter so callers holding a [`ParameterChange`]
/// don't need to pick the struct themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterEvent {
    Temperature(TemperatureRaised),
    Oxygen(OxygenRaised),
    Ocean(OceanPlaced),
}

impl ParameterEvent {
    /// Event for a parameter change.
    pub fn new(game_id: GameId, change: &ParameterChange) -> Self {
        match change.parameter {
            GlobalParameter::Temperature => Self::Temperature(TemperatureRaised::from_change(game_id, change)),
            GlobalParameter::Oxygen => Self::Oxygen(OxygenRaised::from_change(game_id, change)),
            GlobalParameter::Oceans => Self::Ocean(OceanPlaced::from_change(game_id, change)),
        }
    }

    /// Publish the wrapped event as its concrete type.
    pub fn publish(self, bus: &EventBus) -> usize {
        match self {
            Self::Temperature(event) => bus.publish(event),
            Self::Oxygen(event) => bus.publish(event),
            Self::Ocean(event) => bus.publish(event),
        }
    }
}
