//! Event distribution.
//!
//! - `EventBus`: type-indexed publish / subscribe / unsubscribe
//! - Event structs, one per game-state change category
//!
//! Producers (hand, corporation, tile and global-parameter writes) publish after
//! their store write has committed. Consumers are the passive card effects
//! registered by `effects::CardEffectSubscriber`.

mod bus;
mod types;

pub use bus::{Event, EventBus, SubscriptionId};
pub use types::{
    CardHandUpdated, CardPlayed, CorporationChanged, GameEvent, OceanPlaced, OxygenRaised,
    ParameterEvent, PlacementBonusGained, PlayerEffectsChanged, TemperatureRaised, TilePlaced,
};
