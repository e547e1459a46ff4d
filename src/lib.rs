//! # rust-terraform
//!
//! Card effect and requirement modifier engine for an authoritative
//! board game server.
//!
//! Card rules are declarative behaviors (trigger → condition → outputs).
//! The engine turns them into live state: one-shot effects are applied
//! when a card is played, standing effects listen on a per-game event bus,
//! and the cost / requirement adjustments they imply are recomputed into a
//! merged modifier set whenever a player's hand or effects change.
//!
//! ## Design Principles
//!
//! 1. **Data, not logic**: cards never carry code. Output kinds form a
//!    closed enum matched exhaustively.
//!
//! 2. **Full recompute**: modifiers are rebuilt from scratch on every
//!    change and swapped in atomically with the change that caused them.
//!
//! 3. **Explicit context**: the store and the bus are reached through a
//!    `GameSession`, never through globals, so games are isolated.
//!
//! ## Modules
//!
//! - `core`: IDs, players, resources, global parameters, config, errors
//! - `cards`: Card definitions, behaviors, selectors and registry
//! - `events`: Type-indexed event bus and game-state change events
//! - `store`: Player repository contract and in-memory implementation
//! - `effects`: Classifier, subscriber, output applier, modifier calculator
//! - `payment`: Effective cost and payment validation
//! - `session` / `engine`: Per-game context and multi-game façade

pub mod cards;
pub mod core;
pub mod effects;
pub mod engine;
pub mod events;
pub mod payment;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EngineError, GameId, GlobalParameter, GlobalParameters, Player, PlayerEffect, PlayerId,
    ResourceType, Resources, Result,
};

pub use crate::cards::{
    Card, CardBehavior, CardId, CardRegistry, CardTag, CardType, Condition, Output, OutputKind, Selector,
    StandardProject, TriggerKind,
};

pub use crate::events::{EventBus, SubscriptionId};

pub use crate::effects::{CardEffectSubscriber, ModifierTarget, RequirementModifier};

pub use crate::engine::{Engine, GameEngine};
pub use crate::payment::CardPayment;
pub use crate::session::GameSession;
pub use crate::store::{InMemoryPlayerRepository, PlayerRepository};
