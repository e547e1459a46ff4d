//! Core engine types: identifiers, players, resources, game state,
//! configuration and errors.

pub mod config;
pub mod error;
pub mod player;
pub mod resources;
pub mod state;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use player::{PendingChoice, Player, PlayerAction, PlayerEffect, PlayerId};
pub use resources::{ResourceType, Resources};
pub use state::{GameId, GlobalParameter, GlobalParameters, ParameterChange};
