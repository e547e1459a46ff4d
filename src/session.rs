//! Per-game context.
//!
//! A `GameSession` bundles everything an engine call needs for one game:
//! its event bus, the player store, the card registry and the engine
//! configuration. It is passed explicitly to every handler; nothing in the
//! crate reaches for a process-wide singleton, so games stay isolated.
//!
//! ## Ordering
//!
//! Store writes and event publication never overlap. Every helper here
//! finishes its write (releasing the game lock) before it publishes, so a
//! handler reacting to the event can read and write the same player again.

use std::sync::Arc;

use crate::cards::CardRegistry;
use crate::core::{EngineConfig, GameId, GlobalParameter, ParameterChange, Player, PlayerId, Result};
use crate::effects::{modifiers, AppliedOutputs, RequirementModifier};
use crate::events::{EventBus, ParameterEvent, PlayerEffectsChanged};
use crate::store::{PlayerRepository, PlayerUpdate};

/// Context shared by the engine and every passive effect of one game.
pub struct GameSession {
    game_id: GameId,
    bus: EventBus,
    players: Arc<dyn PlayerRepository>,
    cards: Arc<CardRegistry>,
    config: Arc<EngineConfig>,
}

impl GameSession {
    /// Create a session with a fresh event bus.
    pub fn new(
        game_id: GameId,
        players: Arc<dyn PlayerRepository>,
        cards: Arc<CardRegistry>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            game_id,
            bus: EventBus::new(),
            players,
            cards,
            config,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn players(&self) -> &Arc<dyn PlayerRepository> {
        &self.players
    }

    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of a player.
    pub fn player(&self, player: &PlayerId) -> Result<Player> {
        self.players.get_player(&self.game_id, player)
    }

    /// Atomically modify a player, optionally recomputing modifiers in the
    /// same write.
    pub fn update_player(&self, player: &PlayerId, recompute: bool, update: &mut PlayerUpdate<'_>) -> Result<Player> {
        let cards = &self.cards;
        self.players.update_player(&self.game_id, player, &mut |working| {
            update(working)?;
            if recompute && modifiers::refresh(working, cards) {
                tracing::info!(
                    player_id = %working.id,
                    modifiers = working.requirement_modifiers.len(),
                    "requirement modifiers updated"
                );
            }
            Ok(())
        })
    }

    /// Recompute a player's modifiers and return the new set.
    pub fn recompute_modifiers(&self, player: &PlayerId) -> Result<Vec<RequirementModifier>> {
        let committed = self.update_player(player, true, &mut |_| Ok(()))?;
        Ok(committed.requirement_modifiers.iter().cloned().collect())
    }

    /// Current requirement modifiers of a player.
    pub fn requirement_modifiers(&self, player: &PlayerId) -> Result<Vec<RequirementModifier>> {
        Ok(self.player(player)?.requirement_modifiers.iter().cloned().collect())
    }

    /// Raise a global parameter and publish the matching event.
    ///
    /// Returns `None` (and publishes nothing) when the parameter is already
    /// at its maximum.
    pub fn raise_parameter(&self, parameter: GlobalParameter, steps: i32) -> Result<Option<ParameterChange>> {
        let mut change = None;
        self.players.update_global_parameters(&self.game_id, &mut |params| {
            change = params.raise(parameter, steps);
            Ok(())
        })?;

        if let Some(change) = &change {
            tracing::info!(
                game_id = %self.game_id,
                parameter = ?change.parameter,
                old_value = change.old_value,
                new_value = change.new_value,
                "global parameter raised"
            );
            ParameterEvent::new(self.game_id.clone(), change).publish(&self.bus);
        }
        Ok(change)
    }

    /// Carry out the game-wide part of applied outputs.
    pub fn apply_follow_ups(&self, applied: &AppliedOutputs) -> Result<()> {
        for (parameter, steps) in &applied.parameter_raises {
            self.raise_parameter(*parameter, *steps)?;
        }
        Ok(())
    }

    /// Tell listeners a player's effect list changed.
    pub fn publish_effects_changed(&self, player: &PlayerId) {
        self.bus.publish(PlayerEffectsChanged {
            game_id: self.game_id.clone(),
            player_id: player.clone(),
        });
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("game_id", &self.game_id)
            .field("bus", &self.bus)
            .field("cards", &self.cards.len())
            .finish()
    }
}
