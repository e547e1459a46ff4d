//! Player aggregate store.
//!
//! The engine never owns persistence. It reads and writes players through
//! [`PlayerRepository`], which any backend can implement. The crate ships
//! [`InMemoryPlayerRepository`].
//!
//! ## Write discipline
//!
//! `update_player` is the only way to change a player. The closure runs
//! under the game's exclusive lock against a working copy; the copy is
//! committed only if the closure returns `Ok`. Callers put every change that
//! must be observed together (hand change *and* modifier recompute) inside
//! one closure, so no reader sees one without the other.
//!
//! Implementations must not publish events or call back into the engine
//! while holding their lock.

mod memory;

pub use memory::InMemoryPlayerRepository;

use crate::core::{GameId, GlobalParameters, Player, PlayerId, Result};

/// Closure type for atomic player writes.
pub type PlayerUpdate<'a> = dyn FnMut(&mut Player) -> Result<()> + 'a;

/// Closure type for atomic global parameter writes.
pub type ParametersUpdate<'a> = dyn FnMut(&mut GlobalParameters) -> Result<()> + 'a;

/// Storage contract for players and per-game global parameters.
pub trait PlayerRepository: Send + Sync {
    /// Create an empty game. Creating an existing game is a no-op.
    fn create_game(&self, game: &GameId) -> Result<()>;

    /// Whether the game exists.
    fn has_game(&self, game: &GameId) -> bool;

    /// Drop a game with its players and global parameters. Returns whether
    /// it existed.
    fn remove_game(&self, game: &GameId) -> bool;

    /// Add a player to a game, replacing any player with the same ID.
    fn add_player(&self, game: &GameId, player: Player) -> Result<()>;

    /// Snapshot of one player.
    fn get_player(&self, game: &GameId, player: &PlayerId) -> Result<Player>;

    /// Snapshot of every player in a game, ordered by ID.
    fn list_players(&self, game: &GameId) -> Result<Vec<Player>>;

    /// Atomically modify a player. Returns the committed state.
    fn update_player(&self, game: &GameId, player: &PlayerId, update: &mut PlayerUpdate<'_>) -> Result<Player>;

    /// Current global parameters of a game.
    fn global_parameters(&self, game: &GameId) -> Result<GlobalParameters>;

    /// Atomically modify global parameters. Returns the committed state.
    fn update_global_parameters(&self, game: &GameId, update: &mut ParametersUpdate<'_>) -> Result<GlobalParameters>;
}
