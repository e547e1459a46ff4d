//! In-memory player store.
//!
//! Two lock levels: an outer map of games (write-locked only to add or
//! remove a game) and one `RwLock` per game. Games never contend with each
//! other; inside a game, reads share and writes exclude.

use std::sync::Arc;

use im::OrdMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{EngineError, GameId, GlobalParameters, Player, PlayerId, Result};

use super::{ParametersUpdate, PlayerRepository, PlayerUpdate};

#[derive(Clone, Debug, Default)]
struct GameRecord {
    parameters: GlobalParameters,
    players: OrdMap<PlayerId, Player>,
}

/// Process-lifetime store backed by `im` persistent maps.
#[derive(Debug, Default)]
pub struct InMemoryPlayerRepository {
    games: RwLock<FxHashMap<GameId, Arc<RwLock<GameRecord>>>>,
}

impl InMemoryPlayerRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of games held.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.games.read().len()
    }

    fn game(&self, game: &GameId) -> Result<Arc<RwLock<GameRecord>>> {
        self.games
            .read()
            .get(game)
            .cloned()
            .ok_or_else(|| EngineError::GameNotFound(game.clone()))
    }
}

impl PlayerRepository for InMemoryPlayerRepository {
    fn create_game(&self, game: &GameId) -> Result<()> {
        let mut games = self.games.write();
        if !games.contains_key(game) {
            games.insert(game.clone(), Arc::new(RwLock::new(GameRecord::default())));
            tracing::debug!(game_id = %game, "game created");
        }
        Ok(())
    }

    fn has_game(&self, game: &GameId) -> bool {
        self.games.read().contains_key(game)
    }

    fn remove_game(&self, game: &GameId) -> bool {
        let removed = self.games.write().remove(game).is_some();
        if removed {
            tracing::debug!(game_id = %game, "game dropped");
        }
        removed
    }

    fn add_player(&self, game: &GameId, player: Player) -> Result<()> {
        let record = self.game(game)?;
        tracing::debug!(game_id = %game, player_id = %player.id, "player added");
        record.write().players.insert(player.id.clone(), player);
        Ok(())
    }

    fn get_player(&self, game: &GameId, player: &PlayerId) -> Result<Player> {
        let record = self.game(game)?;
        let snapshot = record.read().players.get(player).cloned();
        snapshot.ok_or_else(|| EngineError::PlayerNotFound {
            game: game.clone(),
            player: player.clone(),
        })
    }

    fn list_players(&self, game: &GameId) -> Result<Vec<Player>> {
        let record = self.game(game)?;
        let players = record.read().players.values().cloned().collect();
        Ok(players)
    }

    fn update_player(&self, game: &GameId, player: &PlayerId, update: &mut PlayerUpdate<'_>) -> Result<Player> {
        let record = self.game(game)?;
        let mut guard = record.write();

        let mut working = guard
            .players
            .get(player)
            .cloned()
            .ok_or_else(|| EngineError::PlayerNotFound {
                game: game.clone(),
                player: player.clone(),
            })?;

        update(&mut working)?;
        guard.players.insert(player.clone(), working.clone());
        Ok(working)
    }

    fn global_parameters(&self, game: &GameId) -> Result<GlobalParameters> {
        let record = self.game(game)?;
        let parameters = record.read().parameters;
        Ok(parameters)
    }

    fn update_global_parameters(&self, game: &GameId, update: &mut ParametersUpdate<'_>) -> Result<GlobalParameters> {
        let record = self.game(game)?;
        let mut guard = record.write();

        let mut working = guard.parameters;
        update(&mut working)?;
        guard.parameters = working;
        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::core::{GlobalParameter, ResourceType};

    fn store_with_player() -> (InMemoryPlayerRepository, GameId, PlayerId) {
        let store = InMemoryPlayerRepository::new();
        let game = GameId::new("g1");
        let player = PlayerId::new("p1");
        store.create_game(&game).unwrap();
        store.add_player(&game, Player::new(player.clone(), "Alice")).unwrap();
        (store, game, player)
    }

    #[test]
    fn test_unknown_game_and_player() {
        let (store, game, _) = store_with_player();

        let err = store.get_player(&GameId::new("nope"), &PlayerId::new("p1")).unwrap_err();
        assert_eq!(err, EngineError::GameNotFound(GameId::new("nope")));

        let err = store.get_player(&game, &PlayerId::new("ghost")).unwrap_err();
        assert!(matches!(err, EngineError::PlayerNotFound { .. }));
    }

    #[test]
    fn test_update_commits_on_ok() {
        let (store, game, player) = store_with_player();

        let committed = store
            .update_player(&game, &player, &mut |p| {
                p.resources.add(ResourceType::Credits, 5);
                p.hand.push_back(CardId::new("a"));
                Ok(())
            })
            .unwrap();

        assert_eq!(committed.resources.credits, 5);
        assert_eq!(store.get_player(&game, &player).unwrap(), committed);
    }

    #[test]
    fn test_update_discarded_on_err() {
        let (store, game, player) = store_with_player();

        let result = store.update_player(&game, &player, &mut |p| {
            p.resources.add(ResourceType::Credits, 5);
            Err(EngineError::StoreWrite("rejected".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.get_player(&game, &player).unwrap().resources.credits, 0);
    }

    #[test]
    fn test_create_game_is_idempotent() {
        let (store, game, player) = store_with_player();
        store.create_game(&game).unwrap();
        assert!(store.get_player(&game, &player).is_ok());
        assert_eq!(store.game_count(), 1);
    }

    #[test]
    fn test_global_parameters() {
        let (store, game, _) = store_with_player();

        let params = store
            .update_global_parameters(&game, &mut |params| {
                params.raise(GlobalParameter::Temperature, 2);
                Ok(())
            })
            .unwrap();

        assert_eq!(params.temperature, -26);
        assert_eq!(store.global_parameters(&game).unwrap(), params);
    }

    #[test]
    fn test_list_players_ordered() {
        let (store, game, _) = store_with_player();
        store.add_player(&game, Player::new(PlayerId::new("p0"), "Zed")).unwrap();

        let ids: Vec<_> = store
            .list_players(&game)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![PlayerId::new("p0"), PlayerId::new("p1")]);
    }

    #[test]
    fn test_remove_game() {
        let (store, game, _) = store_with_player();
        assert!(store.remove_game(&game));
        assert!(!store.has_game(&game));
        assert!(!store.remove_game(&game));
    }
}
