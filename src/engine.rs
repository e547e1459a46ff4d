//! Engine façade.
//!
//! `Engine` owns the games of one server process. Each game is a
//! [`GameEngine`]: a session plus its card effect subscriber. Hand,
//! corporation and global-parameter writes live here too; they stand in for
//! the repositories that publish game-state changes onto the bus.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::cards::{Card, CardId, CardRegistry, TileKind};
use crate::core::{
    EngineConfig, EngineError, GameId, GlobalParameter, ParameterChange, Player, PlayerId, ResourceType, Result,
};
use crate::effects::{CardEffectSubscriber, RequirementModifier};
use crate::events::{CardHandUpdated, CardPlayed, CorporationChanged, PlacementBonusGained, TilePlaced};
use crate::payment::{check_requirements, validate_card_payment, CardPayment};
use crate::session::GameSession;
use crate::store::{InMemoryPlayerRepository, PlayerRepository};

/// One game: session, bus and card effects.
#[derive(Debug)]
pub struct GameEngine {
    session: Arc<GameSession>,
    effects: CardEffectSubscriber,
}

impl GameEngine {
    /// Wrap a session.
    pub fn new(session: GameSession) -> Self {
        let session = Arc::new(session);
        Self {
            effects: CardEffectSubscriber::new(Arc::clone(&session)),
            session,
        }
    }

    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    pub fn game_id(&self) -> &GameId {
        self.session.game_id()
    }

    pub fn effects(&self) -> &CardEffectSubscriber {
        &self.effects
    }

    /// Add a player to this game.
    pub fn add_player(&self, player: Player) -> Result<()> {
        self.session.players().add_player(self.game_id(), player)
    }

    /// Snapshot of a player.
    pub fn player(&self, player: &PlayerId) -> Result<Player> {
        self.session.player(player)
    }

    /// See [`CardEffectSubscriber::subscribe_card_effects`].
    pub fn subscribe_card_effects(&self, player: &PlayerId, card_id: &CardId, card: &Card) -> Result<()> {
        self.effects.subscribe_card_effects(player, card_id, card)
    }

    /// See [`CardEffectSubscriber::unsubscribe_card_effects`].
    pub fn unsubscribe_card_effects(&self, card_id: &CardId) -> Result<()> {
        self.effects.unsubscribe_card_effects(card_id)
    }

    /// See [`CardEffectSubscriber::execute_card_action`].
    pub fn execute_card_action(
        &self,
        player: &PlayerId,
        card_id: &CardId,
        behavior_index: usize,
        choice: Option<usize>,
    ) -> Result<()> {
        self.effects.execute_card_action(player, card_id, behavior_index, choice)
    }

    /// See [`CardEffectSubscriber::resolve_choice`].
    pub fn resolve_choice(&self, player: &PlayerId, card_id: &CardId, behavior_index: usize, choice: usize) -> Result<()> {
        self.effects.resolve_choice(player, card_id, behavior_index, choice)
    }

    /// Current modifier set of a player.
    pub fn get_requirement_modifiers(&self, player: &PlayerId) -> Result<Vec<RequirementModifier>> {
        self.effects.get_requirement_modifiers(player)
    }

    /// Put a card into a player's hand.
    ///
    /// Modifiers are recomputed in the same write, then `CardHandUpdated`
    /// is published.
    pub fn add_card_to_hand(&self, player: &PlayerId, card_id: &CardId) -> Result<()> {
        self.session.update_player(player, true, &mut |working| {
            working.hand.push_back(card_id.clone());
            Ok(())
        })?;
        tracing::debug!(player_id = %player, card_id = %card_id, "card added to hand");
        self.publish_hand_updated(player);
        Ok(())
    }

    /// Take a card out of a player's hand. Returns whether it was there.
    pub fn remove_card_from_hand(&self, player: &PlayerId, card_id: &CardId) -> Result<bool> {
        let mut removed = false;
        self.session.update_player(player, true, &mut |working| {
            removed = working.remove_from_hand(card_id);
            Ok(())
        })?;
        if removed {
            tracing::debug!(player_id = %player, card_id = %card_id, "card removed from hand");
            self.publish_hand_updated(player);
        }
        Ok(removed)
    }

    /// Set a player's corporation card.
    ///
    /// The corporation joins the modifier candidates. Its own effects are
    /// subscribed separately through [`Self::subscribe_card_effects`].
    pub fn set_corporation(&self, player: &PlayerId, corporation: &CardId) -> Result<()> {
        self.session.cards().lookup(corporation)?;
        self.session.update_player(player, true, &mut |working| {
            working.corporation = Some(corporation.clone());
            Ok(())
        })?;

        tracing::info!(player_id = %player, card_id = %corporation, "corporation set");
        self.session.bus().publish(CorporationChanged {
            game_id: self.game_id().clone(),
            player_id: player.clone(),
            corporation: corporation.clone(),
        });
        Ok(())
    }

    /// Play a card from hand.
    ///
    /// All-or-nothing: requirements (with lenience), payment (with
    /// discounts), the hand move and every behavior of the card are checked
    /// and applied in one store write. Nothing is paid if any behavior
    /// fails. Then `CardHandUpdated` and `CardPlayed` are published; the
    /// card's own passive effects ignore its `CardPlayed`.
    ///
    /// Returns the effective cost paid.
    pub fn play_card(&self, player: &PlayerId, card_id: &CardId, payment: &CardPayment) -> Result<i32> {
        let card = Arc::clone(self.session.cards().lookup(card_id)?);
        let parameters = self.session.players().global_parameters(self.game_id())?;
        let config = self.session.config();

        let mut paid = 0;
        let subscribed = self.effects.subscribe_with(player, card_id, &card, true, &mut |working| {
            if !working.has_in_hand(card_id) {
                return Err(EngineError::validation(card_id, "card is not in hand"));
            }
            check_requirements(&card, &parameters, &working.requirement_modifiers)?;
            paid = validate_card_payment(&card, payment, &working.requirement_modifiers, config)?;
            payment.check_available(&working.resources)?;

            payment.deduct_from(&mut working.resources);
            working.remove_from_hand(card_id);
            working.played_cards.push_back(card_id.clone());
            Ok(())
        })?;

        tracing::info!(
            game_id = %self.game_id(),
            player_id = %player,
            card_id = %card_id,
            cost = paid,
            "card played"
        );
        self.publish_hand_updated(player);
        self.session.bus().publish(CardPlayed {
            game_id: self.game_id().clone(),
            player_id: player.clone(),
            card_id: card_id.clone(),
            card_type: card.card_type,
        });
        self.effects.finish_subscription(player, card_id, subscribed);
        Ok(paid)
    }

    /// Place the player's next queued tile.
    ///
    /// Publishes `TilePlaced`; an ocean tile also raises the ocean count.
    /// Returns `None` when no tile is queued.
    pub fn place_tile(&self, player: &PlayerId) -> Result<Option<TileKind>> {
        let mut placed = None;
        self.session.update_player(player, false, &mut |working| {
            placed = working.next_tile();
            Ok(())
        })?;
        let Some(tile) = placed else {
            return Ok(None);
        };

        tracing::info!(game_id = %self.game_id(), player_id = %player, ?tile, "tile placed");
        self.session.bus().publish(TilePlaced {
            game_id: self.game_id().clone(),
            player_id: player.clone(),
            tile,
        });
        if tile == TileKind::Ocean {
            self.place_ocean()?;
        }
        Ok(Some(tile))
    }

    /// Grant the resources printed on a board space to the player who
    /// placed a tile there, then publish `PlacementBonusGained`.
    pub fn grant_placement_bonus(&self, player: &PlayerId, bonus: &[(ResourceType, i32)]) -> Result<()> {
        if bonus.is_empty() {
            return Ok(());
        }
        self.session.update_player(player, false, &mut |working| {
            for &(resource, amount) in bonus {
                if !resource.is_basic() || amount < 0 {
                    return Err(EngineError::InvalidBonus(format!("{amount} {resource}")));
                }
                if working.resources.get(resource).checked_add(amount).is_none() {
                    return Err(EngineError::InvalidBonus(format!("{resource} amount out of range")));
                }
                working.resources.add(resource, amount);
            }
            Ok(())
        })?;

        self.session.bus().publish(PlacementBonusGained {
            game_id: self.game_id().clone(),
            player_id: player.clone(),
            resources: bonus.iter().copied().collect(),
        });
        Ok(())
    }

    /// Raise temperature by `steps`.
    pub fn raise_temperature(&self, steps: i32) -> Result<Option<ParameterChange>> {
        self.session.raise_parameter(GlobalParameter::Temperature, steps)
    }

    /// Raise oxygen by `steps`.
    pub fn raise_oxygen(&self, steps: i32) -> Result<Option<ParameterChange>> {
        self.session.raise_parameter(GlobalParameter::Oxygen, steps)
    }

    /// Place one ocean.
    pub fn place_ocean(&self) -> Result<Option<ParameterChange>> {
        self.session.raise_parameter(GlobalParameter::Oceans, 1)
    }

    fn publish_hand_updated(&self, player: &PlayerId) {
        self.session.bus().publish(CardHandUpdated {
            game_id: self.game_id().clone(),
            player_id: player.clone(),
        });
    }
}

/// Multi-game entry point.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{
///     Card, CardBehavior, CardId, CardRegistry, CardTag, CardType, Condition, Output, Selector,
///     TriggerKind,
/// };
/// use rust_terraform::core::{EngineConfig, GameId, Player, PlayerId};
/// use rust_terraform::Engine;
///
/// let mut cards = CardRegistry::new();
/// let discount = Card::new(CardId::new("shuttles"), "Shuttles", CardType::Active).with_behavior(
///     CardBehavior::passive(Condition::new(TriggerKind::CardHandUpdated))
///         .with_output(Output::discount(-2).with_selector(Selector::tag(CardTag::Space))),
/// );
/// let rocket = Card::new(CardId::new("rocket"), "Rocket", CardType::Automated)
///     .with_cost(20)
///     .with_tag(CardTag::Space);
/// cards.register_all([discount.clone(), rocket]).unwrap();
///
/// let engine = Engine::new(cards, EngineConfig::default());
/// let game = GameId::new("g1");
/// let alice = PlayerId::new("alice");
/// let table = engine.create_game(&game).unwrap();
/// table.add_player(Player::new(alice.clone(), "Alice")).unwrap();
///
/// engine.subscribe_card_effects(&game, &alice, &discount.id, &discount).unwrap();
/// table.add_card_to_hand(&alice, &CardId::new("rocket")).unwrap();
///
/// let modifiers = engine.get_requirement_modifiers(&game, &alice).unwrap();
/// assert_eq!(modifiers.len(), 1);
/// assert_eq!(modifiers[0].amount, -2);
/// ```
pub struct Engine {
    players: Arc<dyn PlayerRepository>,
    cards: Arc<CardRegistry>,
    config: Arc<EngineConfig>,
    games: RwLock<FxHashMap<GameId, Arc<GameEngine>>>,
}

impl Engine {
    /// Engine backed by an in-memory store.
    pub fn new(cards: CardRegistry, config: EngineConfig) -> Self {
        Self::with_repository(Arc::new(InMemoryPlayerRepository::new()), Arc::new(cards), config)
    }

    /// Engine backed by a caller-supplied store.
    pub fn with_repository(players: Arc<dyn PlayerRepository>, cards: Arc<CardRegistry>, config: EngineConfig) -> Self {
        Self {
            players,
            cards,
            config: Arc::new(config),
            games: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn cards(&self) -> &Arc<CardRegistry> {
        &self.cards
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a game, or return it if it already exists.
    pub fn create_game(&self, game_id: &GameId) -> Result<Arc<GameEngine>> {
        let mut games = self.games.write();
        if let Some(existing) = games.get(game_id) {
            return Ok(Arc::clone(existing));
        }

        self.players.create_game(game_id)?;
        let session = GameSession::new(
            game_id.clone(),
            Arc::clone(&self.players),
            Arc::clone(&self.cards),
            Arc::clone(&self.config),
        );
        let game = Arc::new(GameEngine::new(session));
        games.insert(game_id.clone(), Arc::clone(&game));

        tracing::info!(game_id = %game_id, "game created");
        Ok(game)
    }

    /// Look up a game.
    pub fn game(&self, game_id: &GameId) -> Result<Arc<GameEngine>> {
        self.games
            .read()
            .get(game_id)
            .cloned()
            .ok_or_else(|| EngineError::GameNotFound(game_id.clone()))
    }

    /// Drop a game. Its bus, every passive subscription and its stored
    /// players and global parameters go with it.
    pub fn remove_game(&self, game_id: &GameId) -> bool {
        let removed = self.games.write().remove(game_id);
        if let Some(game) = &removed {
            game.session().bus().clear();
        }
        let stored = self.players.remove_game(game_id);
        if removed.is_some() || stored {
            tracing::info!(game_id = %game_id, "game removed");
        }
        removed.is_some() || stored
    }

    /// Number of live games.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.games.read().len()
    }

    /// Subscribe a card's effects for a player of a game.
    pub fn subscribe_card_effects(&self, game_id: &GameId, player: &PlayerId, card_id: &CardId, card: &Card) -> Result<()> {
        self.game(game_id)?.subscribe_card_effects(player, card_id, card)
    }

    /// Remove a card's effects from a game.
    pub fn unsubscribe_card_effects(&self, game_id: &GameId, card_id: &CardId) -> Result<()> {
        self.game(game_id)?.unsubscribe_card_effects(card_id)
    }

    /// Read path for payment validation.
    pub fn get_requirement_modifiers(&self, game_id: &GameId, player: &PlayerId) -> Result<Vec<RequirementModifier>> {
        self.game(game_id)?.get_requirement_modifiers(player)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("games", &self.game_count())
            .field("cards", &self.cards.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    fn engine() -> Engine {
        let mut cards = CardRegistry::new();
        cards
            .register(Card::new(CardId::new("corp"), "Corp", CardType::Corporation))
            .unwrap();
        Engine::new(cards, EngineConfig::default())
    }

    #[test]
    fn test_create_game_is_idempotent() {
        let engine = engine();
        let game = GameId::new("g1");
        let first = engine.create_game(&game).unwrap();
        let second = engine.create_game(&game).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.game_count(), 1);
    }

    #[test]
    fn test_unknown_game() {
        let engine = engine();
        let err = engine
            .get_requirement_modifiers(&GameId::new("nope"), &PlayerId::new("p1"))
            .unwrap_err();
        assert_eq!(err, EngineError::GameNotFound(GameId::new("nope")));
    }

    #[test]
    fn test_set_corporation() {
        let engine = engine();
        let game = engine.create_game(&GameId::new("g1")).unwrap();
        let player = PlayerId::new("p1");
        game.add_player(Player::new(player.clone(), "Alice")).unwrap();

        game.set_corporation(&player, &CardId::new("corp")).unwrap();
        assert_eq!(game.player(&player).unwrap().corporation, Some(CardId::new("corp")));

        let err = game.set_corporation(&player, &CardId::new("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_card_not_in_hand() {
        let engine = engine();
        let game = engine.create_game(&GameId::new("g1")).unwrap();
        let player = PlayerId::new("p1");
        game.add_player(Player::new(player.clone(), "Alice")).unwrap();

        assert!(!game.remove_card_from_hand(&player, &CardId::new("x")).unwrap());
    }

    #[test]
    fn test_remove_game_clears_bus() {
        let engine = engine();
        let game_id = GameId::new("g1");
        let game = engine.create_game(&game_id).unwrap();
        game.session().bus().subscribe(|_: &CardHandUpdated| Ok(()));

        assert!(engine.remove_game(&game_id));
        assert!(game.session().bus().is_empty());
        assert!(engine.game(&game_id).is_err());
    }

    #[test]
    fn test_recreated_game_starts_fresh() {
        let engine = engine();
        let game_id = GameId::new("g1");
        let player = PlayerId::new("p1");
        let game = engine.create_game(&game_id).unwrap();
        game.add_player(Player::new(player.clone(), "Alice")).unwrap();
        game.raise_temperature(3).unwrap();

        assert!(engine.remove_game(&game_id));
        assert!(!engine.remove_game(&game_id), "second removal finds nothing");

        let game = engine.create_game(&game_id).unwrap();
        assert!(game.player(&player).unwrap_err().is_not_found(), "old players are gone");
        let parameters = game.session().players().global_parameters(&game_id).unwrap();
        assert_eq!(parameters, crate::core::GlobalParameters::default());
    }
}
