//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_terraform::cards::{
    Card, CardBehavior, CardId, CardRegistry, CardTag, CardType, Choice, Condition, Output, OutputKind,
    OutputTarget, Selector, StandardProject, TileKind, TriggerKind,
};
use rust_terraform::core::{EngineConfig, GameId, Player, PlayerId, ResourceType, Resources};
use rust_terraform::engine::{Engine, GameEngine};

/// Install a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Card catalogue used across the integration tests.
pub fn catalogue() -> Vec<Card> {
    vec![
        // Passive: space cards cost 2 less.
        Card::new(CardId::new("space-station"), "Space Station", CardType::Active)
            .with_cost(10)
            .with_tag(CardTag::Space)
            .with_behavior(
                CardBehavior::passive(Condition::new(TriggerKind::CardHandUpdated))
                    .with_output(Output::discount(-2).with_selector(Selector::tag(CardTag::Space))),
            ),
        Card::new(CardId::new("rocket"), "Rocket", CardType::Automated)
            .with_cost(20)
            .with_tag(CardTag::Space),
        Card::new(CardId::new("big-space"), "Big Space Project", CardType::Automated)
            .with_cost(35)
            .with_tag(CardTag::Space),
        Card::new(CardId::new("heather"), "Heather", CardType::Automated)
            .with_cost(6)
            .with_tag(CardTag::Plant),
        Card::new(CardId::new("comet"), "Comet", CardType::Event)
            .with_cost(21)
            .with_tag(CardTag::Space)
            .with_tag(CardTag::Event),
        Card::new(CardId::new("factory"), "Factory", CardType::Automated)
            .with_cost(12)
            .with_tag(CardTag::Building),
        // Immediate: gain 2 steel.
        Card::new(CardId::new("steel-grant"), "Steel Grant", CardType::Event)
            .with_cost(3)
            .with_behavior(CardBehavior::immediate().with_output(Output::resource(ResourceType::Steel, 2))),
        // Static project discounts.
        Card::new(CardId::new("city-planner"), "City Planner", CardType::Active).with_behavior(
            CardBehavior::immediate()
                .with_output(Output::discount(-3).with_selector(Selector::project(StandardProject::City))),
        ),
        Card::new(CardId::new("urban-grant"), "Urban Grant", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::PlayerEffectsChanged))
                .with_output(Output::discount(-2).with_selector(Selector::project(StandardProject::City))),
        ),
        // Static lenience, no selector.
        Card::new(CardId::new("adaptation"), "Adaptation", CardType::Active)
            .with_behavior(CardBehavior::immediate().with_output(Output::lenience(2))),
        // Passive: +2 plants whenever an ocean is placed.
        Card::new(CardId::new("algae"), "Algae", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::OceanPlaced))
                .with_output(Output::resource(ResourceType::Plants, 2)),
        ),
        // Passive: +1 heat whenever temperature rises.
        Card::new(CardId::new("heat-sink"), "Heat Sink", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::TemperatureRaise))
                .with_output(Output::resource(ResourceType::Heat, 1)),
        ),
        // Passive: +1 credit when *you* play an event.
        Card::new(CardId::new("media"), "Media Group", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::CardPlayed).with_card_type(CardType::Event))
                .with_output(Output::resource(ResourceType::Credits, 1).with_target(OutputTarget::SelfPlayer)),
        ),
        // Passive: +1 animal on this card when anyone plays a card.
        Card::new(CardId::new("pets"), "Pets", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::CardPlayed))
                .with_output(Output::card_storage(ResourceType::Animals, 1).with_target(OutputTarget::AnyPlayer)),
        ),
        // Manual: spend 1 energy for 1 steel.
        Card::new(CardId::new("forge"), "Forge", CardType::Active).with_behavior(
            CardBehavior::manual()
                .with_input(Output::resource(ResourceType::Energy, 1))
                .with_output(Output::resource(ResourceType::Steel, 1)),
        ),
        // Immediate with a choice: 3 plants or 4 heat, plus 1 credit.
        Card::new(CardId::new("harvest"), "Harvest", CardType::Automated).with_behavior(
            CardBehavior::immediate()
                .with_output(Output::resource(ResourceType::Credits, 1))
                .with_choice(Choice::of([Output::resource(ResourceType::Plants, 3)]))
                .with_choice(Choice::of([Output::resource(ResourceType::Heat, 4)])),
        ),
        // Immediate: costs more credits than a fresh player can keep after paying.
        Card::new(CardId::new("drain"), "Drain", CardType::Event)
            .with_cost(10)
            .with_behavior(CardBehavior::immediate().with_output(Output::resource(ResourceType::Credits, -45))),
        // Immediate tile grants.
        Card::new(CardId::new("new-town"), "New Town", CardType::Automated)
            .with_behavior(CardBehavior::immediate().with_output(Output::tile(TileKind::City, 1))),
        Card::new(CardId::new("forest"), "Forest", CardType::Automated)
            .with_behavior(CardBehavior::immediate().with_output(Output::tile(TileKind::Greenery, 1))),
        Card::new(CardId::new("lake"), "Lake", CardType::Automated)
            .with_behavior(CardBehavior::immediate().with_output(Output::tile(TileKind::Ocean, 1))),
        // Passive: +2 credits when *you* place a city.
        Card::new(CardId::new("urbanist"), "Urbanist", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::CityPlaced))
                .with_output(Output::resource(ResourceType::Credits, 2)),
        ),
        // Passive: +1 plant when anyone places a greenery.
        Card::new(CardId::new("botanist"), "Botanist", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::GreeneryPlaced))
                .with_output(Output::resource(ResourceType::Plants, 1).with_target(OutputTarget::AnyPlayer)),
        ),
        // Passive: +1 titanium when you gain steel from a placement bonus.
        Card::new(CardId::new("prospector"), "Prospector", CardType::Active).with_behavior(
            CardBehavior::passive(Condition::new(TriggerKind::PlacementBonusGained).with_resource(ResourceType::Steel))
                .with_output(Output::resource(ResourceType::Titanium, 1)),
        ),
        // Immediate: raise temperature one step.
        Card::new(CardId::new("asteroid"), "Asteroid", CardType::Event)
            .with_cost(14)
            .with_tag(CardTag::Space)
            .with_tag(CardTag::Event)
            .with_behavior(CardBehavior::immediate().with_output(Output::new(OutputKind::Temperature, 1))),
    ]
}

pub fn registry() -> CardRegistry {
    let mut registry = CardRegistry::new();
    registry.register_all(catalogue()).expect("catalogue is valid");
    registry
}

/// A game with two players, Alice and Bob, each with 50 credits.
pub struct Table {
    pub engine: Engine,
    pub game: Arc<GameEngine>,
    pub game_id: GameId,
    pub alice: PlayerId,
    pub bob: PlayerId,
}

impl Table {
    pub fn card(&self, id: &str) -> Card {
        self.engine
            .cards()
            .get(&CardId::new(id))
            .map(|card| card.as_ref().clone())
            .expect("card in catalogue")
    }

    /// Subscribe a catalogue card's effects for a player.
    pub fn subscribe(&self, player: &PlayerId, id: &str) {
        let card = self.card(id);
        self.engine
            .subscribe_card_effects(&self.game_id, player, &card.id, &card)
            .expect("subscribe succeeds");
    }

    pub fn give_card(&self, player: &PlayerId, id: &str) {
        self.game
            .add_card_to_hand(player, &CardId::new(id))
            .expect("hand write succeeds");
    }

    pub fn take_card(&self, player: &PlayerId, id: &str) {
        self.game
            .remove_card_from_hand(player, &CardId::new(id))
            .expect("hand write succeeds");
    }

    pub fn player(&self, player: &PlayerId) -> Player {
        self.game.player(player).expect("player exists")
    }
}

pub fn table() -> Table {
    init_tracing();

    let engine = Engine::new(registry(), EngineConfig::default());
    let game_id = GameId::new("g1");
    let game = engine.create_game(&game_id).expect("game created");

    let alice = PlayerId::new("alice");
    let bob = PlayerId::new("bob");
    for (id, name) in [(&alice, "Alice"), (&bob, "Bob")] {
        game.add_player(
            Player::new(id.clone(), name).with_resources(Resources::new().with(ResourceType::Credits, 50)),
        )
        .expect("player added");
    }

    Table {
        engine,
        game,
        game_id,
        alice,
        bob,
    }
}
