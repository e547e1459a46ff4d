//! Payment validation integration tests.

mod common;

use common::{catalogue, table, Table};
use rust_terraform::cards::{Card, CardId, CardRegistry, CardType, Requirement, StandardProject};
use rust_terraform::core::{EngineConfig, EngineError, GameId, GlobalParameter, Player, PlayerId, ResourceType, Resources};
use rust_terraform::engine::Engine;
use rust_terraform::payment::validate_standard_project_payment;
use rust_terraform::CardPayment;

fn discounted_table() -> Table {
    let t = table();
    t.subscribe(&t.alice, "space-station");
    t.give_card(&t.alice, "big-space");
    t
}

/// Test that underpaying a discounted card is rejected without side effects.
#[test]
fn test_underpayment_rejected() {
    let t = discounted_table();
    let big = CardId::new("big-space");

    let err = t.game.play_card(&t.alice, &big, &CardPayment::credits(32)).unwrap_err();
    assert_eq!(err, EngineError::InsufficientPayment { required: 33, provided: 32 });

    let alice = t.player(&t.alice);
    assert!(alice.has_in_hand(&big), "card stays in hand");
    assert_eq!(alice.resources.get(ResourceType::Credits), 50, "nothing deducted");
}

/// Test that exact payment of the effective cost is accepted.
#[test]
fn test_exact_payment_accepted() {
    let t = discounted_table();
    let big = CardId::new("big-space");

    let paid = t.game.play_card(&t.alice, &big, &CardPayment::credits(33)).unwrap();
    assert_eq!(paid, 33);

    let alice = t.player(&t.alice);
    assert!(!alice.has_in_hand(&big));
    assert!(alice.played_cards.contains(&big));
    assert_eq!(alice.resources.get(ResourceType::Credits), 17);
    assert!(alice.requirement_modifiers.is_empty(), "discount gone with the card");
}

/// Test that overpaying is accepted and the full payment is deducted.
#[test]
fn test_overpayment_accepted() {
    let t = discounted_table();
    let big = CardId::new("big-space");

    let paid = t.game.play_card(&t.alice, &big, &CardPayment::credits(34)).unwrap();
    assert_eq!(paid, 33, "effective cost is reported");
    assert_eq!(t.player(&t.alice).resources.get(ResourceType::Credits), 16);
}

/// Test that only cards in hand can be played.
#[test]
fn test_card_not_in_hand() {
    let t = table();
    let err = t
        .game
        .play_card(&t.alice, &CardId::new("rocket"), &CardPayment::credits(20))
        .unwrap_err();
    assert!(err.is_validation());
}

/// Test that a payment the player can't cover is rejected.
#[test]
fn test_payment_exceeds_stock() {
    let t = table();
    t.give_card(&t.alice, "factory");

    let err = t
        .game
        .play_card(&t.alice, &CardId::new("factory"), &CardPayment::credits(4).with_steel(4))
        .unwrap_err();
    assert!(
        matches!(err, EngineError::InsufficientResources { resource: ResourceType::Steel, .. }),
        "unexpected error: {err}"
    );
}

/// Test that steel pays for building cards.
#[test]
fn test_steel_payment() {
    let t = table();
    t.subscribe(&t.alice, "steel-grant");
    t.give_card(&t.alice, "factory");

    t.game
        .play_card(&t.alice, &CardId::new("factory"), &CardPayment::credits(8).with_steel(2))
        .unwrap();
    let alice = t.player(&t.alice);
    assert_eq!(alice.resources.get(ResourceType::Steel), 0);
    assert_eq!(alice.resources.get(ResourceType::Credits), 42);

    t.give_card(&t.alice, "heather");
    let err = t
        .game
        .play_card(&t.alice, &CardId::new("heather"), &CardPayment::credits(4).with_steel(1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPayment(_)), "heather is not a building card");
}

/// Test that lenience lets a card be played below its requirement.
#[test]
fn test_requirement_lenience() {
    common::init_tracing();

    let mut cards = CardRegistry::new();
    cards.register_all(catalogue()).unwrap();
    cards
        .register(
            Card::new(CardId::new("lichen"), "Lichen", CardType::Automated)
                .with_cost(7)
                .with_requirement(Requirement::min(GlobalParameter::Oxygen, 5)),
        )
        .unwrap();
    let engine = Engine::new(cards, EngineConfig::default());
    let game_id = GameId::new("lenience");
    let game = engine.create_game(&game_id).unwrap();
    let alice = PlayerId::new("alice");
    game.add_player(
        Player::new(alice.clone(), "Alice")
            .with_resources(Resources::new().with(ResourceType::Credits, 20))
            .with_hand_card(CardId::new("lichen")),
    )
    .unwrap();
    game.raise_oxygen(3).unwrap();

    let lichen = CardId::new("lichen");
    let err = game.play_card(&alice, &lichen, &CardPayment::credits(7)).unwrap_err();
    assert!(err.is_validation(), "oxygen 3 is below 5: {err}");

    let adaptation = engine.cards().get(&CardId::new("adaptation")).unwrap().as_ref().clone();
    engine
        .subscribe_card_effects(&game_id, &alice, &adaptation.id, &adaptation)
        .unwrap();
    game.play_card(&alice, &lichen, &CardPayment::credits(7)).unwrap();
}

/// Test standard project pricing with merged discounts.
#[test]
fn test_standard_project_discount() {
    let t = table();
    t.subscribe(&t.alice, "city-planner");
    t.subscribe(&t.alice, "urban-grant");

    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    let config = t.engine.config();
    assert_eq!(
        validate_standard_project_payment(StandardProject::City, 20, &modifiers, config).unwrap(),
        20
    );
    assert!(validate_standard_project_payment(StandardProject::City, 19, &modifiers, config).is_err());
    assert_eq!(
        validate_standard_project_payment(StandardProject::Greenery, 23, &modifiers, config).unwrap(),
        23,
        "other projects keep their base cost"
    );
}
