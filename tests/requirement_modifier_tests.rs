//! Requirement modifier integration tests.

mod common;

use common::{registry, table};
use proptest::prelude::*;
use rust_terraform::cards::{CardId, StandardProject};
use rust_terraform::core::{Player, PlayerEffect, PlayerId, ResourceType};
use rust_terraform::effects::{calculate, ModifierTarget, RequirementModifier};

/// Test that a tag discount targets each matching card in hand.
#[test]
fn test_tag_discount_targets_hand_cards() {
    let t = table();
    t.subscribe(&t.alice, "space-station");
    t.give_card(&t.alice, "rocket");
    t.give_card(&t.alice, "heather");
    t.give_card(&t.alice, "comet");

    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    assert_eq!(
        modifiers,
        vec![
            RequirementModifier {
                amount: -2,
                affected_resources: vec![ResourceType::Credits],
                target: ModifierTarget::Card(CardId::new("comet")),
            },
            RequirementModifier {
                amount: -2,
                affected_resources: vec![ResourceType::Credits],
                target: ModifierTarget::Card(CardId::new("rocket")),
            },
        ],
        "heather has no space tag"
    );

    let bob = t.engine.get_requirement_modifiers(&t.game_id, &t.bob).unwrap();
    assert!(bob.is_empty(), "modifiers are per player");
}

/// Test that two project discounts merge into one modifier.
#[test]
fn test_project_discounts_merge() {
    let t = table();
    t.subscribe(&t.alice, "city-planner");
    t.subscribe(&t.alice, "urban-grant");

    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    assert_eq!(modifiers.len(), 1, "same target and resources collapse");
    assert_eq!(modifiers[0].amount, -5);
    assert_eq!(modifiers[0].target, ModifierTarget::StandardProject(StandardProject::City));
}

/// Test that hand changes recompute modifiers.
#[test]
fn test_hand_change_recomputes() {
    let t = table();
    t.subscribe(&t.alice, "space-station");
    assert!(t.player(&t.alice).requirement_modifiers.is_empty(), "empty hand, nothing to discount");

    t.give_card(&t.alice, "rocket");
    assert_eq!(t.player(&t.alice).requirement_modifiers.len(), 1);

    t.take_card(&t.alice, "rocket");
    assert!(t.player(&t.alice).requirement_modifiers.is_empty(), "modifier follows the card out");
}

/// Test that a selector-less lenience becomes a global modifier.
#[test]
fn test_lenience_is_global() {
    let t = table();
    t.subscribe(&t.alice, "adaptation");

    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    assert_eq!(
        modifiers,
        vec![RequirementModifier {
            amount: 2,
            affected_resources: vec![ResourceType::GlobalParameter],
            target: ModifierTarget::Global,
        }]
    );
}

/// Test that the corporation is a discount candidate.
#[test]
fn test_corporation_is_candidate() {
    use rust_terraform::cards::{Card, CardTag, CardType};
    use rust_terraform::core::{EngineConfig, GameId};
    use rust_terraform::engine::Engine;

    let mut cards = registry();
    cards
        .register(Card::new(CardId::new("orbital"), "Orbital Corp", CardType::Corporation).with_tag(CardTag::Space))
        .unwrap();
    let engine = Engine::new(cards, EngineConfig::default());
    let game_id = GameId::new("corp");
    let game = engine.create_game(&game_id).unwrap();
    let alice = PlayerId::new("alice");
    game.add_player(Player::new(alice.clone(), "Alice")).unwrap();

    let station = engine.cards().get(&CardId::new("space-station")).unwrap().as_ref().clone();
    engine.subscribe_card_effects(&game_id, &alice, &station.id, &station).unwrap();
    game.set_corporation(&alice, &CardId::new("orbital")).unwrap();

    let modifiers = engine.get_requirement_modifiers(&game_id, &alice).unwrap();
    assert_eq!(modifiers.len(), 1);
    assert_eq!(modifiers[0].target, ModifierTarget::Card(CardId::new("orbital")));
}

/// Test that a hand card missing from the registry is skipped.
#[test]
fn test_unknown_hand_card_skipped() {
    let cards = registry();
    let station = cards.get(&CardId::new("space-station")).unwrap();
    let mut player = Player::new(PlayerId::new("p"), "P")
        .with_hand_card(CardId::new("ghost"))
        .with_hand_card(CardId::new("rocket"));
    player.effects.push_back(PlayerEffect {
        card_id: station.id.clone(),
        card_name: station.name.clone(),
        behavior_index: 0,
        behavior: station.behaviors[0].clone(),
    });

    let modifiers = calculate(&player, &cards);
    assert_eq!(modifiers.len(), 1);
    assert_eq!(modifiers[0].target, ModifierTarget::Card(CardId::new("rocket")));
}

const MODIFIER_CARDS: [&str; 4] = ["space-station", "city-planner", "urban-grant", "adaptation"];
const HAND_CARDS: [&str; 5] = ["rocket", "big-space", "heather", "comet", "factory"];

fn player_with(effects: &[usize], hand: &[usize]) -> Player {
    let cards = registry();
    let mut player = Player::new(PlayerId::new("p"), "P");
    for &index in hand {
        player.hand.push_back(CardId::new(HAND_CARDS[index]));
    }
    for &index in effects {
        let card = cards.get(&CardId::new(MODIFIER_CARDS[index])).unwrap();
        player.effects.push_back(PlayerEffect {
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            behavior_index: 0,
            behavior: card.behaviors[0].clone(),
        });
    }
    player
}

proptest! {
    /// Test that the modifier set ignores effect and hand order.
    #[test]
    fn test_calculate_order_independent(
        effects in proptest::sample::subsequence(vec![0usize, 1, 2, 3], 0..=4).prop_shuffle(),
        hand in proptest::sample::subsequence(vec![0usize, 1, 2, 3, 4], 0..=5).prop_shuffle(),
    ) {
        let cards = registry();
        let shuffled = calculate(&player_with(&effects, &hand), &cards);

        let mut sorted_effects = effects.clone();
        sorted_effects.sort_unstable();
        let mut sorted_hand = hand.clone();
        sorted_hand.sort_unstable();
        let sorted = calculate(&player_with(&sorted_effects, &sorted_hand), &cards);

        prop_assert_eq!(shuffled, sorted);
    }

    /// Test that recomputing without a change yields the same set.
    #[test]
    fn test_calculate_idempotent(
        effects in proptest::sample::subsequence(vec![0usize, 1, 2, 3], 0..=4),
        hand in proptest::sample::subsequence(vec![0usize, 1, 2, 3, 4], 0..=5),
    ) {
        let cards = registry();
        let player = player_with(&effects, &hand);
        let first = calculate(&player, &cards);
        let second = calculate(&player, &cards);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|m| m.amount != 0), "zero-sum groups are dropped");
    }
}

/// Test that removing a hand card drops only its own discount.
#[test]
fn test_modifiers_independent() {
    let t = table();
    t.subscribe(&t.alice, "adaptation");
    t.subscribe(&t.alice, "space-station");
    t.give_card(&t.alice, "rocket");

    let lenience = RequirementModifier {
        amount: 2,
        affected_resources: vec![ResourceType::GlobalParameter],
        target: ModifierTarget::Global,
    };
    let rocket_discount = RequirementModifier {
        amount: -2,
        affected_resources: vec![ResourceType::Credits],
        target: ModifierTarget::Card(CardId::new("rocket")),
    };

    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    assert_eq!(modifiers.len(), 2);
    assert!(modifiers.contains(&lenience));
    assert!(modifiers.contains(&rocket_discount));

    t.take_card(&t.alice, "rocket");
    let modifiers = t.engine.get_requirement_modifiers(&t.game_id, &t.alice).unwrap();
    assert_eq!(modifiers, vec![lenience], "global lenience unaffected");
}
