//! Card effect subscription.
//!
//! `CardEffectSubscriber` turns a card entering play into live state:
//!
//! | Class       | Player write                  | Bus subscription     |
//! |-------------|-------------------------------|----------------------|
//! | `Immediate` | outputs applied once          | none                 |
//! | `Passive`   | `PlayerEffect` appended       | condition's category |
//! | `Static`    | effect appended, outputs once | `card-hand-updated`  |
//! | `Manual`    | `PlayerAction` appended       | none                 |
//!
//! ## Atomicity
//!
//! Subscription is all-or-nothing. Every behavior is validated first, then
//! all player changes (outputs, effects, actions, pending choices and the
//! modifier recompute) are committed in one store write. Bus subscriptions
//! are registered only after that write succeeds, and events are published
//! last, after every lock is released.
//!
//! ## Passive reactions
//!
//! Handlers hold a `Weak` reference to the session, so the bus owning the
//! handlers never keeps its own session alive. A card never reacts to an
//! event about itself, such as its own `CardPlayed`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cards::{Card, CardBehavior, CardId, Output, OutputTarget, TriggerKind};
use crate::core::{EngineError, PendingChoice, PlayerAction, PlayerEffect, PlayerId, Result};
use crate::events::{
    CardHandUpdated, CardPlayed, Event, GameEvent, OceanPlaced, OxygenRaised, PlacementBonusGained,
    PlayerEffectsChanged, SubscriptionId, TemperatureRaised, TilePlaced,
};
use crate::session::GameSession;
use crate::store::PlayerUpdate;

use super::applier::{apply_outputs, pay_inputs, AppliedOutputs};
use super::classifier::{classify, BehaviorClass};
use super::modifiers::RequirementModifier;

/// Bookkeeping for one subscribed card.
#[derive(Debug)]
struct CardSubscriptions {
    owner: PlayerId,
    card: Arc<Card>,
    ids: SmallVec<[SubscriptionId; 2]>,
}

/// A standing behavior listening on the bus.
#[derive(Debug)]
struct PassiveReaction {
    kind: TriggerKind,
    owner: PlayerId,
    card_id: CardId,
    behavior: CardBehavior,
}

impl PassiveReaction {
    fn on_event<E: GameEvent>(&self, session: &GameSession, event: &E) -> Result<()> {
        if event.game_id() != session.game_id() || event.kind() != Some(self.kind) {
            return Ok(());
        }
        if event.card() == Some(&self.card_id) {
            return Ok(());
        }
        if !event.fires_for(&self.owner, self.behavior.condition()) {
            return Ok(());
        }

        match self.kind {
            TriggerKind::CardHandUpdated | TriggerKind::PlayerEffectsChanged => {
                session.recompute_modifiers(&self.owner)?;
                return Ok(());
            }
            TriggerKind::TemperatureRaise
            | TriggerKind::OxygenRaise
            | TriggerKind::OceanPlaced
            | TriggerKind::CardPlayed
            | TriggerKind::CityPlaced
            | TriggerKind::GreeneryPlaced
            | TriggerKind::PlacementBonusGained => {}
        }

        let actor = event.actor();
        let outputs: Vec<&Output> = self
            .behavior
            .outputs
            .iter()
            .filter(|o| o.target != OutputTarget::SelfPlayer || actor.is_none_or(|a| *a == self.owner))
            .collect();
        if outputs.is_empty() {
            tracing::debug!(
                player_id = %self.owner,
                card_id = %self.card_id,
                "passive effect skipped: event caused by another player"
            );
            return Ok(());
        }

        let recompute = outputs.iter().any(|o| o.kind.is_modifier());
        let mut applied = AppliedOutputs::default();
        session.update_player(&self.owner, recompute, &mut |player| {
            let mut batch = AppliedOutputs::default();
            apply_outputs(player, &self.card_id, outputs.iter().copied(), &mut batch)?;
            applied = batch;
            Ok(())
        })?;

        tracing::info!(
            game_id = %session.game_id(),
            player_id = %self.owner,
            card_id = %self.card_id,
            trigger = ?self.kind,
            "passive effect triggered"
        );
        session.apply_follow_ups(&applied)
    }
}

/// A committed subscription whose follow-ups have not run yet.
///
/// Returned by [`CardEffectSubscriber::subscribe_with`]; hand it to
/// [`CardEffectSubscriber::finish_subscription`] once the caller's own
/// events are out.
#[derive(Debug, Default)]
#[must_use]
pub struct Subscribed {
    applied: AppliedOutputs,
    adds_effects: bool,
}

/// Subscribes and unsubscribes card effects for one game.
pub struct CardEffectSubscriber {
    session: Arc<GameSession>,
    subscriptions: Mutex<FxHashMap<CardId, CardSubscriptions>>,
}

impl CardEffectSubscriber {
    pub fn new(session: Arc<GameSession>) -> Self {
        Self {
            session,
            subscriptions: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Classify every behavior of `card` and register it for `player`.
    ///
    /// ## Errors
    ///
    /// - `PlayerNotFound` / `GameNotFound`: unknown player or game
    /// - `Validation`: malformed behavior, mismatched ID, or the card is
    ///   already subscribed
    /// - `StoreWrite`: the store rejected the write
    ///
    /// On error nothing is registered and the player is unchanged.
    pub fn subscribe_card_effects(&self, player: &PlayerId, card_id: &CardId, card: &Card) -> Result<()> {
        let subscribed = self.subscribe_with(player, card_id, card, false, &mut |_| Ok(()))?;
        self.finish_subscription(player, card_id, subscribed);
        Ok(())
    }

    /// Subscribe a card's effects in the same store write as `before`.
    ///
    /// `before` runs first against the working copy, then every behavior is
    /// applied. If either fails nothing is committed and nothing is
    /// registered. `recompute` forces a modifier recompute even when the
    /// card adds no modifier effects (e.g. when `before` changes the hand).
    ///
    /// Bus handlers are registered before returning; no event is published.
    pub fn subscribe_with(
        &self,
        player: &PlayerId,
        card_id: &CardId,
        card: &Card,
        recompute: bool,
        before: &mut PlayerUpdate<'_>,
    ) -> Result<Subscribed> {
        if &card.id != card_id {
            return Err(EngineError::validation(
                card_id,
                format!("definition has id {}", card.id),
            ));
        }
        for behavior in &card.behaviors {
            behavior.validate(card_id)?;
        }

        let plan: Vec<(usize, &CardBehavior, BehaviorClass)> = card
            .behaviors
            .iter()
            .enumerate()
            .map(|(index, behavior)| (index, behavior, classify(behavior)))
            .collect();
        let recompute = recompute
            || plan
                .iter()
                .any(|(_, behavior, class)| class.is_standing() && behavior.has_modifier_output());
        let adds_effects = plan.iter().any(|(_, _, class)| class.is_standing());

        let mut subscriptions = self.subscriptions.lock();
        if subscriptions.contains_key(card_id) {
            return Err(EngineError::validation(card_id, "card effects already subscribed"));
        }

        let mut applied = AppliedOutputs::default();
        self.session.update_player(player, recompute, &mut |working| {
            before(working)?;

            let mut batch = AppliedOutputs::default();
            for (index, behavior, class) in &plan {
                match class {
                    BehaviorClass::Immediate => {
                        pay_inputs(working, card_id, &behavior.inputs)?;
                        apply_outputs(working, card_id, &behavior.outputs, &mut batch)?;
                        if !behavior.choices.is_empty() {
                            working.pending_choices.push_back(PendingChoice {
                                card_id: card_id.clone(),
                                behavior_index: *index,
                            });
                        }
                    }
                    BehaviorClass::Static => {
                        apply_outputs(working, card_id, &behavior.outputs, &mut batch)?;
                        working.effects.push_back(effect_record(card, *index, behavior));
                    }
                    BehaviorClass::Passive(_) => {
                        working.effects.push_back(effect_record(card, *index, behavior));
                    }
                    BehaviorClass::Manual => {
                        working.actions.push_back(PlayerAction {
                            card_id: card_id.clone(),
                            card_name: card.name.clone(),
                            behavior_index: *index,
                            behavior: (*behavior).clone(),
                        });
                    }
                    BehaviorClass::Skip => {}
                }
            }
            applied = batch;
            Ok(())
        })?;

        let mut ids = SmallVec::new();
        for (_, behavior, class) in &plan {
            if let Some(kind) = class.listens_on() {
                let reaction = Arc::new(PassiveReaction {
                    kind,
                    owner: player.clone(),
                    card_id: card_id.clone(),
                    behavior: (*behavior).clone(),
                });
                ids.push(self.listen(kind, reaction));
            }
        }

        let subscription_count = ids.len();
        subscriptions.insert(
            card_id.clone(),
            CardSubscriptions {
                owner: player.clone(),
                card: Arc::new(card.clone()),
                ids,
            },
        );
        drop(subscriptions);

        tracing::info!(
            game_id = %self.session.game_id(),
            player_id = %player,
            card_id = %card_id,
            card_name = %card.name,
            behaviors = plan.len(),
            subscriptions = subscription_count,
            "card effects subscribed"
        );
        Ok(Subscribed { applied, adds_effects })
    }

    /// Run the game-wide follow-ups of a committed subscription and announce
    /// new effects.
    ///
    /// The subscription is already committed, so a follow-up failure is
    /// logged rather than returned.
    pub fn finish_subscription(&self, player: &PlayerId, card_id: &CardId, subscribed: Subscribed) {
        if let Err(error) = self.session.apply_follow_ups(&subscribed.applied) {
            tracing::error!(card_id = %card_id, %error, "global parameter follow-up failed");
        }
        if subscribed.adds_effects {
            self.session.publish_effects_changed(player);
        }
    }

    /// Remove every subscription, effect and action of a card, then
    /// recompute the owner's modifiers.
    ///
    /// Unsubscribing a card that isn't subscribed is a no-op.
    pub fn unsubscribe_card_effects(&self, card_id: &CardId) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock();
        let Some(entry) = subscriptions.get(card_id) else {
            tracing::debug!(card_id = %card_id, "no effects subscribed for card");
            return Ok(());
        };
        let owner = entry.owner.clone();

        let mut removed_effects = 0;
        self.session.update_player(&owner, true, &mut |working| {
            removed_effects = working.remove_effects_for(card_id);
            working.remove_actions_for(card_id);
            working.pending_choices.retain(|c| &c.card_id != card_id);
            Ok(())
        })?;

        if let Some(entry) = subscriptions.remove(card_id) {
            for id in &entry.ids {
                self.session.bus().unsubscribe(*id);
            }
        }
        drop(subscriptions);

        tracing::info!(
            game_id = %self.session.game_id(),
            player_id = %owner,
            card_id = %card_id,
            removed_effects,
            "card effects unsubscribed"
        );

        if removed_effects > 0 {
            self.session.publish_effects_changed(&owner);
        }
        Ok(())
    }

    /// Run a manual card action.
    ///
    /// `choice` selects one of the behavior's choices and is required when
    /// the behavior has any.
    pub fn execute_card_action(
        &self,
        player: &PlayerId,
        card_id: &CardId,
        behavior_index: usize,
        choice: Option<usize>,
    ) -> Result<()> {
        let mut applied = AppliedOutputs::default();
        self.session.update_player(player, false, &mut |working| {
            let action = working
                .action(card_id, behavior_index)
                .cloned()
                .ok_or_else(|| EngineError::validation(card_id, format!("no action {behavior_index}")))?;
            let behavior = &action.behavior;

            if !behavior.choices.is_empty() && choice.is_none() {
                return Err(EngineError::validation(card_id, "action requires a choice"));
            }
            let (inputs, outputs) = behavior
                .resolve(choice)
                .ok_or_else(|| EngineError::validation(card_id, "choice out of range"))?;

            let mut batch = AppliedOutputs::default();
            pay_inputs(working, card_id, inputs)?;
            apply_outputs(working, card_id, outputs, &mut batch)?;
            applied = batch;
            Ok(())
        })?;

        tracing::info!(
            game_id = %self.session.game_id(),
            player_id = %player,
            card_id = %card_id,
            behavior_index,
            "card action executed"
        );
        self.session.apply_follow_ups(&applied)
    }

    /// Resolve a pending choice of an immediate behavior.
    pub fn resolve_choice(
        &self,
        player: &PlayerId,
        card_id: &CardId,
        behavior_index: usize,
        choice: usize,
    ) -> Result<()> {
        let card = self.card(card_id)?;
        let behavior = card
            .behaviors
            .get(behavior_index)
            .ok_or_else(|| EngineError::validation(card_id, format!("no behavior {behavior_index}")))?;
        let selected = behavior
            .choices
            .get(choice)
            .ok_or_else(|| EngineError::validation(card_id, "choice out of range"))?;

        let mut applied = AppliedOutputs::default();
        self.session.update_player(player, false, &mut |working| {
            if !working.take_pending_choice(card_id, behavior_index) {
                return Err(EngineError::validation(card_id, "no pending choice"));
            }
            let mut batch = AppliedOutputs::default();
            pay_inputs(working, card_id, &selected.inputs)?;
            apply_outputs(working, card_id, &selected.outputs, &mut batch)?;
            applied = batch;
            Ok(())
        })?;

        self.session.apply_follow_ups(&applied)
    }

    /// Current modifier set of a player.
    pub fn get_requirement_modifiers(&self, player: &PlayerId) -> Result<Vec<RequirementModifier>> {
        self.session.requirement_modifiers(player)
    }

    /// Whether a card's effects are subscribed.
    #[must_use]
    pub fn is_subscribed(&self, card_id: &CardId) -> bool {
        self.subscriptions.lock().contains_key(card_id)
    }

    /// Number of bus subscriptions held for a card.
    #[must_use]
    pub fn subscription_count(&self, card_id: &CardId) -> usize {
        self.subscriptions
            .lock()
            .get(card_id)
            .map_or(0, |entry| entry.ids.len())
    }

    fn card(&self, card_id: &CardId) -> Result<Arc<Card>> {
        if let Some(entry) = self.subscriptions.lock().get(card_id) {
            return Ok(Arc::clone(&entry.card));
        }
        self.session.cards().lookup(card_id).cloned()
    }

    fn listen(&self, kind: TriggerKind, reaction: Arc<PassiveReaction>) -> SubscriptionId {
        match kind {
            TriggerKind::TemperatureRaise => self.listen_on::<TemperatureRaised>(reaction),
            TriggerKind::OxygenRaise => self.listen_on::<OxygenRaised>(reaction),
            TriggerKind::OceanPlaced => self.listen_on::<OceanPlaced>(reaction),
            TriggerKind::CardPlayed => self.listen_on::<CardPlayed>(reaction),
            TriggerKind::CardHandUpdated => self.listen_on::<CardHandUpdated>(reaction),
            TriggerKind::PlayerEffectsChanged => self.listen_on::<PlayerEffectsChanged>(reaction),
            TriggerKind::CityPlaced | TriggerKind::GreeneryPlaced => self.listen_on::<TilePlaced>(reaction),
            TriggerKind::PlacementBonusGained => self.listen_on::<PlacementBonusGained>(reaction),
        }
    }

    fn listen_on<E: GameEvent + Event>(&self, reaction: Arc<PassiveReaction>) -> SubscriptionId {
        let session: Weak<GameSession> = Arc::downgrade(&self.session);
        self.session.bus().subscribe(move |event: &E| match session.upgrade() {
            Some(session) => reaction.on_event(&session, event),
            None => Ok(()),
        })
    }
}

impl std::fmt::Debug for CardEffectSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardEffectSubscriber")
            .field("game_id", self.session.game_id())
            .field("cards", &self.subscriptions.lock().len())
            .finish()
    }
}

fn effect_record(card: &Card, behavior_index: usize, behavior: &CardBehavior) -> PlayerEffect {
    PlayerEffect {
        card_id: card.id.clone(),
        card_name: card.name.clone(),
        behavior_index,
        behavior: behavior.clone(),
    }
}
