//! Requirement modifier calculation.
//!
//! Modifiers are derived data: they are never authored, only recomputed
//! from a player's active effects, hand and corporation. Every recompute
//! builds the full set from scratch and the store swaps it in whole.
//!
//! ## Algorithm
//!
//! For every discount / lenience output of every active effect:
//!
//! 1. Output names standard projects: one candidate per project.
//! 2. Otherwise, output has card selectors: one candidate per hand card (or
//!    corporation) matching any selector.
//! 3. Otherwise: one global candidate.
//!
//! Candidates are then grouped by `(target, resource set)` and summed.
//! Groups that sum to zero are dropped, so removing the last matching card
//! never leaves an empty modifier behind.
//!
//! The result is sorted, which makes the calculation independent of effect
//! and hand order.

use std::collections::BTreeMap;
use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::selector::matches_any_card;
use crate::cards::{Card, CardId, CardRegistry, Output, OutputKind, StandardProject};
use crate::core::{Player, ResourceType};

/// What a modifier applies to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "kebab-case")]
pub enum ModifierTarget {
    /// One specific card.
    Card(CardId),
    /// One standard project.
    StandardProject(StandardProject),
    /// Everything the player buys.
    Global,
}

/// A derived, merged adjustment to costs or requirements.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementModifier {
    /// Signed adjustment; discounts are negative.
    pub amount: i32,
    /// Sorted, deduplicated.
    pub affected_resources: Vec<ResourceType>,
    pub target: ModifierTarget,
}

impl RequirementModifier {
    /// Whether the modifier touches `resource`.
    #[must_use]
    pub fn affects(&self, resource: ResourceType) -> bool {
        self.affected_resources.binary_search(&resource).is_ok()
    }

    /// Whether the modifier applies when buying `card`.
    #[must_use]
    pub fn applies_to_card(&self, card: &CardId) -> bool {
        match &self.target {
            ModifierTarget::Card(id) => id == card,
            ModifierTarget::Global => true,
            ModifierTarget::StandardProject(_) => false,
        }
    }

    /// Whether the modifier applies when buying `project`.
    #[must_use]
    pub fn applies_to_project(&self, project: StandardProject) -> bool {
        match &self.target {
            ModifierTarget::StandardProject(p) => *p == project,
            ModifierTarget::Global => true,
            ModifierTarget::Card(_) => false,
        }
    }
}

type GroupKey = (ModifierTarget, Vec<ResourceType>);

/// Compute the full modifier set for a player.
///
/// Pure: reads the player and the registry, writes nothing. Hand cards the
/// registry doesn't know are skipped with a warning.
#[must_use]
pub fn calculate(player: &Player, cards: &CardRegistry) -> Vec<RequirementModifier> {
    let candidates = candidate_cards(player, cards);
    let mut groups: BTreeMap<GroupKey, i32> = BTreeMap::new();

    for effect in &player.effects {
        for output in &effect.behavior.outputs {
            let Some(resources) = modifier_resources(output) else {
                continue;
            };

            let projects = output.standard_projects();
            if !projects.is_empty() {
                for project in projects {
                    add(&mut groups, ModifierTarget::StandardProject(project), &resources, output.amount);
                }
            } else if output.selects_cards() {
                for card in candidates.iter().filter(|c| matches_any_card(c, &output.selectors)) {
                    add(&mut groups, ModifierTarget::Card(card.id.clone()), &resources, output.amount);
                }
            } else {
                add(&mut groups, ModifierTarget::Global, &resources, output.amount);
            }
        }
    }

    let modifiers: Vec<RequirementModifier> = groups
        .into_iter()
        .filter(|(_, amount)| *amount != 0)
        .map(|((target, affected_resources), amount)| RequirementModifier {
            amount,
            affected_resources,
            target,
        })
        .collect();

    tracing::debug!(
        player_id = %player.id,
        effects = player.effects.len(),
        hand_size = player.hand.len(),
        modifiers = modifiers.len(),
        "requirement modifiers calculated"
    );
    modifiers
}

/// Recompute and store a player's modifiers. Returns whether they changed.
///
/// Meant to run inside the same `update_player` closure as the hand or
/// effect change that caused it.
pub fn refresh(player: &mut Player, cards: &CardRegistry) -> bool {
    let modifiers = Vector::from(calculate(player, cards));
    if modifiers == player.requirement_modifiers {
        return false;
    }
    player.requirement_modifiers = modifiers;
    true
}

/// Resource set of a modifier output, or `None` for any other output kind.
fn modifier_resources(output: &Output) -> Option<Vec<ResourceType>> {
    match output.kind {
        OutputKind::Discount | OutputKind::GlobalParameterLenience => {
            let mut resources: Vec<ResourceType> = if output.affected_resources.is_empty() {
                vec![output.kind.default_modifier_resource()]
            } else {
                output.affected_resources.to_vec()
            };
            resources.sort_unstable();
            resources.dedup();
            Some(resources)
        }
        OutputKind::Resource { .. }
        | OutputKind::Production { .. }
        | OutputKind::TerraformRating
        | OutputKind::Temperature
        | OutputKind::Oxygen
        | OutputKind::Ocean
        | OutputKind::TilePlacement { .. }
        | OutputKind::CardStorage { .. } => None,
    }
}

/// Hand cards plus the corporation, each at most once.
fn candidate_cards(player: &Player, cards: &CardRegistry) -> Vec<Arc<Card>> {
    let mut seen: FxHashSet<&CardId> = FxHashSet::default();
    let mut candidates = Vec::with_capacity(player.hand.len() + 1);

    for id in player.hand.iter().chain(player.corporation.iter()) {
        if !seen.insert(id) {
            continue;
        }
        match cards.get(id) {
            Some(card) => candidates.push(Arc::clone(card)),
            None => {
                tracing::warn!(player_id = %player.id, card_id = %id, "card not in registry, skipped");
            }
        }
    }
    candidates
}

fn add(groups: &mut BTreeMap<GroupKey, i32>, target: ModifierTarget, resources: &[ResourceType], amount: i32) {
    *groups.entry((target, resources.to_vec())).or_insert(0) += amount;
}
