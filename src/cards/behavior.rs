//! Declarative card behaviors.
//!
//! A behavior is data, not logic: a trigger says *when*, outputs say *what*.
//! The effect engine (`crate::effects`) decides how each behavior is handled:
//!
//! | Trigger                | Handling                                  |
//! |------------------------|-------------------------------------------|
//! | `auto`, no condition   | immediate: applied once when played       |
//! | `auto` + condition     | passive: subscribed to the event bus      |
//! | `manual`               | action: listed for the player to activate |
//!
//! Behaviors are never mutated after the card is registered.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineError, ResourceType, Result};

use super::definition::{CardId, CardType};
use super::selector::{has_card_selectors, selected_projects, Selector, StandardProject};

/// How a behavior is activated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    #[default]
    Auto,
    Manual,
}

/// Game-state change categories a passive behavior can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    TemperatureRaise,
    OxygenRaise,
    OceanPlaced,
    CardPlayed,
    CardHandUpdated,
    PlayerEffectsChanged,
    CityPlaced,
    GreeneryPlaced,
    /// A tile placement granted bonus resources.
    PlacementBonusGained,
}

/// Condition attached to an `auto` trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: TriggerKind,

    /// For `card-played`: only react to cards of these types. Empty = any.
    #[serde(default)]
    pub affected_card_types: SmallVec<[CardType; 2]>,

    /// For `placement-bonus-gained`: the bonus must include one of these.
    #[serde(default)]
    pub affected_resources: SmallVec<[ResourceType; 2]>,
}

impl Condition {
    /// Condition on a change category with no filter.
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            affected_card_types: SmallVec::new(),
            affected_resources: SmallVec::new(),
        }
    }

    /// Restrict `card-played` to a card type (builder pattern).
    #[must_use]
    pub fn with_card_type(mut self, card_type: CardType) -> Self {
        self.affected_card_types.push(card_type);
        self
    }

    /// Restrict `placement-bonus-gained` to a resource (builder pattern).
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceType) -> Self {
        self.affected_resources.push(resource);
        self
    }

    /// Whether a placement bonus of `resources` satisfies the filter.
    ///
    /// An empty filter never matches.
    #[must_use]
    pub fn accepts_resources(&self, mut resources: impl Iterator<Item = ResourceType>) -> bool {
        resources.any(|r| self.affected_resources.contains(&r))
    }

    /// Whether a played card of `card_type` satisfies the filter.
    #[must_use]
    pub fn accepts_card_type(&self, card_type: CardType) -> bool {
        self.affected_card_types.is_empty() || self.affected_card_types.contains(&card_type)
    }
}

/// Trigger of a behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl Trigger {
    /// `auto` trigger without a condition.
    pub fn auto() -> Self {
        Self {
            trigger_type: TriggerType::Auto,
            condition: None,
        }
    }

    /// `auto` trigger listening for a change category.
    pub fn on(condition: Condition) -> Self {
        Self {
            trigger_type: TriggerType::Auto,
            condition: Some(condition),
        }
    }

    /// `manual` trigger.
    pub fn manual() -> Self {
        Self {
            trigger_type: TriggerType::Manual,
            condition: None,
        }
    }
}

/// Tile kinds an output can queue for placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileKind {
    City,
    Greenery,
    Ocean,
}

/// What an output does. Closed set: every consumer matches exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputKind {
    /// Gain (or lose) a basic resource.
    Resource { resource: ResourceType },
    /// Change production of a basic resource.
    Production { resource: ResourceType },
    TerraformRating,
    /// Raise temperature by `amount` steps.
    Temperature,
    /// Raise oxygen by `amount` steps.
    Oxygen,
    /// Place `amount` oceans.
    Ocean,
    /// Queue `amount` tiles for placement.
    TilePlacement { tile: TileKind },
    /// Add resources stored on the card itself (microbes, animals, ...).
    CardStorage { resource: ResourceType },
    /// Cost adjustment for matching cards / projects.
    Discount,
    /// Global-parameter requirement widening.
    GlobalParameterLenience,
}

impl OutputKind {
    /// Whether this output produces requirement modifiers.
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, OutputKind::Discount | OutputKind::GlobalParameterLenience)
    }

    /// Resource set a modifier applies to when the output lists none.
    #[must_use]
    pub const fn default_modifier_resource(self) -> ResourceType {
        match self {
            OutputKind::GlobalParameterLenience => ResourceType::GlobalParameter,
            _ => ResourceType::Credits,
        }
    }
}

/// Who an output applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputTarget {
    SelfPlayer,
    SelfCard,
    AnyPlayer,
    #[default]
    None,
}

/// One output (or input) of a behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    #[serde(flatten)]
    pub kind: OutputKind,
    pub amount: i32,
    #[serde(default)]
    pub target: OutputTarget,
    #[serde(default)]
    pub affected_resources: SmallVec<[ResourceType; 2]>,
    #[serde(default)]
    pub selectors: Vec<Selector>,
}

impl Output {
    /// Output of a kind with no target and no selectors.
    pub fn new(kind: OutputKind, amount: i32) -> Self {
        Self {
            kind,
            amount,
            target: OutputTarget::None,
            affected_resources: SmallVec::new(),
            selectors: Vec::new(),
        }
    }

    /// Resource gain for the owning player.
    pub fn resource(resource: ResourceType, amount: i32) -> Self {
        Self::new(OutputKind::Resource { resource }, amount).with_target(OutputTarget::SelfPlayer)
    }

    /// Production change for the owning player.
    pub fn production(resource: ResourceType, amount: i32) -> Self {
        Self::new(OutputKind::Production { resource }, amount).with_target(OutputTarget::SelfPlayer)
    }

    /// Resources added to the card itself.
    pub fn card_storage(resource: ResourceType, amount: i32) -> Self {
        Self::new(OutputKind::CardStorage { resource }, amount).with_target(OutputTarget::SelfCard)
    }

    /// Tile placement queued for the owning player.
    pub fn tile(tile: TileKind, amount: i32) -> Self {
        Self::new(OutputKind::TilePlacement { tile }, amount).with_target(OutputTarget::SelfPlayer)
    }

    /// Cost discount; use a negative amount to reduce cost.
    pub fn discount(amount: i32) -> Self {
        Self::new(OutputKind::Discount, amount).with_target(OutputTarget::SelfPlayer)
    }

    /// Requirement lenience in parameter steps.
    pub fn lenience(amount: i32) -> Self {
        Self::new(OutputKind::GlobalParameterLenience, amount).with_target(OutputTarget::SelfPlayer)
    }

    /// Set the target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    /// Add an affected resource (builder pattern).
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceType) -> Self {
        if !self.affected_resources.contains(&resource) {
            self.affected_resources.push(resource);
        }
        self
    }

    /// Add a selector (builder pattern).
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Standard projects this output targets.
    #[must_use]
    pub fn standard_projects(&self) -> Vec<StandardProject> {
        selected_projects(&self.selectors)
    }

    /// Whether any selector carries card criteria.
    #[must_use]
    pub fn selects_cards(&self) -> bool {
        has_card_selectors(&self.selectors)
    }
}

/// An alternative set of inputs/outputs; exactly one is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub inputs: Vec<Output>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl Choice {
    /// Choice granting the given outputs.
    pub fn of(outputs: impl IntoIterator<Item = Output>) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: outputs.into_iter().collect(),
        }
    }
}

/// A card behavior: triggers, inputs, outputs and optional choices.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{
///     CardBehavior, CardTag, Condition, Output, Selector, TriggerKind,
/// };
///
/// // "Effect: when you play a space card, it costs 2 less."
/// let behavior = CardBehavior::passive(Condition::new(TriggerKind::CardHandUpdated))
///     .with_output(Output::discount(-2).with_selector(Selector::tag(CardTag::Space)));
///
/// assert!(behavior.has_modifier_output());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBehavior {
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub inputs: Vec<Output>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl CardBehavior {
    /// Behavior applied once when the card is played.
    pub fn immediate() -> Self {
        Self::with_trigger(Trigger::auto())
    }

    /// Behavior reacting to a change category.
    pub fn passive(condition: Condition) -> Self {
        Self::with_trigger(Trigger::on(condition))
    }

    /// Behavior the player activates as an action.
    pub fn manual() -> Self {
        Self::with_trigger(Trigger::manual())
    }

    fn with_trigger(trigger: Trigger) -> Self {
        Self {
            triggers: vec![trigger],
            ..Self::default()
        }
    }

    /// Add an output (builder pattern).
    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Add an input (builder pattern).
    #[must_use]
    pub fn with_input(mut self, input: Output) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add a choice (builder pattern).
    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// The governing trigger. Only the first trigger is considered.
    #[must_use]
    pub fn trigger(&self) -> Option<&Trigger> {
        self.triggers.first()
    }

    /// The condition of the governing trigger, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        self.trigger().and_then(|t| t.condition.as_ref())
    }

    /// Whether any output is a discount or lenience.
    #[must_use]
    pub fn has_modifier_output(&self) -> bool {
        self.outputs.iter().any(|o| o.kind.is_modifier())
    }

    /// Inputs and outputs with the selected choice appended.
    ///
    /// Returns `None` if `choice` is out of range.
    pub fn resolve(&self, choice: Option<usize>) -> Option<(Vec<&Output>, Vec<&Output>)> {
        let mut inputs: Vec<&Output> = self.inputs.iter().collect();
        let mut outputs: Vec<&Output> = self.outputs.iter().collect();

        if let Some(index) = choice {
            let selected = self.choices.get(index)?;
            inputs.extend(selected.inputs.iter());
            outputs.extend(selected.outputs.iter());
        }

        Some((inputs, outputs))
    }

    /// Defensive checks on card data.
    pub fn validate(&self, card: &CardId) -> Result<()> {
        if self.choices.len() == 1 {
            return Err(EngineError::validation(
                card,
                "a behavior with choices needs at least two alternatives",
            ));
        }

        if let Some(trigger) = self.trigger() {
            if trigger.trigger_type == TriggerType::Manual && trigger.condition.is_some() {
                return Err(EngineError::validation(card, "manual trigger cannot carry a condition"));
            }
            if let Some(condition) = &trigger.condition {
                if condition.kind != TriggerKind::CardPlayed && !condition.affected_card_types.is_empty() {
                    return Err(EngineError::validation(
                        card,
                        "card type filter is only valid on card-played conditions",
                    ));
                }
                if condition.kind != TriggerKind::PlacementBonusGained && !condition.affected_resources.is_empty() {
                    return Err(EngineError::validation(
                        card,
                        "resource filter is only valid on placement-bonus-gained conditions",
                    ));
                }
            }
        }

        let all_outputs = self
            .inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.choices.iter().flat_map(|c| c.inputs.iter().chain(c.outputs.iter())));

        for output in all_outputs {
            match output.kind {
                OutputKind::Resource { resource } | OutputKind::Production { resource } => {
                    if !resource.is_basic() {
                        return Err(EngineError::validation(
                            card,
                            format!("{resource} is not a player resource"),
                        ));
                    }
                }
                OutputKind::CardStorage { resource } => {
                    if resource.is_basic() {
                        return Err(EngineError::validation(
                            card,
                            format!("{resource} cannot be stored on a card"),
                        ));
                    }
                }
                OutputKind::TerraformRating
                | OutputKind::Temperature
                | OutputKind::Oxygen
                | OutputKind::Ocean
                | OutputKind::TilePlacement { .. }
                | OutputKind::Discount
                | OutputKind::GlobalParameterLenience => {}
            }
        }

        Ok(())
    }
}
