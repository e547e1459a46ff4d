//! Behavior classification.
//!
//! Decides how the subscriber handles each behavior of a card entering
//! play. Only the first trigger of a behavior is considered.

use crate::cards::{CardBehavior, TriggerKind, TriggerType};

/// How a behavior is handled when its card enters play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorClass {
    /// Apply every output once, now.
    Immediate,
    /// Record a player effect and react to events of this category.
    Passive(TriggerKind),
    /// Unconditioned discount / lenience. Recorded as a player effect that
    /// reprices on hand updates; its other outputs are applied once.
    Static,
    /// List as a player action.
    Manual,
    /// No trigger; nothing to do.
    Skip,
}

impl BehaviorClass {
    /// Whether the behavior produces a player effect record.
    #[must_use]
    pub const fn is_standing(self) -> bool {
        matches!(self, BehaviorClass::Passive(_) | BehaviorClass::Static)
    }

    /// Event category the behavior listens on, if any.
    #[must_use]
    pub const fn listens_on(self) -> Option<TriggerKind> {
        match self {
            BehaviorClass::Passive(kind) => Some(kind),
            BehaviorClass::Static => Some(TriggerKind::CardHandUpdated),
            BehaviorClass::Immediate | BehaviorClass::Manual | BehaviorClass::Skip => None,
        }
    }
}

/// Classify one behavior.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{CardBehavior, Condition, Output, TriggerKind};
/// use rust_terraform::effects::{classify, BehaviorClass};
///
/// let passive = CardBehavior::passive(Condition::new(TriggerKind::OxygenRaise));
/// assert_eq!(classify(&passive), BehaviorClass::Passive(TriggerKind::OxygenRaise));
///
/// let discount = CardBehavior::immediate().with_output(Output::discount(-2));
/// assert_eq!(classify(&discount), BehaviorClass::Static);
/// ```
#[must_use]
pub fn classify(behavior: &CardBehavior) -> BehaviorClass {
    let Some(trigger) = behavior.trigger() else {
        return BehaviorClass::Skip;
    };

    match (trigger.trigger_type, &trigger.condition) {
        (TriggerType::Manual, _) => BehaviorClass::Manual,
        (TriggerType::Auto, Some(condition)) => BehaviorClass::Passive(condition.kind),
        (TriggerType::Auto, None) if behavior.has_modifier_output() => BehaviorClass::Static,
        (TriggerType::Auto, None) => BehaviorClass::Immediate,
    }
}
