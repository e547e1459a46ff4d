//! Card definitions - static card data.
//!
//! A `Card` holds the immutable properties of a project card or
//! corporation: its tags, base cost, global-parameter requirements and the
//! declarative behaviors the effect engine turns into state changes.
//!
//! Per-player data (which hand a card sits in, resources stored on it) is
//! kept on the player aggregate, never on the definition.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::GlobalParameter;

use super::behavior::CardBehavior;

/// Unique identifier for a card definition (e.g. `"023"`, `"B07"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Corporation,
    /// Blue cards: ongoing effects and repeatable actions.
    Active,
    /// Green cards: immediate effects, production bonuses.
    Automated,
    /// Red cards: one-time effects.
    Event,
    Prelude,
}

/// Card tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardTag {
    Space,
    Earth,
    Science,
    Power,
    Building,
    Microbe,
    Animal,
    Plant,
    Event,
    City,
    Venus,
    Jovian,
    Wild,
}

/// Tag list; most cards carry two or fewer.
pub type Tags = SmallVec<[CardTag; 4]>;

/// A global-parameter requirement printed on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub parameter: GlobalParameter,
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

impl Requirement {
    /// Requirement of at least `min`.
    pub fn min(parameter: GlobalParameter, min: i32) -> Self {
        Self {
            parameter,
            min: Some(min),
            max: None,
        }
    }

    /// Requirement of at most `max`.
    pub fn max(parameter: GlobalParameter, max: i32) -> Self {
        Self {
            parameter,
            min: None,
            max: Some(max),
        }
    }

    /// Check a parameter value, widening the window by `lenience` steps.
    #[must_use]
    pub fn is_met(&self, value: i32, lenience: i32) -> bool {
        let slack = lenience.max(0) * self.parameter.step();
        let above_min = self.min.is_none_or(|min| value >= min - slack);
        let below_max = self.max.is_none_or(|max| value <= max + slack);
        above_min && below_max
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{Card, CardId, CardTag, CardType};
///
/// let card = Card::new(CardId::new("T01"), "Space Elevator", CardType::Active)
///     .with_cost(27)
///     .with_tag(CardTag::Space)
///     .with_tag(CardTag::Building);
///
/// assert!(card.has_tag(CardTag::Space));
/// assert_eq!(card.cost, 27);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub behaviors: Vec<CardBehavior>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl Card {
    /// Create a new card definition with no tags, cost or behaviors.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            tags: Tags::new(),
            cost: 0,
            behaviors: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Set the base cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    /// Add a tag (builder pattern). Duplicate tags are kept, since some
    /// cards print the same tag twice.
    #[must_use]
    pub fn with_tag(mut self, tag: CardTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Add a behavior (builder pattern).
    #[must_use]
    pub fn with_behavior(mut self, behavior: CardBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Add a requirement (builder pattern).
    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Whether the card carries a tag.
    #[must_use]
    pub fn has_tag(&self, tag: CardTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Whether any requirement is on a global parameter.
    #[must_use]
    pub fn has_global_requirement(&self) -> bool {
        !self.requirements.is_empty()
    }
}
