//! Selectors: which cards or standard projects an output applies to.
//!
//! A selector is a conjunction of its non-empty fields:
//! - `tags`: every listed tag must be on the card
//! - `card_types`: the card's type must be one of them
//! - `required_original_cost`: the card's printed cost must be in range
//!
//! A list of selectors is a disjunction: the card matches if any selector
//! matches. `standard_projects` is matched separately since a project is not
//! a card.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{Card, CardTag, CardType};

/// A game action not tied to a card, purchasable on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardProject {
    SellPatents,
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
    ConvertPlantsToGreenery,
    ConvertHeatToTemperature,
}

impl std::fmt::Display for StandardProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StandardProject::SellPatents => "sell-patents",
            StandardProject::PowerPlant => "power-plant",
            StandardProject::Asteroid => "asteroid",
            StandardProject::Aquifer => "aquifer",
            StandardProject::Greenery => "greenery",
            StandardProject::City => "city",
            StandardProject::ConvertPlantsToGreenery => "convert-plants-to-greenery",
            StandardProject::ConvertHeatToTemperature => "convert-heat-to-temperature",
        };
        f.write_str(name)
    }
}

/// Inclusive range on a card's printed cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRange {
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
}

impl CostRange {
    /// Range with a lower bound only.
    pub fn at_least(min: i32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Range with an upper bound only.
    pub fn at_most(max: i32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether `cost` lies in the range.
    #[must_use]
    pub fn contains(&self, cost: i32) -> bool {
        self.min.is_none_or(|min| cost >= min) && self.max.is_none_or(|max| cost <= max)
    }
}

/// One selector object. See the module docs for matching rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default)]
    pub tags: SmallVec<[CardTag; 2]>,
    #[serde(default)]
    pub card_types: SmallVec<[CardType; 2]>,
    #[serde(default)]
    pub standard_projects: SmallVec<[StandardProject; 2]>,
    #[serde(default)]
    pub required_original_cost: Option<CostRange>,
}

impl Selector {
    /// Empty selector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector requiring one tag.
    #[must_use]
    pub fn tag(tag: CardTag) -> Self {
        Self::new().with_tag(tag)
    }

    /// Selector for one card type.
    #[must_use]
    pub fn card_type(card_type: CardType) -> Self {
        Self::new().with_card_type(card_type)
    }

    /// Selector for one standard project.
    #[must_use]
    pub fn project(project: StandardProject) -> Self {
        Self::new().with_project(project)
    }

    /// Require a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: CardTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Allow a card type (builder pattern).
    #[must_use]
    pub fn with_card_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    /// Select a standard project (builder pattern).
    #[must_use]
    pub fn with_project(mut self, project: StandardProject) -> Self {
        self.standard_projects.push(project);
        self
    }

    /// Constrain the printed cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, range: CostRange) -> Self {
        self.required_original_cost = Some(range);
        self
    }

    /// Whether this selector says anything about cards.
    #[must_use]
    pub fn targets_cards(&self) -> bool {
        !self.tags.is_empty() || !self.card_types.is_empty() || self.required_original_cost.is_some()
    }

    /// Check a card against this selector.
    ///
    /// A selector with no card criteria never matches a card.
    #[must_use]
    pub fn matches_card(&self, card: &Card) -> bool {
        if !self.targets_cards() {
            return false;
        }

        if !self.tags.iter().all(|tag| card.has_tag(*tag)) {
            return false;
        }

        if !self.card_types.is_empty() && !self.card_types.contains(&card.card_type) {
            return false;
        }

        self.required_original_cost
            .is_none_or(|range| range.contains(card.cost))
    }
}

/// True if the card matches at least one selector.
#[must_use]
pub fn matches_any_card(card: &Card, selectors: &[Selector]) -> bool {
    selectors.iter().any(|s| s.matches_card(card))
}

/// True if any selector has card criteria.
#[must_use]
pub fn has_card_selectors(selectors: &[Selector]) -> bool {
    selectors.iter().any(Selector::targets_cards)
}

/// Standard projects named by any selector, deduplicated, in first-seen order.
#[must_use]
pub fn selected_projects(selectors: &[Selector]) -> Vec<StandardProject> {
    let mut projects = Vec::new();
    for project in selectors.iter().flat_map(|s| s.standard_projects.iter()) {
        if !projects.contains(project) {
            projects.push(*project);
        }
    }
    projects
}
