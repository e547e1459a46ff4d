//! Resource types and per-player resource pools.
//!
//! The same [`Resources`] struct backs both a player's stock and their
//! production track; only the six basic resources live there. Card-held
//! resources (microbes, animals, ...) are stored per card on the player.

use serde::{Deserialize, Serialize};

/// A resource a card output, modifier or payment can refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
    Microbes,
    Animals,
    Floaters,
    Science,
    /// Pseudo-resource used by lenience modifiers.
    GlobalParameter,
}

impl ResourceType {
    /// The six resources tracked in a player's stock and production.
    pub const BASIC: [ResourceType; 6] = [
        ResourceType::Credits,
        ResourceType::Steel,
        ResourceType::Titanium,
        ResourceType::Plants,
        ResourceType::Energy,
        ResourceType::Heat,
    ];

    /// Whether this resource lives in the player's stock.
    #[must_use]
    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            ResourceType::Credits
                | ResourceType::Steel
                | ResourceType::Titanium
                | ResourceType::Plants
                | ResourceType::Energy
                | ResourceType::Heat
        )
    }

    /// Wire name of this resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceType::Credits => "credits",
            ResourceType::Steel => "steel",
            ResourceType::Titanium => "titanium",
            ResourceType::Plants => "plants",
            ResourceType::Energy => "energy",
            ResourceType::Heat => "heat",
            ResourceType::Microbes => "microbes",
            ResourceType::Animals => "animals",
            ResourceType::Floaters => "floaters",
            ResourceType::Science => "science",
            ResourceType::GlobalParameter => "global-parameter",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amounts of the six basic resources.
///
/// Used both for stock and for production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl Resources {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one resource (builder pattern).
    #[must_use]
    pub fn with(mut self, resource: ResourceType, amount: i32) -> Self {
        if let Some(slot) = self.slot_mut(resource) {
            *slot = amount;
        }
        self
    }

    /// Amount of a resource. Non-basic resources are always 0.
    #[must_use]
    pub fn get(&self, resource: ResourceType) -> i32 {
        match resource {
            ResourceType::Credits => self.credits,
            ResourceType::Steel => self.steel,
            ResourceType::Titanium => self.titanium,
            ResourceType::Plants => self.plants,
            ResourceType::Energy => self.energy,
            ResourceType::Heat => self.heat,
            _ => 0,
        }
    }

    /// Add `delta` to a basic resource.
    ///
    /// Returns `false` (and changes nothing) for non-basic resources.
    pub fn add(&mut self, resource: ResourceType, delta: i32) -> bool {
        match self.slot_mut(resource) {
            Some(slot) => {
                *slot = slot.saturating_add(delta);
                true
            }
            None => false,
        }
    }

    /// True when every amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        ResourceType::BASIC.iter().all(|&r| self.get(r) == 0)
    }

    fn slot_mut(&mut self, resource: ResourceType) -> Option<&mut i32> {
        match resource {
            ResourceType::Credits => Some(&mut self.credits),
            ResourceType::Steel => Some(&mut self.steel),
            ResourceType::Titanium => Some(&mut self.titanium),
            ResourceType::Plants => Some(&mut self.plants),
            ResourceType::Energy => Some(&mut self.energy),
            ResourceType::Heat => Some(&mut self.heat),
            _ => None,
        }
    }
}
