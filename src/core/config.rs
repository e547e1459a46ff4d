//! Engine configuration.
//!
//! Servers build one `EngineConfig` at startup and hand it to every game
//! session. The defaults follow the printed rules; variants and test setups
//! override individual values with the `with_*` builders.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::StandardProject;

/// Payment conversion rates and standard project prices.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::StandardProject;
/// use rust_terraform::core::EngineConfig;
///
/// let config = EngineConfig::default().with_titanium_value(4);
/// assert_eq!(config.titanium_value, 4);
/// assert_eq!(config.project_cost(StandardProject::City), 25);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Credits each steel is worth when paying for a building card.
    pub steel_value: i32,

    /// Credits each titanium is worth when paying for a space card.
    pub titanium_value: i32,

    /// Base price of each standard project, in the project's own resource.
    pub standard_project_costs: FxHashMap<StandardProject, i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let standard_project_costs = [
            (StandardProject::SellPatents, 0),
            (StandardProject::PowerPlant, 11),
            (StandardProject::Asteroid, 14),
            (StandardProject::Aquifer, 18),
            (StandardProject::Greenery, 23),
            (StandardProject::City, 25),
            (StandardProject::ConvertPlantsToGreenery, 8),
            (StandardProject::ConvertHeatToTemperature, 8),
        ]
        .into_iter()
        .collect();

        Self {
            steel_value: 2,
            titanium_value: 3,
            standard_project_costs,
        }
    }
}

impl EngineConfig {
    /// Set the steel conversion rate (builder pattern).
    #[must_use]
    pub fn with_steel_value(mut self, value: i32) -> Self {
        self.steel_value = value;
        self
    }

    /// Set the titanium conversion rate (builder pattern).
    #[must_use]
    pub fn with_titanium_value(mut self, value: i32) -> Self {
        self.titanium_value = value;
        self
    }

    /// Override a standard project's price (builder pattern).
    #[must_use]
    pub fn with_project_cost(mut self, project: StandardProject, cost: i32) -> Self {
        self.standard_project_costs.insert(project, cost);
        self
    }

    /// Base price of a standard project. Unlisted projects are free.
    #[must_use]
    pub fn project_cost(&self, project: StandardProject) -> i32 {
        self.standard_project_costs.get(&project).copied().unwrap_or(0)
    }
}
