//! Game-level state: game identity and global parameters.
//!
//! Player state lives in the player store (`crate::store`); this module only
//! holds what belongs to the game as a whole.

use serde::{Deserialize, Serialize};

/// Identifier of one game (one independent table).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub String);

impl GameId {
    /// Create a new game ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The three terraforming parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalParameter {
    Temperature,
    Oxygen,
    Oceans,
}

impl GlobalParameter {
    /// Starting value.
    #[must_use]
    pub const fn min(self) -> i32 {
        match self {
            GlobalParameter::Temperature => -30,
            GlobalParameter::Oxygen => 0,
            GlobalParameter::Oceans => 0,
        }
    }

    /// Terraformed value; raising stops here.
    #[must_use]
    pub const fn max(self) -> i32 {
        match self {
            GlobalParameter::Temperature => 8,
            GlobalParameter::Oxygen => 14,
            GlobalParameter::Oceans => 9,
        }
    }

    /// Amount one step moves the parameter.
    #[must_use]
    pub const fn step(self) -> i32 {
        match self {
            GlobalParameter::Temperature => 2,
            GlobalParameter::Oxygen | GlobalParameter::Oceans => 1,
        }
    }
}

/// Old and new value of a parameter after a raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterChange {
    pub parameter: GlobalParameter,
    pub old_value: i32,
    pub new_value: i32,
}

impl ParameterChange {
    /// Number of whole steps taken.
    #[must_use]
    pub fn steps(&self) -> i32 {
        (self.new_value - self.old_value) / self.parameter.step()
    }
}

/// Current global parameter values of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParameters {
    pub temperature: i32,
    pub oxygen: i32,
    pub oceans: i32,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            temperature: GlobalParameter::Temperature.min(),
            oxygen: GlobalParameter::Oxygen.min(),
            oceans: GlobalParameter::Oceans.min(),
        }
    }
}

impl GlobalParameters {
    /// Current value of a parameter.
    #[must_use]
    pub fn get(&self, parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => self.temperature,
            GlobalParameter::Oxygen => self.oxygen,
            GlobalParameter::Oceans => self.oceans,
        }
    }

    /// Raise a parameter by `steps`, clamped to its maximum.
    ///
    /// Returns `None` when the value did not move (already maxed, or
    /// `steps <= 0`).
    pub fn raise(&mut self, parameter: GlobalParameter, steps: i32) -> Option<ParameterChange> {
        if steps <= 0 {
            return None;
        }

        let old_value = self.get(parameter);
        let new_value = (old_value + steps * parameter.step()).min(parameter.max());
        if new_value == old_value {
            return None;
        }

        match parameter {
            GlobalParameter::Temperature => self.temperature = new_value,
            GlobalParameter::Oxygen => self.oxygen = new_value,
            GlobalParameter::Oceans => self.oceans = new_value,
        }

        Some(ParameterChange {
            parameter,
            old_value,
            new_value,
        })
    }
}
