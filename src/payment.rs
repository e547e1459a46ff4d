//! Payment validation.
//!
//! Consumes the requirement modifier set to price cards and standard
//! projects and to widen global-parameter requirements.
//!
//! ## Effective cost
//!
//! `base + Σ amount` over every modifier whose target is the item being
//! bought (or global) and whose resource set contains the resource paid
//! with, floored at zero. Paying more than the effective cost is accepted;
//! paying less is rejected.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardTag, StandardProject};
use crate::core::{EngineConfig, EngineError, GlobalParameters, ResourceType, Resources, Result};
use crate::effects::RequirementModifier;

/// Resources offered to pay for a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayment {
    pub credits: i32,
    #[serde(default)]
    pub steel: i32,
    #[serde(default)]
    pub titanium: i32,
}

impl CardPayment {
    /// Credits-only payment.
    #[must_use]
    pub fn credits(credits: i32) -> Self {
        Self {
            credits,
            ..Self::default()
        }
    }

    /// Add steel (builder pattern).
    #[must_use]
    pub fn with_steel(mut self, steel: i32) -> Self {
        self.steel = steel;
        self
    }

    /// Add titanium (builder pattern).
    #[must_use]
    pub fn with_titanium(mut self, titanium: i32) -> Self {
        self.titanium = titanium;
        self
    }

    /// Credit value of the payment, or `None` if it overflows.
    #[must_use]
    pub fn total_value(&self, config: &EngineConfig) -> Option<i32> {
        let steel = self.steel.checked_mul(config.steel_value)?;
        let titanium = self.titanium.checked_mul(config.titanium_value)?;
        self.credits.checked_add(steel)?.checked_add(titanium)
    }

    /// Check the player actually holds what is offered.
    pub fn check_available(&self, resources: &Resources) -> Result<()> {
        for (resource, amount) in [
            (ResourceType::Credits, self.credits),
            (ResourceType::Steel, self.steel),
            (ResourceType::Titanium, self.titanium),
        ] {
            let available = resources.get(resource);
            if available < amount {
                return Err(EngineError::InsufficientResources {
                    resource,
                    required: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Deduct the payment from a resource pool.
    pub fn deduct_from(&self, resources: &mut Resources) {
        resources.add(ResourceType::Credits, -self.credits);
        resources.add(ResourceType::Steel, -self.steel);
        resources.add(ResourceType::Titanium, -self.titanium);
    }
}

/// Resource a standard project is priced in.
#[must_use]
pub const fn project_resource(project: StandardProject) -> ResourceType {
    match project {
        StandardProject::ConvertPlantsToGreenery => ResourceType::Plants,
        StandardProject::ConvertHeatToTemperature => ResourceType::Heat,
        StandardProject::SellPatents
        | StandardProject::PowerPlant
        | StandardProject::Asteroid
        | StandardProject::Aquifer
        | StandardProject::Greenery
        | StandardProject::City => ResourceType::Credits,
    }
}

/// Effective credit cost of a card.
#[must_use]
pub fn card_cost<'a>(card: &Card, modifiers: impl IntoIterator<Item = &'a RequirementModifier>) -> i32 {
    let adjustment = modifiers
        .into_iter()
        .filter(|m| m.applies_to_card(&card.id) && m.affects(ResourceType::Credits))
        .fold(0i32, |sum, m| sum.saturating_add(m.amount));
    card.cost.saturating_add(adjustment).max(0)
}

/// Effective cost of a standard project, in its own resource.
#[must_use]
pub fn project_cost<'a>(
    project: StandardProject,
    config: &EngineConfig,
    modifiers: impl IntoIterator<Item = &'a RequirementModifier>,
) -> i32 {
    let resource = project_resource(project);
    let adjustment = modifiers
        .into_iter()
        .filter(|m| m.applies_to_project(project) && m.affects(resource))
        .fold(0i32, |sum, m| sum.saturating_add(m.amount));
    config.project_cost(project).saturating_add(adjustment).max(0)
}

/// Validate a card payment against the effective cost.
///
/// Returns the effective cost on success.
///
/// ## Example
///
/// ```
/// use rust_terraform::cards::{Card, CardId, CardType};
/// use rust_terraform::core::{EngineConfig, ResourceType};
/// use rust_terraform::effects::{ModifierTarget, RequirementModifier};
/// use rust_terraform::payment::{validate_card_payment, CardPayment};
///
/// let card = Card::new(CardId::new("big"), "Big Project", CardType::Automated).with_cost(35);
/// let discount = RequirementModifier {
///     amount: -2,
///     affected_resources: vec![ResourceType::Credits],
///     target: ModifierTarget::Card(CardId::new("big")),
/// };
/// let config = EngineConfig::default();
///
/// assert!(validate_card_payment(&card, &CardPayment::credits(32), [&discount], &config).is_err());
/// assert_eq!(validate_card_payment(&card, &CardPayment::credits(33), [&discount], &config).unwrap(), 33);
/// ```
pub fn validate_card_payment<'a>(
    card: &Card,
    payment: &CardPayment,
    modifiers: impl IntoIterator<Item = &'a RequirementModifier>,
    config: &EngineConfig,
) -> Result<i32> {
    if payment.credits < 0 || payment.steel < 0 || payment.titanium < 0 {
        return Err(EngineError::InvalidPayment("payment amounts cannot be negative".into()));
    }
    if payment.steel > 0 && !card.has_tag(CardTag::Building) {
        return Err(EngineError::InvalidPayment(format!(
            "steel can only pay for building cards; {} has no building tag",
            card.id
        )));
    }
    if payment.titanium > 0 && !card.has_tag(CardTag::Space) {
        return Err(EngineError::InvalidPayment(format!(
            "titanium can only pay for space cards; {} has no space tag",
            card.id
        )));
    }

    let required = card_cost(card, modifiers);
    let provided = payment
        .total_value(config)
        .ok_or_else(|| EngineError::InvalidPayment("payment value out of range".into()))?;
    if provided < required {
        return Err(EngineError::InsufficientPayment { required, provided });
    }
    Ok(required)
}

/// Validate a standard project payment, given in the project's resource.
///
/// Returns the effective cost on success.
pub fn validate_standard_project_payment<'a>(
    project: StandardProject,
    provided: i32,
    modifiers: impl IntoIterator<Item = &'a RequirementModifier>,
    config: &EngineConfig,
) -> Result<i32> {
    if provided < 0 {
        return Err(EngineError::InvalidPayment("payment amounts cannot be negative".into()));
    }
    let required = project_cost(project, config, modifiers);
    if provided < required {
        return Err(EngineError::InsufficientPayment { required, provided });
    }
    Ok(required)
}

/// Requirement lenience, in parameter steps, applicable to a card.
#[must_use]
pub fn global_parameter_lenience<'a>(
    card: &Card,
    modifiers: impl IntoIterator<Item = &'a RequirementModifier>,
) -> i32 {
    modifiers
        .into_iter()
        .filter(|m| m.applies_to_card(&card.id) && m.affects(ResourceType::GlobalParameter))
        .fold(0, |sum: i32, m| sum.saturating_add(m.amount))
}

/// Check a card's global-parameter requirements, widened by lenience.
pub fn check_requirements<'a>(
    card: &Card,
    parameters: &GlobalParameters,
    modifiers: impl IntoIterator<Item = &'a RequirementModifier>,
) -> Result<()> {
    let lenience = global_parameter_lenience(card, modifiers);
    for requirement in &card.requirements {
        let value = parameters.get(requirement.parameter);
        if !requirement.is_met(value, lenience) {
            return Err(EngineError::validation(
                &card.id,
                format!("{:?} requirement not met at {value}", requirement.parameter),
            ));
        }
    }
    Ok(())
}
