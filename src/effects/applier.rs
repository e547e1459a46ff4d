//! Output application.
//!
//! Turns behavior outputs into changes on a working copy of the player.
//! Runs inside `PlayerRepository::update_player`, so an error anywhere
//! discards every change made so far.
//!
//! Outputs that touch game-wide state (temperature, oxygen, oceans) are not
//! applied here: they are collected in [`AppliedOutputs`] and raised by the
//! session once the player write has committed.

use smallvec::SmallVec;

use crate::cards::{CardId, Output, OutputKind};
use crate::core::{EngineError, GlobalParameter, Player, ResourceType, Result};

/// Lowest credit production a player can drop to.
pub const MIN_CREDIT_PRODUCTION: i32 = -5;

/// Follow-up work left after applying outputs to a player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedOutputs {
    /// Global parameter raises, in output order.
    pub parameter_raises: SmallVec<[(GlobalParameter, i32); 2]>,
}

/// Deduct behavior inputs from the player.
///
/// Stops at the first input the player cannot cover. Earlier deductions stay
/// on the working copy; the store discards it when the error propagates.
pub fn pay_inputs<'a>(
    player: &mut Player,
    source: &CardId,
    inputs: impl IntoIterator<Item = &'a Output>,
) -> Result<()> {
    for input in inputs {
        match input.kind {
            OutputKind::Resource { resource } => {
                let available = player.resources.get(resource);
                if available < input.amount {
                    return Err(EngineError::InsufficientResources {
                        resource,
                        required: input.amount,
                        available,
                    });
                }
                player.resources.add(resource, -input.amount);
            }
            OutputKind::CardStorage { resource } => {
                let available = player.stored_on(source);
                if available < input.amount {
                    return Err(EngineError::InsufficientResources {
                        resource,
                        required: input.amount,
                        available,
                    });
                }
                player.add_to_storage(source, -input.amount);
            }
            OutputKind::Production { resource } => {
                change_production(player, resource, -input.amount)?;
            }
            OutputKind::TerraformRating
            | OutputKind::Temperature
            | OutputKind::Oxygen
            | OutputKind::Ocean
            | OutputKind::TilePlacement { .. }
            | OutputKind::Discount
            | OutputKind::GlobalParameterLenience => {
                return Err(EngineError::validation(source, "input kind cannot be spent"));
            }
        }
    }
    Ok(())
}

/// Apply outputs to the player, collecting follow-up work in `applied`.
pub fn apply_outputs<'a>(
    player: &mut Player,
    source: &CardId,
    outputs: impl IntoIterator<Item = &'a Output>,
    applied: &mut AppliedOutputs,
) -> Result<()> {
    for output in outputs {
        apply_output(player, source, output, applied)?;
    }
    Ok(())
}

fn apply_output(player: &mut Player, source: &CardId, output: &Output, applied: &mut AppliedOutputs) -> Result<()> {
    match output.kind {
        OutputKind::Resource { resource } => {
            let available = player.resources.get(resource);
            match available.checked_add(output.amount) {
                Some(total) if total >= 0 => {}
                Some(_) => {
                    return Err(EngineError::InsufficientResources {
                        resource,
                        required: output.amount.saturating_neg(),
                        available,
                    });
                }
                None => return Err(EngineError::validation(source, format!("{resource} amount out of range"))),
            }
            player.resources.add(resource, output.amount);
        }
        OutputKind::Production { resource } => change_production(player, resource, output.amount)?,
        OutputKind::TerraformRating => player.terraform_rating += output.amount,
        OutputKind::Temperature => applied
            .parameter_raises
            .push((GlobalParameter::Temperature, output.amount)),
        OutputKind::Oxygen => applied.parameter_raises.push((GlobalParameter::Oxygen, output.amount)),
        OutputKind::Ocean => applied.parameter_raises.push((GlobalParameter::Oceans, output.amount)),
        OutputKind::TilePlacement { tile } => {
            for _ in 0..output.amount.max(0) {
                player.enqueue_tile(tile);
            }
        }
        OutputKind::CardStorage { .. } => player.add_to_storage(source, output.amount),
        // Picked up by the modifier recompute.
        OutputKind::Discount | OutputKind::GlobalParameterLenience => {}
    }

    tracing::trace!(
        player_id = %player.id,
        card_id = %source,
        kind = ?output.kind,
        amount = output.amount,
        "output applied"
    );
    Ok(())
}

fn change_production(player: &mut Player, resource: ResourceType, delta: i32) -> Result<()> {
    let floor = if resource == ResourceType::Credits {
        MIN_CREDIT_PRODUCTION
    } else {
        0
    };
    let current = player.production.get(resource);
    if current + delta < floor {
        return Err(EngineError::InsufficientResources {
            resource,
            required: floor - delta,
            available: current,
        });
    }
    player.production.add(resource, delta);
    Ok(())
}
