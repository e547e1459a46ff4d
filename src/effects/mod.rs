//! Card effect engine.
//!
//! - `classify`: decides how each behavior of a played card is handled
//! - `apply_outputs` / `pay_inputs`: mutate a working copy of the player
//! - `CardEffectSubscriber`: registers and removes a card's effects
//! - `modifiers`: derives the requirement modifier set from active effects
//!
//! ## Design Philosophy
//!
//! Behaviors are data. Every output kind is matched exhaustively, so adding
//! a kind is a compile error everywhere it needs handling. Modifiers are
//! recomputed from scratch on every change rather than patched; hands are
//! small enough that a full pass is cheap and can't drift.

mod applier;
mod classifier;
pub mod modifiers;
mod subscriber;

pub use applier::{apply_outputs, pay_inputs, AppliedOutputs, MIN_CREDIT_PRODUCTION};
pub use classifier::{classify, BehaviorClass};
pub use modifiers::{calculate, ModifierTarget, RequirementModifier};
pub use subscriber::{CardEffectSubscriber, Subscribed};
