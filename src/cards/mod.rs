//! Card system: definitions, behaviors, selectors and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `Card`: Static card data (type, tags, cost, behaviors)
//! - `CardBehavior`: Declarative trigger → output description
//! - `Output` / `OutputKind`: What a behavior does
//! - `Selector`: Which cards or standard projects an output applies to
//! - `CardRegistry`: Card definition lookup

pub mod behavior;
pub mod definition;
pub mod registry;
pub mod selector;

pub use behavior::{
    CardBehavior, Choice, Condition, Output, OutputKind, OutputTarget, TileKind, Trigger,
    TriggerKind, TriggerType,
};
pub use definition::{Card, CardId, CardTag, CardType, Requirement, Tags};
pub use registry::CardRegistry;
pub use selector::{CostRange, Selector, StandardProject};
