//! Engine error types.
//!
//! Every fallible engine call returns [`Result`]. The variants group into
//! three families callers care about:
//!
//! - **Not found**: unknown game, player or card.
//! - **Validation**: malformed card data or an illegal request
//!   (bad payment, missing resources, duplicate subscription).
//! - **Store write**: the player store refused a write.
//!
//! Event handler failures never surface here; the bus logs and swallows them.

use thiserror::Error;

use crate::cards::CardId;

use super::player::PlayerId;
use super::resources::ResourceType;
use super::state::GameId;

/// Errors surfaced by the effect engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("player {player} not found in game {game}")]
    PlayerNotFound { game: GameId, player: PlayerId },

    #[error("card {0} not found")]
    CardNotFound(CardId),

    #[error("invalid card data for {card}: {reason}")]
    Validation { card: CardId, reason: String },

    #[error("player store write failed: {0}")]
    StoreWrite(String),

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResources {
        resource: ResourceType,
        required: i32,
        available: i32,
    },

    #[error("payment insufficient: costs {required}, payment provides {provided}")]
    InsufficientPayment { required: i32, provided: i32 },

    #[error("invalid payment: {0}")]
    InvalidPayment(String),

    #[error("invalid placement bonus: {0}")]
    InvalidBonus(String),
}

impl EngineError {
    /// Build a validation error for a card.
    pub fn validation(card: &CardId, reason: impl Into<String>) -> Self {
        Self::Validation {
            card: card.clone(),
            reason: reason.into(),
        }
    }

    /// True for unknown game, player or card.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GameNotFound(_) | Self::PlayerNotFound { .. } | Self::CardNotFound(_)
        )
    }

    /// True for malformed data and rejected requests.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InsufficientResources { .. }
                | Self::InsufficientPayment { .. }
                | Self::InvalidPayment(_)
                | Self::InvalidBonus(_)
        )
    }
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        let game = EngineError::GameNotFound(GameId::new("g1"));
        let player = EngineError::PlayerNotFound {
            game: GameId::new("g1"),
            player: PlayerId::new("p1"),
        };
        let card = EngineError::CardNotFound(CardId::new("001"));

        assert!(game.is_not_found());
        assert!(player.is_not_found());
        assert!(card.is_not_found());
        assert!(!EngineError::StoreWrite("disk".into()).is_not_found());
    }

    #[test]
    fn test_display() {
        let err = EngineError::InsufficientPayment {
            required: 33,
            provided: 32,
        };
        assert_eq!(
            err.to_string(),
            "payment insufficient: costs 33, payment provides 32"
        );

        let err = EngineError::validation(&CardId::new("042"), "choices need 2 options");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid card data for 042: choices need 2 options");
    }
}
