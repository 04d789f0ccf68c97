use thiserror::Error;

use crate::models::ReviewAction;

/// Failures the review core can surface. All are synchronous rejections that
/// leave cursor and stats state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The deck has no cards; the caller should send the user back to deck
    /// management instead of entering the review machine.
    #[error("deck has no cards to review")]
    EmptyDeck,

    /// The submitted action does not match the current machine state, e.g.
    /// grading a card whose answer has not been shown.
    #[error("action `{0}` is not valid in the current review state")]
    InvalidAction(ReviewAction),

    /// Advancing through a zero-length deck. The caller must rule out empty
    /// decks before a transition, so this is a contract violation rather
    /// than a user-facing condition.
    #[error("cannot advance a review cursor through an empty deck")]
    InvalidDeckSize,
}
