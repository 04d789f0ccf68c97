use chrono::NaiveDate;

use crate::error::ReviewError;
use crate::models::{Deck, ReviewAction, ReviewSnapshot, StatsView};
use crate::review::CursorBook;
use crate::stats::StatsBook;

/// Orchestrates one review transition per request against the cursor and
/// stats stores.
///
/// Per (user, deck) pair the machine has two states: prompt (answer hidden,
/// only `show` is valid) and answer (answer shown, only grading is valid).
/// Out-of-state actions are rejected without mutating anything. The per-pair
/// cursor lock is held across the whole transition and stats locking nests
/// inside it, so same-pair requests apply in acceptance order while
/// independent pairs proceed concurrently.
#[derive(Default)]
pub struct Reviewer {
    cursors: CursorBook,
    stats: StatsBook,
}

impl Reviewer {
    pub fn new() -> Self {
        Self {
            cursors: CursorBook::new(),
            stats: StatsBook::new(),
        }
    }

    /// Current position in the deck, creating a fresh cursor at the first
    /// card when the user has never reviewed this deck.
    pub fn start_or_continue(
        &self,
        user_id: &str,
        deck: &Deck,
    ) -> Result<ReviewSnapshot, ReviewError> {
        if deck.cards.is_empty() {
            // No cursor is created for an unreviewable deck.
            return Err(ReviewError::EmptyDeck);
        }
        let cursor = self.cursors.entry(user_id, &deck.id);
        let mut cursor = cursor.lock().expect("review cursor poisoned");
        cursor.snapshot(deck)
    }

    /// Apply one action and return the state to display next.
    pub fn submit(
        &self,
        user_id: &str,
        deck: &Deck,
        action: ReviewAction,
        today: NaiveDate,
    ) -> Result<ReviewSnapshot, ReviewError> {
        if deck.cards.is_empty() {
            return Err(ReviewError::EmptyDeck);
        }
        let cursor = self.cursors.entry(user_id, &deck.id);
        let mut cursor = cursor.lock().expect("review cursor poisoned");
        match action.as_outcome() {
            None => {
                if cursor.revealed() {
                    return Err(ReviewError::InvalidAction(action));
                }
                cursor.reveal();
            }
            Some(outcome) => {
                if !cursor.revealed() {
                    return Err(ReviewError::InvalidAction(action));
                }
                self.stats.record_grade(user_id, &deck.title, outcome, today);
                cursor.advance(deck.cards.len())?;
                log::debug!(
                    "user {} graded {} in deck {}",
                    user_id,
                    action,
                    deck.id
                );
            }
        }
        cursor.snapshot(deck)
    }

    pub fn stats_view(&self, user_id: &str) -> StatsView {
        self.stats.view(user_id)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
