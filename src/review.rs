use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::ReviewError;
use crate::models::{Deck, ReviewSnapshot};

/// Playback position for one user's pass through one deck: the card index
/// and whether its answer is currently shown.
#[derive(Debug, Default)]
pub struct ReviewCursor {
    index: usize,
    revealed: bool,
}

impl ReviewCursor {
    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// Current card plus reveal flag and a 1-based "i/n" progress string.
    ///
    /// A cursor left pointing past the end of a deck that shrank under it is
    /// clamped to the last card before reading.
    pub fn snapshot(&mut self, deck: &Deck) -> Result<ReviewSnapshot, ReviewError> {
        if deck.cards.is_empty() {
            return Err(ReviewError::EmptyDeck);
        }
        if self.index >= deck.cards.len() {
            self.index = deck.cards.len() - 1;
        }
        Ok(ReviewSnapshot {
            card: deck.cards[self.index].clone(),
            revealed: self.revealed,
            position: format!("{}/{}", self.index + 1, deck.cards.len()),
        })
    }

    /// Show the answer side. Idempotent.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// Move to the next card, wrapping at the end of the deck, and hide the
    /// answer again. Reviewing is an endless cycle: grading a card never
    /// removes it from rotation.
    pub fn advance(&mut self, deck_size: usize) -> Result<(), ReviewError> {
        if deck_size == 0 {
            return Err(ReviewError::InvalidDeckSize);
        }
        self.index = (self.index + 1) % deck_size;
        self.revealed = false;
        Ok(())
    }
}

/// Cursor registry keyed by (user id, deck id), created lazily on first
/// access and kept for the life of the process.
///
/// Each entry carries its own lock, so transitions on the same cursor are
/// serialized while distinct (user, deck) pairs never contend.
#[derive(Default)]
pub struct CursorBook {
    inner: RwLock<HashMap<(String, String), Arc<Mutex<ReviewCursor>>>>,
}

impl CursorBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, user_id: &str, deck_id: &str) -> Arc<Mutex<ReviewCursor>> {
        let key = (user_id.to_owned(), deck_id.to_owned());
        {
            let map = self.inner.read().expect("cursor registry poisoned");
            if let Some(cursor) = map.get(&key) {
                return Arc::clone(cursor);
            }
        }
        let mut map = self.inner.write().expect("cursor registry poisoned");
        Arc::clone(map.entry(key).or_default())
    }
}
