use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A front/back study unit. `hint` is shown only once the card is revealed;
/// blank hints are normalized to `None` at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub front: String,
    pub back: String,
    pub hint: Option<String>,
}

/// A named, ordered collection of cards belonging to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cards: Vec<Card>,
}

/// Deck listing row: everything the deck index needs without loading cards.
#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub card_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Client-submitted review action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Show,
    Correct,
    Incorrect,
}

impl ReviewAction {
    /// The grading outcome this action records, if it is a grading action.
    pub fn as_outcome(self) -> Option<GradeOutcome> {
        match self {
            ReviewAction::Show => None,
            ReviewAction::Correct => Some(GradeOutcome::Correct),
            ReviewAction::Incorrect => Some(GradeOutcome::Incorrect),
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewAction::Show => "show",
            ReviewAction::Correct => "correct",
            ReviewAction::Incorrect => "incorrect",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    Correct,
    Incorrect,
}

/// What the presentation layer renders after any review transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSnapshot {
    pub card: Card,
    pub revealed: bool,
    /// 1-based progress through the deck, e.g. "3/12".
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    pub correct: u64,
    pub incorrect: u64,
    pub total: u64,
    pub accuracy_percent: u32,
}

/// Lifetime graded-review count for one deck title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckTotal {
    pub title: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsView {
    pub today: TodaySummary,
    pub streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub per_deck_totals: Vec<DeckTotal>,
}
