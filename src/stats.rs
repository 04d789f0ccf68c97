use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::NaiveDate;

use crate::models::{DeckTotal, GradeOutcome, StatsView, TodaySummary};

/// Lifetime study analytics for one user.
///
/// The outcome tally backing the "today" summary intentionally never resets
/// at a day boundary; only `streak`/`last_active` observe calendar dates.
#[derive(Debug, Default)]
pub struct StatsProfile {
    correct: u64,
    incorrect: u64,
    /// Graded-review totals keyed by deck title, in first-grade order.
    /// Renaming a deck does not merge its history.
    per_deck: Vec<DeckTotal>,
    /// Distinct calendar days with at least one grading action.
    streak: u32,
    last_active: Option<NaiveDate>,
}

impl StatsProfile {
    fn record(&mut self, deck_title: &str, outcome: GradeOutcome, today: NaiveDate) {
        if self.last_active != Some(today) {
            self.streak = if self.last_active.is_none() {
                1
            } else {
                self.streak + 1
            };
            self.last_active = Some(today);
        }
        match outcome {
            GradeOutcome::Correct => self.correct += 1,
            GradeOutcome::Incorrect => self.incorrect += 1,
        }
        match self.per_deck.iter_mut().find(|t| t.title == deck_title) {
            Some(total) => total.count += 1,
            None => self.per_deck.push(DeckTotal {
                title: deck_title.to_owned(),
                count: 1,
            }),
        }
    }

    fn today_summary(&self) -> TodaySummary {
        let total = self.correct + self.incorrect;
        let accuracy_percent = if total > 0 {
            (self.correct as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };
        TodaySummary {
            correct: self.correct,
            incorrect: self.incorrect,
            total,
            accuracy_percent,
        }
    }

    fn view(&self) -> StatsView {
        StatsView {
            today: self.today_summary(),
            streak: self.streak,
            last_active_date: self.last_active,
            per_deck_totals: self.per_deck.clone(),
        }
    }
}

/// Per-user analytics registry, created lazily on the first grading action.
#[derive(Default)]
pub struct StatsBook {
    inner: RwLock<HashMap<String, Arc<Mutex<StatsProfile>>>>,
}

impl StatsBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn profile(&self, user_id: &str) -> Arc<Mutex<StatsProfile>> {
        {
            let map = self.inner.read().expect("stats registry poisoned");
            if let Some(profile) = map.get(user_id) {
                return Arc::clone(profile);
            }
        }
        let mut map = self.inner.write().expect("stats registry poisoned");
        Arc::clone(map.entry(user_id.to_owned()).or_default())
    }

    /// Record one grading action. `today` must come from the server clock at
    /// the moment of the call, never from the client.
    pub fn record_grade(
        &self,
        user_id: &str,
        deck_title: &str,
        outcome: GradeOutcome,
        today: NaiveDate,
    ) {
        let profile = self.profile(user_id);
        let mut profile = profile.lock().expect("stats profile poisoned");
        profile.record(deck_title, outcome, today);
    }

    pub fn today_summary(&self, user_id: &str) -> TodaySummary {
        self.read(user_id, StatsProfile::today_summary)
            .unwrap_or_default()
    }

    pub fn streak(&self, user_id: &str) -> (u32, Option<NaiveDate>) {
        self.read(user_id, |p| (p.streak, p.last_active))
            .unwrap_or((0, None))
    }

    pub fn per_deck_totals(&self, user_id: &str) -> Vec<DeckTotal> {
        self.read(user_id, |p| p.per_deck.clone()).unwrap_or_default()
    }

    pub fn view(&self, user_id: &str) -> StatsView {
        self.read(user_id, StatsProfile::view).unwrap_or_default()
    }

    /// Read-only access that does not create a profile for an unknown user.
    fn read<T>(&self, user_id: &str, f: impl FnOnce(&StatsProfile) -> T) -> Option<T> {
        let profile = {
            let map = self.inner.read().expect("stats registry poisoned");
            map.get(user_id).map(Arc::clone)
        }?;
        let profile = profile.lock().expect("stats profile poisoned");
        Some(f(&profile))
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod stats_tests;
