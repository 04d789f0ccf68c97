use super::*;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).expect("valid day")
}

#[test]
fn first_grade_starts_the_streak_at_one() {
    let book = StatsBook::new();
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(1));

    assert_eq!(book.streak("alice"), (1, Some(day(1))));
}

#[test]
fn repeated_grades_on_one_day_bump_streak_once() {
    let book = StatsBook::new();
    for _ in 0..5 {
        book.record_grade("alice", "Biology", GradeOutcome::Incorrect, day(1));
    }

    let summary = book.today_summary("alice");
    assert_eq!(summary.incorrect, 5);
    assert_eq!(summary.total, 5);
    assert_eq!(book.streak("alice"), (1, Some(day(1))));
}

#[test]
fn each_distinct_day_extends_the_streak() {
    let book = StatsBook::new();
    for d in 1..=4 {
        book.record_grade("alice", "Biology", GradeOutcome::Correct, day(d));
    }

    assert_eq!(book.streak("alice"), (4, Some(day(4))));
}

#[test]
fn a_gap_between_active_days_still_extends_by_one() {
    let book = StatsBook::new();
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(1));
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(20));

    assert_eq!(book.streak("alice"), (2, Some(day(20))));
}

#[test]
fn accuracy_rounds_to_the_nearest_percent() {
    let book = StatsBook::new();
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(1));
    book.record_grade("alice", "Biology", GradeOutcome::Incorrect, day(1));
    book.record_grade("alice", "Biology", GradeOutcome::Incorrect, day(1));
    assert_eq!(book.today_summary("alice").accuracy_percent, 33);

    book.record_grade("bob", "Biology", GradeOutcome::Correct, day(1));
    book.record_grade("bob", "Biology", GradeOutcome::Correct, day(1));
    book.record_grade("bob", "Biology", GradeOutcome::Incorrect, day(1));
    assert_eq!(book.today_summary("bob").accuracy_percent, 67);
}

#[test]
fn unknown_user_reads_as_empty() {
    let book = StatsBook::new();

    let summary = book.today_summary("nobody");
    assert_eq!(summary, TodaySummary::default());
    assert_eq!(summary.accuracy_percent, 0);
    assert_eq!(book.streak("nobody"), (0, None));
    assert!(book.per_deck_totals("nobody").is_empty());
}

#[test]
fn per_deck_totals_keep_first_grade_order() {
    let book = StatsBook::new();
    book.record_grade("alice", "Chemistry", GradeOutcome::Correct, day(1));
    book.record_grade("alice", "Biology", GradeOutcome::Incorrect, day(1));
    book.record_grade("alice", "Chemistry", GradeOutcome::Correct, day(1));

    let totals = book.per_deck_totals("alice");
    assert_eq!(totals.len(), 2);
    assert_eq!((totals[0].title.as_str(), totals[0].count), ("Chemistry", 2));
    assert_eq!((totals[1].title.as_str(), totals[1].count), ("Biology", 1));
}

#[test]
fn tally_accumulates_across_day_boundaries() {
    let book = StatsBook::new();
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(1));
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(2));

    // Only the streak observes the date change; the tally keeps growing.
    let view = book.view("alice");
    assert_eq!(view.today.total, 2);
    assert_eq!(view.streak, 2);
    assert_eq!(view.last_active_date, Some(day(2)));
}

#[test]
fn users_have_independent_profiles() {
    let book = StatsBook::new();
    book.record_grade("alice", "Biology", GradeOutcome::Correct, day(1));

    assert_eq!(book.today_summary("alice").total, 1);
    assert_eq!(book.today_summary("bob").total, 0);
}
