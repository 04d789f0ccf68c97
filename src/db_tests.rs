use sqlx::sqlite::SqlitePoolOptions;

use super::*;

/// One connection only, so every query sees the same in-memory database.
async fn memory_db() -> Db {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("connect options");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("connect");
    let db = Db { pool };
    db.migrate().await.expect("migrate");
    db
}

#[tokio::test]
async fn signup_normalizes_email_and_rejects_duplicates() {
    let db = memory_db().await;

    let user = db
        .create_user("  Alice@School.EDU ", "hunter2")
        .await
        .unwrap()
        .expect("first signup succeeds");
    assert_eq!(user.email, "alice@school.edu");

    let duplicate = db.create_user("alice@school.edu", "other").await.unwrap();
    assert!(duplicate.is_none());
}

#[tokio::test]
async fn login_checks_credentials() {
    let db = memory_db().await;
    db.create_user("alice@school.edu", "hunter2").await.unwrap();

    let user = db
        .verify_login("alice@school.edu", "hunter2")
        .await
        .unwrap();
    assert!(user.is_some());

    assert!(db
        .verify_login("alice@school.edu", "wrong")
        .await
        .unwrap()
        .is_none());
    assert!(db
        .verify_login("nobody@school.edu", "hunter2")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deck_round_trip_keeps_card_order() {
    let db = memory_db().await;
    let user = db
        .create_user("alice@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();

    let deck = db.create_deck(&user.id, "Biology 101", "intro").await.unwrap();
    db.add_card(&deck.id, "first", "1", None).await.unwrap();
    db.add_card(&deck.id, "second", "2", Some("a cue")).await.unwrap();
    db.add_card(&deck.id, "third", "3", None).await.unwrap();

    let loaded = db.get_deck(&user.id, &deck.id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Biology 101");
    let fronts: Vec<_> = loaded.cards.iter().map(|c| c.front.as_str()).collect();
    assert_eq!(fronts, ["first", "second", "third"]);
    assert_eq!(loaded.cards[1].hint.as_deref(), Some("a cue"));

    let summaries = db.list_decks(&user.id, None).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].card_count, 3);
}

#[tokio::test]
async fn deck_listing_filters_by_title_substring() {
    let db = memory_db().await;
    let user = db
        .create_user("alice@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();
    db.create_deck(&user.id, "Biology 101", "").await.unwrap();
    db.create_deck(&user.id, "Organic Chemistry", "").await.unwrap();

    let hits = db.list_decks(&user.id, Some("bio")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Biology 101");

    // Blank queries do not filter.
    assert_eq!(db.list_decks(&user.id, Some("  ")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cards_are_edited_by_position() {
    let db = memory_db().await;
    let user = db
        .create_user("alice@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();
    let deck = db.create_deck(&user.id, "Biology 101", "").await.unwrap();
    db.add_card(&deck.id, "first", "1", None).await.unwrap();
    db.add_card(&deck.id, "second", "2", None).await.unwrap();

    let updated = db
        .update_card(&deck.id, 1, "second edited", "2b", Some("hint"))
        .await
        .unwrap()
        .expect("card exists at position 1");
    assert_eq!(updated.front, "second edited");

    let loaded = db.get_deck(&user.id, &deck.id).await.unwrap().unwrap();
    assert_eq!(loaded.cards[0].front, "first");
    assert_eq!(loaded.cards[1].front, "second edited");
    assert_eq!(loaded.cards[1].hint.as_deref(), Some("hint"));

    let missing = db
        .update_card(&deck.id, 5, "x", "y", None)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn blank_hints_are_stored_as_none() {
    let db = memory_db().await;
    let user = db
        .create_user("alice@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();
    let deck = db.create_deck(&user.id, "Biology 101", "").await.unwrap();

    let card = db.add_card(&deck.id, "front", "back", Some("   ")).await.unwrap();
    assert!(card.hint.is_none());

    let loaded = db.get_deck(&user.id, &deck.id).await.unwrap().unwrap();
    assert!(loaded.cards[0].hint.is_none());
}

#[tokio::test]
async fn decks_are_scoped_to_their_owner() {
    let db = memory_db().await;
    let alice = db
        .create_user("alice@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();
    let bob = db
        .create_user("bob@school.edu", "pw")
        .await
        .unwrap()
        .unwrap();
    let deck = db.create_deck(&alice.id, "Biology 101", "").await.unwrap();

    assert!(db.get_deck(&bob.id, &deck.id).await.unwrap().is_none());
    assert!(db.list_decks(&bob.id, None).await.unwrap().is_empty());
}
