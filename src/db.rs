use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteRow, SqliteSynchronous,
};
use sqlx::{ConnectOptions, Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::{Card, Deck, DeckSummary, User};

impl<'r> sqlx::FromRow<'r, SqliteRow> for Card {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let hint: Option<String> = row.try_get("hint")?;
        Ok(Card {
            front: row.try_get("front")?,
            back: row.try_get("back")?,
            hint: hint.filter(|h| !h.is_empty()),
        })
    }
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// SQLite-backed store for users, decks, and cards. The review core never
/// touches this directly; it only sees the `Deck` values loaded here.
#[derive(Clone)]
pub struct Db {
    pool: Pool<Sqlite>,
}

impl Db {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .log_statements(log::LevelFilter::Trace);

        let pool = SqlitePool::connect_with(options).await?;

        let db = Db { pool };
        db.migrate().await?;

        Ok(db)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS decks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                deck_id TEXT NOT NULL REFERENCES decks(id),
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                hint TEXT,
                position INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create an account, or return `None` when the email is already taken.
    /// Passwords are stored as-is; credential hardening is out of scope.
    pub async fn create_user(&self, email: &str, password: &str) -> anyhow::Result<Option<User>> {
        let email = email.trim().to_lowercase();

        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO users (id, email, password, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(password)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(Some(user))
    }

    pub async fn verify_login(&self, email: &str, password: &str) -> anyhow::Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at FROM users WHERE email = ? AND password = ?",
        )
        .bind(&email)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn create_deck(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> anyhow::Result<Deck> {
        let deck = Deck {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
            cards: Vec::new(),
        };
        sqlx::query(
            "INSERT INTO decks (id, user_id, title, description, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&deck.id)
        .bind(user_id)
        .bind(&deck.title)
        .bind(&deck.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Decks owned by the user in creation order, with card counts. `query`
    /// filters on a case-insensitive title substring.
    pub async fn list_decks(
        &self,
        user_id: &str,
        query: Option<&str>,
    ) -> anyhow::Result<Vec<DeckSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.title, d.description,
                   (SELECT count(*) FROM cards c WHERE c.deck_id = d.id) AS card_count
            FROM decks d
            WHERE d.user_id = ?
            ORDER BY d.created_at ASC, d.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut decks = Vec::with_capacity(rows.len());
        for row in rows {
            decks.push(DeckSummary {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                card_count: row.try_get("card_count")?,
            });
        }

        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            decks.retain(|d| d.title.to_lowercase().contains(&q));
        }

        Ok(decks)
    }

    /// A deck with its cards in position order, or `None` when the id does
    /// not exist or belongs to another user.
    pub async fn get_deck(&self, user_id: &str, deck_id: &str) -> anyhow::Result<Option<Deck>> {
        let Some(row) =
            sqlx::query("SELECT id, title, description FROM decks WHERE id = ? AND user_id = ?")
                .bind(deck_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let cards = sqlx::query_as::<_, Card>(
            "SELECT front, back, hint FROM cards WHERE deck_id = ? ORDER BY position ASC, id ASC",
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Deck {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            cards,
        }))
    }

    /// Append a card to the end of the deck.
    pub async fn add_card(
        &self,
        deck_id: &str,
        front: &str,
        back: &str,
        hint: Option<&str>,
    ) -> anyhow::Result<Card> {
        let card = Card {
            front: front.trim().to_owned(),
            back: back.trim().to_owned(),
            hint: hint
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_owned),
        };

        let mut tx = self.pool.begin().await?;
        let position: i64 =
            sqlx::query_scalar("SELECT coalesce(max(position) + 1, 0) FROM cards WHERE deck_id = ?")
                .bind(deck_id)
                .fetch_one(&mut *tx)
                .await?;
        sqlx::query("INSERT INTO cards (deck_id, front, back, hint, position) VALUES (?, ?, ?, ?, ?)")
            .bind(deck_id)
            .bind(&card.front)
            .bind(&card.back)
            .bind(card.hint.as_deref())
            .bind(position)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(card)
    }

    /// Edit the card at the given 0-based position in the deck, or return
    /// `None` when the position is out of range.
    pub async fn update_card(
        &self,
        deck_id: &str,
        index: usize,
        front: &str,
        back: &str,
        hint: Option<&str>,
    ) -> anyhow::Result<Option<Card>> {
        let card = Card {
            front: front.trim().to_owned(),
            back: back.trim().to_owned(),
            hint: hint
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_owned),
        };

        let mut tx = self.pool.begin().await?;
        let card_id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM cards WHERE deck_id = ? ORDER BY position ASC, id ASC LIMIT 1 OFFSET ?",
        )
        .bind(deck_id)
        .bind(index as i64)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(card_id) = card_id else {
            return Ok(None);
        };
        sqlx::query("UPDATE cards SET front = ?, back = ?, hint = ? WHERE id = ?")
            .bind(&card.front)
            .bind(&card.back)
            .bind(card.hint.as_deref())
            .bind(card_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(card))
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod db_tests;
