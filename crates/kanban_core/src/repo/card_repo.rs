//! Card store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide point reads, point writes, the per-status max aggregate and one
//!   transaction primitive over the `cards` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - `update_content` never touches status/order; `update_placement` never
//!   touches title/description.
//! - `updated_at` is refreshed on every mutation and never precedes
//!   `created_at`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::card::{from_epoch_millis, Card, CardId, CardStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Params, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CARD_COLUMNS: &str = "id, title, description, status, card_order, created_at, updated_at";

const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "description",
    "status",
    "card_order",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Card store error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A write inside a batch referenced a card that does not exist.
    NotFound(CardId),
    /// Persisted data cannot be converted to a valid card.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "card repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "card repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "card repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for cards.
///
/// Implementations own persisted card state exclusively; callers hold card
/// values only for the duration of one request.
pub trait CardStore {
    /// Lists every card, newest `created_at` first.
    fn list_cards(&self) -> RepoResult<Vec<Card>>;
    /// Loads one card by id.
    fn get_card(&self, id: &str) -> RepoResult<Option<Card>>;
    /// Returns the highest order inside one status partition.
    fn max_order(&self, status: CardStatus) -> RepoResult<Option<i64>>;
    /// Inserts one new card as-is.
    fn insert_card(&self, card: &Card) -> RepoResult<()>;
    /// Replaces title and description. Returns `None` when `id` is unknown.
    fn update_content(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Card>>;
    /// Replaces status and order. Returns `None` when `id` is unknown.
    fn update_placement(
        &self,
        id: &str,
        status: CardStatus,
        order: i64,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Card>>;
    /// Deletes one card permanently and returns its prior state.
    fn delete_card(&self, id: &str) -> RepoResult<Option<Card>>;
    /// Runs `f` inside one all-or-nothing transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back every write made through
    /// this store when it returns `Err`.
    fn atomically<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>;
}

/// SQLite-backed card store.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_card_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CardStore for SqliteCardRepository<'_> {
    fn list_cards(&self) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS}
             FROM cards
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn get_card(&self, id: &str) -> RepoResult<Option<Card>> {
        query_optional_card(
            self.conn,
            &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1;"),
            [id],
        )
    }

    fn max_order(&self, status: CardStatus) -> RepoResult<Option<i64>> {
        let max = self.conn.query_row(
            "SELECT MAX(card_order)
             FROM cards
             WHERE status = ?1;",
            [status.as_str()],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(max)
    }

    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO cards (
                id,
                title,
                description,
                status,
                card_order,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                card.id.as_str(),
                card.title.as_str(),
                card.description.as_deref(),
                card.status.as_str(),
                card.order,
                card.created_at.timestamp_millis(),
                card.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn update_content(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Card>> {
        query_optional_card(
            self.conn,
            &format!(
                "UPDATE cards
                 SET title = ?2,
                     description = ?3,
                     updated_at = MAX(?4, created_at)
                 WHERE id = ?1
                 RETURNING {CARD_COLUMNS};"
            ),
            params![id, title, description, now.timestamp_millis()],
        )
    }

    fn update_placement(
        &self,
        id: &str,
        status: CardStatus,
        order: i64,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Card>> {
        query_optional_card(
            self.conn,
            &format!(
                "UPDATE cards
                 SET status = ?2,
                     card_order = ?3,
                     updated_at = MAX(?4, created_at)
                 WHERE id = ?1
                 RETURNING {CARD_COLUMNS};"
            ),
            params![id, status.as_str(), order, now.timestamp_millis()],
        )
    }

    fn delete_card(&self, id: &str) -> RepoResult<Option<Card>> {
        query_optional_card(
            self.conn,
            &format!("DELETE FROM cards WHERE id = ?1 RETURNING {CARD_COLUMNS};"),
            [id],
        )
    }

    fn atomically<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // Dropping `tx` on the error path rolls the whole batch back.
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn query_optional_card<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Option<Card>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_card_row(row)?));
    }
    Ok(None)
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let status_text: String = row.get("status")?;
    let status = CardStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid card status `{status_text}` in cards.status"))
    })?;

    let order: i64 = row.get("card_order")?;
    if order < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid order `{order}` in cards.card_order"
        )));
    }

    Ok(Card {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        order,
        created_at: parse_timestamp(row.get("created_at")?, "cards.created_at")?,
        updated_at: parse_timestamp(row.get("updated_at")?, "cards.updated_at")?,
    })
}

fn parse_timestamp(value: i64, column: &'static str) -> RepoResult<DateTime<Utc>> {
    from_epoch_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn ensure_card_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "cards")? {
        return Err(RepoError::MissingRequiredTable("cards"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "cards", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "cards",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
