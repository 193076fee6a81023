//! Owner-scoped deck persistence.
//!
//! Decks live under one logical collection per owner,
//! `artifacts/{app_id}/users/{owner_id}/decks`. That path is what shows up
//! in logs and in access-denied errors. In SQLite it maps to the rows of
//! `decks` keyed by `(app_id, owner_id)`, with cards in `cards`.
//!
//! Access-denied failures are handed to the injected [`ErrorReporter`] and
//! also returned to the caller.

use super::db::{from_timestamp, now, to_timestamp};
use super::users::get_user;
use crate::models::{Deck, DeckSet, Flashcard, StoredDeck};
use log::{error, info};
use rusqlite::{Connection, ErrorCode, params};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    List,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::Create => write!(f, "create"),
            StoreOperation::List => write!(f, "list"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing or insufficient permissions: cannot {operation} at '{path}'")]
    AccessDenied {
        path: String,
        operation: StoreOperation,
    },

    #[error("Deck name cannot be empty.")]
    EmptyName,

    #[error("A deck needs at least one card with both a question and an answer.")]
    EmptyDeck,

    #[error("Deck store is unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied { .. })
    }
}

/// Receives access-denied failures from a deck store.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &StoreError);
}

impl<F> ErrorReporter for F
where
    F: Fn(&StoreError) + Send + Sync,
{
    fn report(&self, error: &StoreError) {
        self(error)
    }
}

/// Durable, owner-scoped storage of decks.
pub trait DeckStore {
    /// Persists a new deck for `owner_id`. The store assigns the id and
    /// creation time.
    fn add_deck(
        &self,
        owner_id: &str,
        name: &str,
        cards: Vec<Flashcard>,
    ) -> Result<StoredDeck, StoreError>;

    /// All decks of `owner_id`, oldest first.
    fn decks_for_owner(&self, owner_id: &str) -> Result<DeckSet, StoreError>;

    /// Changes whenever a write succeeds.
    fn revision(&self) -> u64;
}

pub struct SqliteDeckStore {
    conn: Arc<Mutex<Connection>>,
    app_id: String,
    reporter: Arc<dyn ErrorReporter>,
    revision: AtomicU64,
}

impl SqliteDeckStore {
    pub fn new(conn: Arc<Mutex<Connection>>, app_id: &str, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            conn,
            app_id: app_id.to_string(),
            reporter,
            revision: AtomicU64::new(0),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Logical location of an owner's decks
    pub fn collection_path(&self, owner_id: &str) -> String {
        format!("artifacts/{}/users/{}/decks", self.app_id, owner_id)
    }

    fn insert_deck(
        &self,
        owner_id: &str,
        name: &str,
        cards: Vec<Flashcard>,
    ) -> Result<StoredDeck, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if cards.is_empty() || cards.iter().any(|card| !card.is_valid()) {
            return Err(StoreError::EmptyDeck);
        }

        let path = self.collection_path(owner_id);
        let sql_err = |err: rusqlite::Error| classify(err, &path, StoreOperation::Create);

        let mut conn = self.conn.lock().map_err(|_| StoreError::Unavailable)?;
        if get_user(&conn, owner_id).map_err(sql_err)?.is_none() {
            return Err(access_denied(&path, StoreOperation::Create));
        }

        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let tx = conn.transaction().map_err(sql_err)?;
        tx.execute(
            "INSERT INTO decks (id, app_id, owner_id, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, self.app_id, owner_id, name, to_timestamp(created_at)],
        )
        .map_err(sql_err)?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO cards (deck_id, position, question, answer) VALUES (?1, ?2, ?3, ?4)")
                .map_err(sql_err)?;
            for (position, card) in cards.iter().enumerate() {
                stmt.execute(params![id, position as i64, card.question, card.answer])
                    .map_err(sql_err)?;
            }
        }
        tx.commit().map_err(sql_err)?;
        drop(conn);

        self.revision.fetch_add(1, Ordering::SeqCst);
        info!("Saved deck '{}' ({} cards) to {}", name, cards.len(), path);

        Ok(StoredDeck {
            id,
            owner_id: owner_id.to_string(),
            created_at,
            deck: Arc::new(Deck {
                name: name.to_string(),
                cards,
            }),
        })
    }

    fn load_decks(&self, owner_id: &str) -> Result<DeckSet, StoreError> {
        let path = self.collection_path(owner_id);
        let sql_err = |err: rusqlite::Error| classify(err, &path, StoreOperation::List);

        let conn = self.conn.lock().map_err(|_| StoreError::Unavailable)?;
        if get_user(&conn, owner_id).map_err(sql_err)?.is_none() {
            return Err(access_denied(&path, StoreOperation::List));
        }

        let mut stmt = conn
            .prepare(
                "SELECT id, name, created_at FROM decks
                 WHERE app_id = ?1 AND owner_id = ?2
                 ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(sql_err)?;
        let rows = stmt
            .query_map(params![self.app_id, owner_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(sql_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_err)?;

        let mut card_stmt = conn
            .prepare("SELECT question, answer FROM cards WHERE deck_id = ?1 ORDER BY position ASC")
            .map_err(sql_err)?;

        let mut decks = Vec::with_capacity(rows.len());
        for (id, name, created_at) in rows {
            let cards = card_stmt
                .query_map(params![id], |row| {
                    Ok(Flashcard {
                        question: row.get(0)?,
                        answer: row.get(1)?,
                    })
                })
                .map_err(sql_err)?
                .collect::<rusqlite::Result<Vec<Flashcard>>>()
                .map_err(sql_err)?;

            decks.push(StoredDeck {
                id,
                owner_id: owner_id.to_string(),
                created_at: from_timestamp(created_at),
                deck: Arc::new(Deck { name, cards }),
            });
        }

        Ok(DeckSet { decks })
    }

    fn report<T>(&self, result: &Result<T, StoreError>) {
        if let Err(err) = result {
            if err.is_access_denied() {
                error!("{}", err);
                self.reporter.report(err);
            }
        }
    }
}

impl DeckStore for SqliteDeckStore {
    fn add_deck(
        &self,
        owner_id: &str,
        name: &str,
        cards: Vec<Flashcard>,
    ) -> Result<StoredDeck, StoreError> {
        let result = self.insert_deck(owner_id, name, cards);
        self.report(&result);
        result
    }

    fn decks_for_owner(&self, owner_id: &str) -> Result<DeckSet, StoreError> {
        let result = self.load_decks(owner_id);
        self.report(&result);
        result
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

fn access_denied(path: &str, operation: StoreOperation) -> StoreError {
    StoreError::AccessDenied {
        path: path.to_string(),
        operation,
    }
}

/// Permission failures from SQLite count as access denied, the rest stay
/// database errors.
fn classify(err: rusqlite::Error, path: &str, operation: StoreOperation) -> StoreError {
    let denied = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, _) if matches!(
            e.code,
            ErrorCode::ReadOnly | ErrorCode::PermissionDenied | ErrorCode::AuthorizationForStatementDenied
        )
    );
    if denied {
        access_denied(path, operation)
    } else {
        StoreError::Database(err)
    }
}

/// Follows the decks of one owner, re-reading them whenever the store has
/// seen a write since the last read.
#[derive(Debug)]
pub struct DeckSubscription {
    owner_id: String,
    seen_revision: Option<u64>,
}

impl DeckSubscription {
    pub fn new(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            seen_revision: None,
        }
    }

    /// Returns a fresh read when something changed, `None` otherwise. The
    /// first poll always reads. A failed read is not retried until the
    /// next write.
    pub fn poll<S>(&mut self, store: &S) -> Option<Result<DeckSet, StoreError>>
    where
        S: DeckStore + ?Sized,
    {
        let revision = store.revision();
        if self.seen_revision == Some(revision) {
            return None;
        }
        self.seen_revision = Some(revision);
        Some(store.decks_for_owner(&self.owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{create_schema, init_database};
    use crate::database::users::sign_in;
    use rusqlite::OpenFlags;
    use tempfile::TempDir;

    struct Fixture {
        store: SqliteDeckStore,
        reported: Arc<Mutex<Vec<String>>>,
        conn: Arc<Mutex<Connection>>,
    }

    fn fixture_with(conn: Connection) -> Fixture {
        let conn = Arc::new(Mutex::new(conn));
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let reporter = move |err: &StoreError| sink.lock().unwrap().push(err.to_string());
        Fixture {
            store: SqliteDeckStore::new(Arc::clone(&conn), "test-app", Arc::new(reporter)),
            reported,
            conn,
        }
    }

    fn fixture() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        fixture_with(conn)
    }

    fn owner(f: &Fixture, name: &str) -> String {
        sign_in(&f.conn.lock().unwrap(), name).unwrap().uid
    }

    fn cards() -> Vec<Flashcard> {
        vec![
            Flashcard::new("What is the capital of France?", "Paris").unwrap(),
            Flashcard::new("Which planet is known as the Red Planet?", "Mars").unwrap(),
            Flashcard::new("2 + 2?", "4").unwrap(),
        ]
    }

    #[test]
    fn test_add_deck_assigns_identity() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        let stored = f.store.add_deck(&uid, "  Trivia ", cards()).unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(stored.owner_id, uid);
        assert_eq!(stored.name(), "Trivia");
        assert_eq!(stored.cards(), cards().as_slice());
    }

    #[test]
    fn test_added_deck_is_listed_in_order() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        let first = f.store.add_deck(&uid, "First", cards()).unwrap();
        let second = f.store.add_deck(&uid, "Second", cards()[..1].to_vec()).unwrap();

        let set = f.store.decks_for_owner(&uid).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.decks[0].id, first.id);
        assert_eq!(set.decks[1].id, second.id);
        assert_eq!(set.decks[0].cards(), cards().as_slice());
        assert_eq!(set.decks[0].created_at, first.created_at);
        assert_eq!(set.find(&second.id).unwrap().name(), "Second");
    }

    #[test]
    fn test_decks_are_scoped_by_owner() {
        let f = fixture();
        let ada = owner(&f, "Ada");
        let alan = owner(&f, "Alan");

        f.store.add_deck(&ada, "Ada's deck", cards()).unwrap();

        assert_eq!(f.store.decks_for_owner(&ada).unwrap().len(), 1);
        assert!(f.store.decks_for_owner(&alan).unwrap().is_empty());
    }

    #[test]
    fn test_decks_are_scoped_by_app_id() {
        let f = fixture();
        let uid = owner(&f, "Ada");
        f.store.add_deck(&uid, "Deck", cards()).unwrap();

        let other = SqliteDeckStore::new(Arc::clone(&f.conn), "other-app", Arc::new(|_: &StoreError| {}));
        assert!(other.decks_for_owner(&uid).unwrap().is_empty());
        assert_eq!(other.collection_path(&uid), format!("artifacts/other-app/users/{}/decks", uid));
    }

    #[test]
    fn test_empty_name_rejected() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        let err = f.store.add_deck(&uid, "   ", cards()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert_eq!(err.to_string(), "Deck name cannot be empty.");
        assert_eq!(f.store.revision(), 0);
    }

    #[test]
    fn test_empty_deck_rejected() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        assert!(matches!(
            f.store.add_deck(&uid, "Nothing", Vec::new()),
            Err(StoreError::EmptyDeck)
        ));

        let blank = vec![Flashcard {
            question: "Q".to_string(),
            answer: "  ".to_string(),
        }];
        assert!(matches!(
            f.store.add_deck(&uid, "Blank", blank),
            Err(StoreError::EmptyDeck)
        ));
    }

    #[test]
    fn test_unknown_owner_is_access_denied_and_reported() {
        let f = fixture();

        let err = f.store.add_deck("stranger", "Deck", cards()).unwrap_err();
        match &err {
            StoreError::AccessDenied { path, operation } => {
                assert_eq!(path, "artifacts/test-app/users/stranger/decks");
                assert_eq!(*operation, StoreOperation::Create);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let reported = f.reported.lock().unwrap();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].contains("cannot create at 'artifacts/test-app/users/stranger/decks'"));
    }

    #[test]
    fn test_list_for_unknown_owner_is_access_denied() {
        let f = fixture();

        let err = f.store.decks_for_owner("stranger").unwrap_err();
        assert!(matches!(
            err,
            StoreError::AccessDenied {
                operation: StoreOperation::List,
                ..
            }
        ));
        assert_eq!(f.reported.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_validation_errors_are_not_reported() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        let _ = f.store.add_deck(&uid, "", cards());
        assert!(f.reported.lock().unwrap().is_empty());
    }

    #[test]
    fn test_read_only_database_is_access_denied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("decks.sqlite3");
        let uid = {
            let conn = init_database(&path).unwrap();
            sign_in(&conn, "Ada").unwrap().uid
        };

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
        let f = fixture_with(conn);

        let err = f.store.add_deck(&uid, "Deck", cards()).unwrap_err();
        assert!(err.is_access_denied());
        assert_eq!(f.reported.lock().unwrap().len(), 1);
        assert!(f.store.decks_for_owner(&uid).unwrap().is_empty());
    }

    #[test]
    fn test_revision_bumps_on_write() {
        let f = fixture();
        let uid = owner(&f, "Ada");

        assert_eq!(f.store.revision(), 0);
        f.store.add_deck(&uid, "Deck", cards()).unwrap();
        assert_eq!(f.store.revision(), 1);
    }

    #[test]
    fn test_subscription_reads_on_change_only() {
        let f = fixture();
        let uid = owner(&f, "Ada");
        let mut subscription = DeckSubscription::new(&uid);

        let initial = subscription.poll(&f.store).unwrap().unwrap();
        assert!(initial.is_empty());
        assert!(subscription.poll(&f.store).is_none());

        let stored = f.store.add_deck(&uid, "Deck", cards()).unwrap();
        let updated = subscription.poll(&f.store).unwrap().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated.decks[0].id, stored.id);
        assert!(subscription.poll(&f.store).is_none());
    }

    #[test]
    fn test_subscription_does_not_retry_failed_read() {
        let f = fixture();
        let mut subscription = DeckSubscription::new("stranger");

        assert!(subscription.poll(&f.store).unwrap().is_err());
        assert!(subscription.poll(&f.store).is_none());
        assert_eq!(f.reported.lock().unwrap().len(), 1);
    }
}
