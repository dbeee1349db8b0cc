//! Database connection and account queries.

use crate::{migrations, Account, DatabaseError, DatabaseResult, NewAccount};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::{debug, warn};

/// Database wrapper with account query methods.
pub struct Database {
    conn: Connection,
}

const ACCOUNT_COLUMNS: &str = "id, handle, did, service_url, access_jwt, refresh_jwt, avatar_url, is_active, session_expires_at, created_at, updated_at";

impl Database {
    /// Open a database at the given path, running migrations if needed.
    pub fn open(path: &Path) -> DatabaseResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode and performance optimizations
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let conn = Connection::open_in_memory()?;
        // Note: WAL mode doesn't apply to in-memory databases
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// List all accounts, most recently updated first.
    ///
    /// Timestamps are stored as RFC 3339 text, so the lexical sort is
    /// chronological as long as every writer goes through this type.
    pub fn list_accounts(&self) -> DatabaseResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY updated_at DESC"
        ))?;

        let accounts = stmt
            .query_map([], map_account)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by DID.
    pub fn get_account(&self, did: &str) -> DatabaseResult<Option<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE did = ?1"
        ))?;

        let result = stmt.query_row(params![did], map_account);

        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the active account, if any.
    pub fn get_active_account(&self) -> DatabaseResult<Option<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE is_active = 1 LIMIT 1"
        ))?;

        let result = stmt.query_row([], map_account);

        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or update an account keyed by DID, and make it the only active
    /// account. Both steps run in one transaction so a crash between them can
    /// never leave two active rows.
    pub fn upsert_account(&mut self, account: &NewAccount) -> DatabaseResult<Account> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO accounts (handle, did, service_url, access_jwt, refresh_jwt, avatar_url, is_active, session_expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?8)
             ON CONFLICT(did) DO UPDATE SET
                handle = excluded.handle,
                service_url = excluded.service_url,
                access_jwt = excluded.access_jwt,
                refresh_jwt = excluded.refresh_jwt,
                avatar_url = excluded.avatar_url,
                session_expires_at = excluded.session_expires_at,
                updated_at = excluded.updated_at",
            params![
                account.handle,
                account.did,
                account.service_url,
                account.access_jwt,
                account.refresh_jwt,
                account.avatar_url,
                account.session_expires_at.to_rfc3339(),
                now,
            ],
        )?;

        // Activate this row and deactivate every other in one statement
        tx.execute(
            "UPDATE accounts SET is_active = (did = ?1)",
            params![account.did],
        )?;

        tx.commit()?;
        debug!(did = %account.did, handle = %account.handle, "Account upserted and activated");

        self.get_account(&account.did)?
            .ok_or_else(|| DatabaseError::NotFound("Account not found after upsert".to_string()))
    }

    /// Make the account with the given DID the only active one.
    ///
    /// Returns false without changing anything when no such account exists.
    pub fn set_active_account(&self, did: &str) -> DatabaseResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE did = ?1)",
            params![did],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(false);
        }

        self.conn
            .execute("UPDATE accounts SET is_active = (did = ?1)", params![did])?;
        debug!(did = %did, "Active account switched");
        Ok(true)
    }

    /// Deactivate all accounts. Returns the number of rows that were active.
    pub fn clear_active_flags(&self) -> DatabaseResult<usize> {
        let count = self
            .conn
            .execute("UPDATE accounts SET is_active = 0 WHERE is_active = 1", [])?;
        Ok(count)
    }

    /// Store rotated session tokens for an account.
    ///
    /// Returns false when no account with the given DID exists.
    pub fn update_session_tokens(
        &self,
        did: &str,
        access_jwt: &str,
        refresh_jwt: &str,
        session_expires_at: DateTime<Utc>,
    ) -> DatabaseResult<bool> {
        let count = self.conn.execute(
            "UPDATE accounts
             SET access_jwt = ?2, refresh_jwt = ?3, session_expires_at = ?4, updated_at = ?5
             WHERE did = ?1",
            params![
                did,
                access_jwt,
                refresh_jwt,
                session_expires_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(count > 0)
    }
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        handle: row.get(1)?,
        did: row.get(2)?,
        service_url: row.get(3)?,
        access_jwt: row.get(4)?,
        refresh_jwt: row.get(5)?,
        avatar_url: row.get(6)?,
        is_active: row.get(7)?,
        session_expires_at: parse_datetime(row.get::<_, String>(8)?),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(value = %s, "Unparseable stored timestamp, substituting current time");
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn new_account(did: &str, handle: &str) -> NewAccount {
        NewAccount {
            handle: handle.to_string(),
            did: did.to_string(),
            service_url: "https://bsky.social".to_string(),
            access_jwt: format!("access-{did}"),
            refresh_jwt: format!("refresh-{did}"),
            avatar_url: None,
            session_expires_at: Utc::now() + Duration::hours(2),
        }
    }

    fn active_count(db: &Database) -> i64 {
        db.connection()
            .query_row(
                "SELECT COUNT(*) FROM accounts WHERE is_active = 1",
                [],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn upsert_inserts_and_activates() {
        let mut db = create_test_db();
        let account = db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();

        assert_eq!(account.did, "did:plc:alice");
        assert_eq!(account.handle, "alice.example");
        assert!(account.is_active);
        assert_eq!(active_count(&db), 1);
    }

    #[test]
    fn upsert_updates_existing_row_by_did() {
        let mut db = create_test_db();
        let first = db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();

        let mut updated = new_account("did:plc:alice", "alice.new.example");
        updated.access_jwt = "rotated-access".to_string();
        let second = db.upsert_account(&updated).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.handle, "alice.new.example");
        assert_eq!(second.access_jwt, "rotated-access");
        assert_eq!(db.list_accounts().unwrap().len(), 1);
    }

    #[test]
    fn upsert_deactivates_other_accounts() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();
        db.upsert_account(&new_account("did:plc:bob", "bob.example")).unwrap();

        assert_eq!(active_count(&db), 1);
        let active = db.get_active_account().unwrap().unwrap();
        assert_eq!(active.did, "did:plc:bob");
        assert!(!db.get_account("did:plc:alice").unwrap().unwrap().is_active);
    }

    #[test]
    fn at_most_one_active_after_any_sequence() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:a", "a.example")).unwrap();
        db.upsert_account(&new_account("did:plc:b", "b.example")).unwrap();
        db.set_active_account("did:plc:a").unwrap();
        db.upsert_account(&new_account("did:plc:c", "c.example")).unwrap();
        db.set_active_account("did:plc:b").unwrap();
        db.clear_active_flags().unwrap();
        db.set_active_account("did:plc:c").unwrap();

        assert_eq!(active_count(&db), 1);
        assert_eq!(db.get_active_account().unwrap().unwrap().did, "did:plc:c");
    }

    #[test]
    fn set_active_unknown_did_returns_false_and_preserves_state() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();

        assert!(!db.set_active_account("did:plc:nobody").unwrap());
        assert_eq!(db.get_active_account().unwrap().unwrap().did, "did:plc:alice");
    }

    #[test]
    fn clear_active_flags_returns_cleared_count() {
        let mut db = create_test_db();
        assert_eq!(db.clear_active_flags().unwrap(), 0);

        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();
        assert_eq!(db.clear_active_flags().unwrap(), 1);
        assert!(db.get_active_account().unwrap().is_none());

        // idempotent
        assert_eq!(db.clear_active_flags().unwrap(), 0);
    }

    #[test]
    fn update_session_tokens_rotates_credentials() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();

        let expires = Utc::now() + Duration::hours(2);
        let updated = db
            .update_session_tokens("did:plc:alice", "new-access", "new-refresh", expires)
            .unwrap();
        assert!(updated);

        let account = db.get_account("did:plc:alice").unwrap().unwrap();
        assert_eq!(account.access_jwt, "new-access");
        assert_eq!(account.refresh_jwt, "new-refresh");
        // RFC3339 round-trip keeps sub-second precision
        assert_eq!(account.session_expires_at.timestamp(), expires.timestamp());
    }

    #[test]
    fn update_session_tokens_unknown_did_returns_false() {
        let db = create_test_db();
        let updated = db
            .update_session_tokens("did:plc:ghost", "a", "r", Utc::now())
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn get_account_missing_returns_none() {
        let db = create_test_db();
        assert!(db.get_account("did:plc:nobody").unwrap().is_none());
        assert!(db.get_active_account().unwrap().is_none());
    }

    #[test]
    fn list_accounts_orders_by_updated_at_desc() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();
        db.upsert_account(&new_account("did:plc:bob", "bob.example")).unwrap();

        // Touch alice so she sorts first. The bump must be RFC 3339 like
        // every other stored timestamp or the lexical sort breaks.
        db.connection()
            .execute(
                "UPDATE accounts SET updated_at = ?1 WHERE did = 'did:plc:alice'",
                params![(Utc::now() + Duration::hours(1)).to_rfc3339()],
            )
            .unwrap();

        let accounts = db.list_accounts().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].did, "did:plc:alice");
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_now() {
        let mut db = create_test_db();
        db.upsert_account(&new_account("did:plc:alice", "alice.example")).unwrap();
        db.connection()
            .execute(
                "UPDATE accounts SET session_expires_at = 'garbage' WHERE did = 'did:plc:alice'",
                [],
            )
            .unwrap();

        let account = db.get_account("did:plc:alice").unwrap().unwrap();
        let drift = (account.session_expires_at - Utc::now()).num_seconds().abs();
        assert!(drift < 5);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("soramoyou.db");
        let db = Database::open(&path).unwrap();

        assert!(path.exists());
        assert!(db.list_accounts().unwrap().is_empty());
    }
}
