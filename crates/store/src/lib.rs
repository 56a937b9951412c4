use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use rusqlite::{Connection, Row, params};
use screentime_core::{JobRecord, UsageRecord, UserRecord};

pub const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
pub const MIGRATION_0002: &str = include_str!("../migrations/0002_seed_collections.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_seed_collections", MIGRATION_0002),
];

/// Collection names the store is provisioned with.
pub const USAGE_COLLECTION: &str = "screentime";
pub const JOBS_COLLECTION: &str = "backgroundjobs";
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Resolved handle for a provisioned collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (_name, sql) in MIGRATIONS {
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Looks a collection up by name. An unknown name signals a
    /// provisioning fault, not a per-record one.
    pub fn resolve_collection(&self, name: &str) -> Result<Collection> {
        self.conn
            .query_row(
                "SELECT name FROM collection WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|name| Collection { name })
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Exact-equality filter on (user, hour), capped at `limit` rows.
    /// Logically at most one row matches; the cap is a sanity bound.
    pub fn find_usage_records(
        &self,
        user: &str,
        hour: &str,
        limit: u32,
    ) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user, hour, seconds, created_at, updated_at
            FROM usage_record
            WHERE user = ?1 AND hour = ?2
            LIMIT ?3
            "#,
        )?;
        let rows = stmt
            .query_map(params![user, hour, limit], row_to_usage_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn create_usage_record(&self, user: &str, hour: &str, seconds: u64) -> Result<UsageRecord> {
        let now = now_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO usage_record (user, hour, seconds, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![user, hour, seconds as i64, now],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(UsageRecord {
            id,
            user: user.to_string(),
            hour: hour.to_string(),
            seconds,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Overwrites the stored seconds for an existing row.
    pub fn save_usage_record(&self, record: &UsageRecord) -> Result<()> {
        let now = now_rfc3339();
        self.conn.execute(
            "UPDATE usage_record SET seconds = ?1, updated_at = ?2 WHERE id = ?3",
            params![record.seconds as i64, now, record.id],
        )?;
        Ok(())
    }

    /// The full persisted ledger for one user, ordered by hour bucket.
    pub fn list_usage_records(&self, user: &str) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user, hour, seconds, created_at, updated_at
            FROM usage_record
            WHERE user = ?1
            ORDER BY hour ASC, id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![user], row_to_usage_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn append_job_record(&self, user: &str) -> Result<JobRecord> {
        let now = now_rfc3339();
        self.conn.execute(
            "INSERT INTO job_record (user, created_at) VALUES (?1, ?2)",
            params![user, now],
        )?;
        Ok(JobRecord {
            id: self.conn.last_insert_rowid(),
            user: user.to_string(),
            created_at: now,
        })
    }

    pub fn count_job_records(&self, user: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM job_record WHERE user = ?1",
                params![user],
                |row| row.get(0),
            )
            .map_err(StoreError::from)
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        self.conn
            .query_row(
                "SELECT id, username, created_at FROM app_user WHERE id = ?1",
                params![id],
                row_to_user_record,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn create_user(&self, id: &str, username: &str) -> Result<UserRecord> {
        let now = now_rfc3339();
        self.conn.execute(
            "INSERT INTO app_user (id, username, created_at) VALUES (?1, ?2, ?3)",
            params![id, username, now],
        )?;
        Ok(UserRecord {
            id: id.to_string(),
            username: username.to_string(),
            created_at: now,
        })
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_usage_record(row: &Row<'_>) -> std::result::Result<UsageRecord, rusqlite::Error> {
    Ok(UsageRecord {
        id: row.get(0)?,
        user: row.get(1)?,
        hour: row.get(2)?,
        seconds: row.get::<_, i64>(3)? as u64,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_user_record(row: &Row<'_>) -> std::result::Result<UserRecord, rusqlite::Error> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: row.get(2)?,
    })
}
