//! SQLite database module for COM:PASS
//!
//! All persistent state lives in a single SQLite file accessed through
//! Diesel with an r2d2 connection pool. Each domain table has its own
//! module of free functions taking `&mut SqliteConnection`.
//!
//! ## Tables
//!
//! - `users` - accounts (clients and mentors)
//! - `mentor_client_relationships` / `client_data_access_permissions`
//! - `goals` / `tasks` - Plan-Do records
//! - `logs` / `reflections` / `ai_analysis_reports` / `action_plans` - Check-Action records
//! - `mentor_notes` / `data_view_logs` / `notifications` / `chat_messages`

pub mod action_plans;
pub mod chat;
pub mod ddl;
pub mod goals;
pub mod logs;
pub mod models;
pub mod notes;
pub mod notifications;
pub mod permissions;
pub mod reflections;
pub mod relationships;
pub mod reports;
pub mod schema;
pub mod tasks;
pub mod users;
pub mod view_logs;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use tracing::{debug, info};

use crate::types::{CompassError, Result};

pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Deserializer for nullable update fields: `Some(None)` is an explicit JSON
/// null (clear the column), outer `None` via `#[serde(default)]` means the
/// field was absent (leave the column unchanged).
pub(crate) fn nullable_update<'de, D>(
    d: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Option::<String>::deserialize(d).map(Some)
}

/// Pooled SQLite database handle
#[derive(Clone)]
pub struct Db {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Db {
    /// Open or create the database at the given path
    pub fn open(path: &str) -> Result<Self> {
        info!("Opening SQLite database at {}", path);

        let manager = ConnectionManager::<SqliteConnection>::new(path);
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .map_err(|e| CompassError::Database(format!("Failed to build pool: {e}")))?;

        let db = Self { pool };

        {
            let mut conn = db.conn()?;
            // WAL mode for better concurrent read performance
            diesel::sql_query("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
                .execute(&mut conn)
                .ok();
            ddl::init_schema(&mut conn)?;
        }

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    ///
    /// Pool size is pinned to 1 so every checkout sees the same in-memory
    /// database.
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory SQLite database");

        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| CompassError::Database(format!("Failed to build pool: {e}")))?;

        let db = Self { pool };

        {
            let mut conn = db.conn()?;
            ddl::init_schema(&mut conn)?;
        }

        Ok(db)
    }

    /// Check out a pooled connection
    pub fn conn(&self) -> Result<DbConn> {
        self.pool
            .get()
            .map_err(|e| CompassError::Database(format!("Pool checkout failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_initializes_schema() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        // Schema ran: the users table is queryable and empty
        let count: i64 = schema::users::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(count, 0);
    }
}
