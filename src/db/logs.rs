//! Daily activity log operations (Check-Action)

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{current_timestamp, Log, NewLog};
use super::schema::logs;
use crate::types::{CompassError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogInput {
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    /// Defaults to now when absent
    #[serde(default)]
    pub logged_at: Option<String>,
}

/// Logs for a user, newest first, bounded
pub fn list_logs(conn: &mut SqliteConnection, user_id: &str, limit: i64) -> Result<Vec<Log>> {
    logs::table
        .filter(logs::user_id.eq(user_id))
        .order(logs::logged_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Most recent logged_at for a user, if any
pub fn last_log_timestamp(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<String>> {
    logs::table
        .filter(logs::user_id.eq(user_id))
        .order(logs::logged_at.desc())
        .select(logs::logged_at)
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn create_log(
    conn: &mut SqliteConnection,
    user_id: &str,
    input: CreateLogInput,
) -> Result<Log> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();
    let logged_at = input.logged_at.unwrap_or_else(|| now.clone());

    let new_log = NewLog {
        id: &id,
        user_id,
        content: &input.content,
        mood: input.mood.as_deref(),
        logged_at: &logged_at,
        created_at: &now,
    };

    diesel::insert_into(logs::table)
        .values(&new_log)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    logs::table
        .filter(logs::id.eq(&id))
        .first(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn test_newest_first_and_limit() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        for i in 0..3 {
            create_log(
                &mut conn,
                "user-1",
                CreateLogInput {
                    content: format!("day {i}"),
                    mood: None,
                    logged_at: Some(format!("2026-08-0{}T00:00:00Z", i + 1)),
                },
            )
            .unwrap();
        }

        let listed = list_logs(&mut conn, "user-1", 2).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content, "day 2");

        let last = last_log_timestamp(&mut conn, "user-1").unwrap();
        assert_eq!(last.as_deref(), Some("2026-08-03T00:00:00Z"));
        assert!(last_log_timestamp(&mut conn, "nobody").unwrap().is_none());
    }
}
