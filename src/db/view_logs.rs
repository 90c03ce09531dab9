//! Audit trail for mentor views of client data
//!
//! Rows are appended after a permitted read actually returned data. Writes
//! are best-effort; callers log failures and never fail the request on them.

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, DataViewLog, NewDataViewLog};
use super::schema::data_view_logs;
use crate::types::{CompassError, Result};

/// One category's worth of audit data
#[derive(Debug, Clone)]
pub struct ViewEntry {
    pub data_type: String,
    pub record_ids: Vec<String>,
}

/// Batch-insert one audit row per returned category
pub fn record_views(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
    entries: &[ViewEntry],
) -> Result<usize> {
    let now = current_timestamp();
    let mut ids = Vec::with_capacity(entries.len());
    let mut json_blobs = Vec::with_capacity(entries.len());
    for entry in entries {
        ids.push(Uuid::new_v4().to_string());
        json_blobs.push(serde_json::to_string(&entry.record_ids)?);
    }

    let rows: Vec<NewDataViewLog<'_>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| NewDataViewLog {
            id: &ids[i],
            mentor_id,
            client_id,
            data_type: &entry.data_type,
            record_ids_json: &json_blobs[i],
            action: "view",
            created_at: &now,
        })
        .collect();

    diesel::insert_into(data_view_logs::table)
        .values(&rows)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))
}

/// Audit rows for a mentor/client pair, newest first (admin/debug surface)
pub fn list_views(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
    limit: i64,
) -> Result<Vec<DataViewLog>> {
    data_view_logs::table
        .filter(data_view_logs::mentor_id.eq(mentor_id))
        .filter(data_view_logs::client_id.eq(client_id))
        .order(data_view_logs::created_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn test_batch_insert() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let inserted = record_views(
            &mut conn,
            "mentor-1",
            "client-1",
            &[
                ViewEntry {
                    data_type: "goals".into(),
                    record_ids: vec!["g1".into(), "g2".into()],
                },
                ViewEntry {
                    data_type: "logs".into(),
                    record_ids: vec!["l1".into()],
                },
            ],
        )
        .unwrap();
        assert_eq!(inserted, 2);

        let listed = list_views(&mut conn, "mentor-1", "client-1", 10).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|v| v.data_type == "goals"));
    }
}
