//! Mentor data-access checks
//!
//! A mentor may see one category of a client's data only when an active
//! relationship exists AND the client's permission row allows the category.
//! Absence of either record is a plain deny, never an error, and the check
//! is re-evaluated on every call.

use diesel::SqliteConnection;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::permissions::{self, PermissionFlags};
use crate::db::relationships;
use crate::types::Result;

/// The five client data categories a mentor can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Goals,
    Tasks,
    Logs,
    Reflections,
    AiReports,
}

impl DataCategory {
    pub const ALL: [DataCategory; 5] = [
        DataCategory::Goals,
        DataCategory::Tasks,
        DataCategory::Logs,
        DataCategory::Reflections,
        DataCategory::AiReports,
    ];

    /// Audit-log data_type value for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Goals => "goals",
            DataCategory::Tasks => "tasks",
            DataCategory::Logs => "logs",
            DataCategory::Reflections => "reflections",
            DataCategory::AiReports => "ai_reports",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a set of flags allows a category. Pure; used by both the access
/// check and the client-detail assembly.
pub fn category_allowed(flags: &PermissionFlags, category: DataCategory) -> bool {
    match category {
        DataCategory::Goals => flags.allow_goals,
        DataCategory::Tasks => flags.allow_tasks,
        DataCategory::Logs => flags.allow_logs,
        DataCategory::Reflections => flags.allow_reflections,
        DataCategory::AiReports => flags.allow_ai_reports,
    }
}

/// Full access check: active relationship plus the category flag.
pub fn check_data_access(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
    category: DataCategory,
) -> Result<bool> {
    let Some(relationship) = relationships::find_active(conn, mentor_id, client_id)? else {
        return Ok(false);
    };

    let flags = permissions::effective_flags(conn, &relationship.id)?;
    Ok(category_allowed(&flags, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{permissions::upsert_flags, Db};

    #[test]
    fn test_no_relationship_denies_every_category() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        for category in DataCategory::ALL {
            assert!(!check_data_access(&mut conn, "m", "c", category).unwrap());
        }
    }

    #[test]
    fn test_pending_relationship_denies_even_with_flags() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let pending = relationships::create_invite(&mut conn, "m", "c").unwrap();
        let mut flags = PermissionFlags::deny_all();
        flags.allow_goals = true;
        upsert_flags(&mut conn, &pending, flags).unwrap();

        for category in DataCategory::ALL {
            assert!(!check_data_access(&mut conn, "m", "c", category).unwrap());
        }
    }

    #[test]
    fn test_active_relationship_without_row_denies() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let invite = relationships::create_invite(&mut conn, "m", "c").unwrap();
        relationships::accept_invite(&mut conn, &invite.id, "c").unwrap();

        assert!(!check_data_access(&mut conn, "m", "c", DataCategory::Goals).unwrap());
    }

    #[test]
    fn test_flags_gate_individual_categories() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let invite = relationships::create_invite(&mut conn, "m", "c").unwrap();
        let active = relationships::accept_invite(&mut conn, &invite.id, "c").unwrap();

        let mut flags = PermissionFlags::deny_all();
        flags.allow_logs = true;
        flags.allow_ai_reports = true;
        upsert_flags(&mut conn, &active, flags).unwrap();

        assert!(check_data_access(&mut conn, "m", "c", DataCategory::Logs).unwrap());
        assert!(check_data_access(&mut conn, "m", "c", DataCategory::AiReports).unwrap());
        assert!(!check_data_access(&mut conn, "m", "c", DataCategory::Goals).unwrap());
        assert!(!check_data_access(&mut conn, "m", "c", DataCategory::Tasks).unwrap());
        assert!(!check_data_access(&mut conn, "m", "c", DataCategory::Reflections).unwrap());
    }
}
