//! Client data-access permission CRUD operations
//!
//! One row per relationship, created lazily on the client's first permission
//! write. `is_active` snapshots the relationship status at creation time and
//! is never touched by later updates; only the five category flags change.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{
    current_timestamp, relationship_status, DataAccessPermission, NewDataAccessPermission,
    Relationship,
};
use super::schema::client_data_access_permissions as perms;
use crate::types::{CompassError, Result};

/// The five independent category flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFlags {
    pub allow_goals: bool,
    pub allow_tasks: bool,
    pub allow_logs: bool,
    pub allow_reflections: bool,
    pub allow_ai_reports: bool,
}

impl PermissionFlags {
    /// All-deny default used when no permission row exists
    pub fn deny_all() -> Self {
        Self {
            allow_goals: false,
            allow_tasks: false,
            allow_logs: false,
            allow_reflections: false,
            allow_ai_reports: false,
        }
    }

    /// Category names (for notifications) whose value differs from `other`
    pub fn changed_categories(&self, other: &PermissionFlags) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.allow_goals != other.allow_goals {
            changed.push("goals");
        }
        if self.allow_tasks != other.allow_tasks {
            changed.push("tasks");
        }
        if self.allow_logs != other.allow_logs {
            changed.push("logs");
        }
        if self.allow_reflections != other.allow_reflections {
            changed.push("reflections");
        }
        if self.allow_ai_reports != other.allow_ai_reports {
            changed.push("aiReports");
        }
        changed
    }
}

impl From<&DataAccessPermission> for PermissionFlags {
    fn from(p: &DataAccessPermission) -> Self {
        Self {
            allow_goals: p.allow_goals != 0,
            allow_tasks: p.allow_tasks != 0,
            allow_logs: p.allow_logs != 0,
            allow_reflections: p.allow_reflections != 0,
            allow_ai_reports: p.allow_ai_reports != 0,
        }
    }
}

/// Get the permission row for a relationship, if one exists
pub fn get_for_relationship(
    conn: &mut SqliteConnection,
    relationship_id: &str,
) -> Result<Option<DataAccessPermission>> {
    perms::table
        .filter(perms::relationship_id.eq(relationship_id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Effective flags for a relationship: the stored row or all-deny
pub fn effective_flags(
    conn: &mut SqliteConnection,
    relationship_id: &str,
) -> Result<PermissionFlags> {
    Ok(get_for_relationship(conn, relationship_id)?
        .as_ref()
        .map(PermissionFlags::from)
        .unwrap_or_else(PermissionFlags::deny_all))
}

/// Upsert the five flags for a relationship.
///
/// On first write the row is created with `is_active` snapshotting the
/// current relationship status; later writes update only the flags.
/// Returns the persisted row and the previous effective flags.
pub fn upsert_flags(
    conn: &mut SqliteConnection,
    relationship: &Relationship,
    flags: PermissionFlags,
) -> Result<(DataAccessPermission, PermissionFlags)> {
    let previous = effective_flags(conn, &relationship.id)?;
    let now = current_timestamp();

    match get_for_relationship(conn, &relationship.id)? {
        Some(existing) => {
            diesel::update(perms::table.filter(perms::id.eq(&existing.id)))
                .set((
                    perms::allow_goals.eq(flags.allow_goals as i32),
                    perms::allow_tasks.eq(flags.allow_tasks as i32),
                    perms::allow_logs.eq(flags.allow_logs as i32),
                    perms::allow_reflections.eq(flags.allow_reflections as i32),
                    perms::allow_ai_reports.eq(flags.allow_ai_reports as i32),
                    perms::updated_at.eq(&now),
                ))
                .execute(conn)
                .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;
        }
        None => {
            let id = Uuid::new_v4().to_string();
            let is_active = relationship.status == relationship_status::ACTIVE;
            let new_perm = NewDataAccessPermission {
                id: &id,
                relationship_id: &relationship.id,
                client_id: &relationship.client_id,
                allow_goals: flags.allow_goals as i32,
                allow_tasks: flags.allow_tasks as i32,
                allow_logs: flags.allow_logs as i32,
                allow_reflections: flags.allow_reflections as i32,
                allow_ai_reports: flags.allow_ai_reports as i32,
                is_active: is_active as i32,
                created_at: &now,
                updated_at: &now,
            };
            diesel::insert_into(perms::table)
                .values(&new_perm)
                .execute(conn)
                .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;
        }
    }

    let row = get_for_relationship(conn, &relationship.id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve permission row".into()))?;
    Ok((row, previous))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{relationships, Db};

    fn active_relationship(conn: &mut SqliteConnection) -> Relationship {
        let invite = relationships::create_invite(conn, "mentor-1", "client-1").unwrap();
        relationships::accept_invite(conn, &invite.id, "client-1").unwrap()
    }

    #[test]
    fn test_missing_row_is_deny_all() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let relationship = active_relationship(&mut conn);

        let flags = effective_flags(&mut conn, &relationship.id).unwrap();
        assert_eq!(flags, PermissionFlags::deny_all());
    }

    #[test]
    fn test_first_write_snapshots_is_active() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let relationship = active_relationship(&mut conn);

        let mut flags = PermissionFlags::deny_all();
        flags.allow_goals = true;
        let (row, previous) = upsert_flags(&mut conn, &relationship, flags).unwrap();

        assert_eq!(previous, PermissionFlags::deny_all());
        assert_eq!(row.is_active, 1);
        assert_eq!(row.allow_goals, 1);
        assert_eq!(row.allow_tasks, 0);
    }

    #[test]
    fn test_update_touches_only_flags() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let relationship = active_relationship(&mut conn);

        let mut flags = PermissionFlags::deny_all();
        flags.allow_logs = true;
        let (first, _) = upsert_flags(&mut conn, &relationship, flags).unwrap();

        // Second write flips a different subset; is_active must not change
        let mut flags2 = flags;
        flags2.allow_logs = false;
        flags2.allow_reflections = true;
        let (second, previous) = upsert_flags(&mut conn, &relationship, flags2).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.is_active, first.is_active);
        assert_eq!(second.allow_logs, 0);
        assert_eq!(second.allow_reflections, 1);
        assert_eq!(previous, flags);
    }

    #[test]
    fn test_changed_categories() {
        let a = PermissionFlags::deny_all();
        let mut b = a;
        b.allow_goals = true;
        b.allow_ai_reports = true;

        assert_eq!(b.changed_categories(&a), vec!["goals", "aiReports"]);
        assert!(a.changed_categories(&a).is_empty());
    }

    #[test]
    fn test_pending_relationship_snapshot_inactive() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let pending = relationships::create_invite(&mut conn, "mentor-2", "client-2").unwrap();

        let (row, _) = upsert_flags(&mut conn, &pending, PermissionFlags::deny_all()).unwrap();
        assert_eq!(row.is_active, 0);
    }
}
