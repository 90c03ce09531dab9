//! Mentor-client relationship CRUD operations
//!
//! A relationship is created as `pending` when a mentor invites a client and
//! transitions to `active` when the client accepts (or `declined`).

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, relationship_status, NewRelationship, Relationship};
use super::schema::mentor_client_relationships as rel;
use crate::types::{CompassError, Result};

/// Get relationship by id
pub fn get_relationship(conn: &mut SqliteConnection, id: &str) -> Result<Option<Relationship>> {
    rel::table
        .filter(rel::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Find the active relationship between a mentor and a client, if any
pub fn find_active(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
) -> Result<Option<Relationship>> {
    rel::table
        .filter(rel::mentor_id.eq(mentor_id))
        .filter(rel::client_id.eq(client_id))
        .filter(rel::status.eq(relationship_status::ACTIVE))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// All active relationships for a mentor (dashboard input)
pub fn list_active_for_mentor(
    conn: &mut SqliteConnection,
    mentor_id: &str,
) -> Result<Vec<Relationship>> {
    rel::table
        .filter(rel::mentor_id.eq(mentor_id))
        .filter(rel::status.eq(relationship_status::ACTIVE))
        .order(rel::invited_at.asc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// All relationships where the user is the client (any status)
pub fn list_for_client(conn: &mut SqliteConnection, client_id: &str) -> Result<Vec<Relationship>> {
    rel::table
        .filter(rel::client_id.eq(client_id))
        .order(rel::invited_at.asc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Create a pending invitation. Returns Conflict if any relationship between
/// the pair already exists.
pub fn create_invite(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
) -> Result<Relationship> {
    let existing: Option<Relationship> = rel::table
        .filter(rel::mentor_id.eq(mentor_id))
        .filter(rel::client_id.eq(client_id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))?;

    if existing.is_some() {
        return Err(CompassError::Conflict(
            "A relationship with this client already exists".into(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_rel = NewRelationship {
        id: &id,
        mentor_id,
        client_id,
        status: relationship_status::PENDING,
        invited_at: &now,
        accepted_at: None,
    };

    diesel::insert_into(rel::table)
        .values(&new_rel)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_relationship(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created relationship".into()))
}

/// Client accepts a pending invitation: status becomes active, accepted_at set.
pub fn accept_invite(
    conn: &mut SqliteConnection,
    id: &str,
    client_id: &str,
) -> Result<Relationship> {
    let relationship = get_relationship(conn, id)?
        .ok_or_else(|| CompassError::NotFound(format!("Relationship {id} not found")))?;

    if relationship.client_id != client_id {
        return Err(CompassError::Forbidden(
            "Only the invited client can accept this invitation".into(),
        ));
    }
    if relationship.status != relationship_status::PENDING {
        return Err(CompassError::Conflict(format!(
            "Invitation is not pending (status: {})",
            relationship.status
        )));
    }

    diesel::update(rel::table.filter(rel::id.eq(id)))
        .set((
            rel::status.eq(relationship_status::ACTIVE),
            rel::accepted_at.eq(Some(current_timestamp())),
        ))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_relationship(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve updated relationship".into()))
}

/// Client declines a pending invitation.
pub fn decline_invite(
    conn: &mut SqliteConnection,
    id: &str,
    client_id: &str,
) -> Result<Relationship> {
    let relationship = get_relationship(conn, id)?
        .ok_or_else(|| CompassError::NotFound(format!("Relationship {id} not found")))?;

    if relationship.client_id != client_id {
        return Err(CompassError::Forbidden(
            "Only the invited client can decline this invitation".into(),
        ));
    }
    if relationship.status != relationship_status::PENDING {
        return Err(CompassError::Conflict(format!(
            "Invitation is not pending (status: {})",
            relationship.status
        )));
    }

    diesel::update(rel::table.filter(rel::id.eq(id)))
        .set(rel::status.eq(relationship_status::DECLINED))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_relationship(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve updated relationship".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn test_invite_accept_flow() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let invite = create_invite(&mut conn, "mentor-1", "client-1").unwrap();
        assert_eq!(invite.status, "pending");
        assert!(invite.accepted_at.is_none());

        // Not yet visible as active
        assert!(find_active(&mut conn, "mentor-1", "client-1").unwrap().is_none());

        let accepted = accept_invite(&mut conn, &invite.id, "client-1").unwrap();
        assert_eq!(accepted.status, "active");
        assert!(accepted.accepted_at.is_some());

        assert!(find_active(&mut conn, "mentor-1", "client-1").unwrap().is_some());
    }

    #[test]
    fn test_accept_requires_invited_client() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let invite = create_invite(&mut conn, "mentor-1", "client-1").unwrap();
        let err = accept_invite(&mut conn, &invite.id, "someone-else").unwrap_err();
        assert!(matches!(err, CompassError::Forbidden(_)));
    }

    #[test]
    fn test_decline_leaves_no_active_relationship() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let invite = create_invite(&mut conn, "mentor-1", "client-1").unwrap();
        let declined = decline_invite(&mut conn, &invite.id, "client-1").unwrap();
        assert_eq!(declined.status, "declined");

        assert!(find_active(&mut conn, "mentor-1", "client-1").unwrap().is_none());
        assert!(list_active_for_mentor(&mut conn, "mentor-1").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_invite_conflict() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        create_invite(&mut conn, "mentor-1", "client-1").unwrap();
        let err = create_invite(&mut conn, "mentor-1", "client-1").unwrap_err();
        assert!(matches!(err, CompassError::Conflict(_)));
    }
}
