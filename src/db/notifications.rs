//! Notification operations

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, NewNotification, Notification};
use super::schema::notifications;
use crate::types::{CompassError, Result};

pub fn create_notification(
    conn: &mut SqliteConnection,
    user_id: &str,
    kind: &str,
    message: &str,
) -> Result<Notification> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_notification = NewNotification {
        id: &id,
        user_id,
        kind,
        message,
        read: 0,
        created_at: &now,
    };

    diesel::insert_into(notifications::table)
        .values(&new_notification)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    notifications::table
        .filter(notifications::id.eq(&id))
        .first(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Notifications for a user, newest first, bounded
pub fn list_notifications(
    conn: &mut SqliteConnection,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Notification>> {
    notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order(notifications::created_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Mark a notification read; NotFound when the id is not the user's
pub fn mark_read(conn: &mut SqliteConnection, user_id: &str, id: &str) -> Result<()> {
    let updated = diesel::update(
        notifications::table
            .filter(notifications::id.eq(id))
            .filter(notifications::user_id.eq(user_id)),
    )
    .set(notifications::read.eq(1))
    .execute(conn)
    .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    if updated == 0 {
        return Err(CompassError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}
