//! Mentor private note operations

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, MentorNote, NewMentorNote};
use super::schema::mentor_notes;
use crate::types::{CompassError, Result};

/// Notes a mentor has written about a client, newest first
pub fn list_notes(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
) -> Result<Vec<MentorNote>> {
    mentor_notes::table
        .filter(mentor_notes::mentor_id.eq(mentor_id))
        .filter(mentor_notes::client_id.eq(client_id))
        .order(mentor_notes::created_at.desc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn create_note(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
    content: &str,
) -> Result<MentorNote> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_note = NewMentorNote {
        id: &id,
        mentor_id,
        client_id,
        content,
        created_at: &now,
    };

    diesel::insert_into(mentor_notes::table)
        .values(&new_note)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    mentor_notes::table
        .filter(mentor_notes::id.eq(&id))
        .first(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}
