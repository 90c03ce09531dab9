//! AI assistant chat history operations

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, ChatMessage, NewChatMessage};
use super::schema::chat_messages;
use crate::types::{CompassError, Result};

pub fn append_message(
    conn: &mut SqliteConnection,
    user_id: &str,
    mode: &str,
    role: &str,
    content: &str,
) -> Result<ChatMessage> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_message = NewChatMessage {
        id: &id,
        user_id,
        mode,
        role,
        content,
        created_at: &now,
    };

    diesel::insert_into(chat_messages::table)
        .values(&new_message)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    chat_messages::table
        .filter(chat_messages::id.eq(&id))
        .first(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Chat history for one mode, oldest first, bounded
pub fn list_history(
    conn: &mut SqliteConnection,
    user_id: &str,
    mode: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>> {
    chat_messages::table
        .filter(chat_messages::user_id.eq(user_id))
        .filter(chat_messages::mode.eq(mode))
        .order(chat_messages::created_at.asc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}
