//! Periodic reflection operations (Check-Action)

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{current_timestamp, NewReflection, Reflection};
use super::schema::reflections;
use crate::types::{CompassError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReflectionInput {
    pub period_start: String,
    pub period_end: String,
    pub went_well: String,
    pub to_improve: String,
    pub next_actions: String,
}

/// Reflections for a user, newest first, bounded
pub fn list_reflections(
    conn: &mut SqliteConnection,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Reflection>> {
    reflections::table
        .filter(reflections::user_id.eq(user_id))
        .order(reflections::created_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn get_reflection(conn: &mut SqliteConnection, id: &str) -> Result<Option<Reflection>> {
    reflections::table
        .filter(reflections::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Most recent reflection timestamp for a user, if any
pub fn last_reflection_timestamp(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<String>> {
    reflections::table
        .filter(reflections::user_id.eq(user_id))
        .order(reflections::created_at.desc())
        .select(reflections::created_at)
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn create_reflection(
    conn: &mut SqliteConnection,
    user_id: &str,
    input: CreateReflectionInput,
) -> Result<Reflection> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_reflection = NewReflection {
        id: &id,
        user_id,
        period_start: &input.period_start,
        period_end: &input.period_end,
        went_well: &input.went_well,
        to_improve: &input.to_improve,
        next_actions: &input.next_actions,
        created_at: &now,
    };

    diesel::insert_into(reflections::table)
        .values(&new_reflection)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_reflection(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created reflection".into()))
}
