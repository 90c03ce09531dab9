//! Action plan operations (Check-Action follow-ups)

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{current_timestamp, ActionPlan, NewActionPlan};
use super::schema::action_plans;
use crate::types::{CompassError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionPlanInput {
    pub title: String,
    /// Free-form list of action items
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub report_id: Option<String>,
}

pub fn get_action_plan(conn: &mut SqliteConnection, id: &str) -> Result<Option<ActionPlan>> {
    action_plans::table
        .filter(action_plans::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Action plans for a user, newest first
pub fn list_action_plans(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<ActionPlan>> {
    action_plans::table
        .filter(action_plans::user_id.eq(user_id))
        .order(action_plans::created_at.desc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn create_action_plan(
    conn: &mut SqliteConnection,
    user_id: &str,
    input: CreateActionPlanInput,
) -> Result<ActionPlan> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();
    let items_json = serde_json::to_string(&input.items)?;

    let new_plan = NewActionPlan {
        id: &id,
        user_id,
        report_id: input.report_id.as_deref(),
        title: &input.title,
        items_json: &items_json,
        status: "open",
        created_at: &now,
        updated_at: &now,
    };

    diesel::insert_into(action_plans::table)
        .values(&new_plan)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_action_plan(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created action plan".into()))
}

/// Set the plan status (`open` or `done`) for a plan the user owns
pub fn set_status(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &str,
    status: &str,
) -> Result<ActionPlan> {
    let plan = get_action_plan(conn, id)?
        .filter(|p| p.user_id == user_id)
        .ok_or_else(|| CompassError::NotFound(format!("Action plan {id} not found")))?;

    diesel::update(action_plans::table.filter(action_plans::id.eq(&plan.id)))
        .set((
            action_plans::status.eq(status),
            action_plans::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_action_plan(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve updated action plan".into()))
}
