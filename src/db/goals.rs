//! Goal CRUD operations (Plan-Do)

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{current_timestamp, Goal, GoalWithProgress, NewGoal};
use super::schema::{goals, tasks};
use crate::mentor::status::progress_percentage;
use crate::types::{CompassError, Result};

/// Input for creating a goal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

/// Input for updating a goal. Absent fields stay unchanged; for the nullable
/// fields an explicit JSON `null` clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::nullable_update")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "super::nullable_update")]
    pub target_date: Option<Option<String>>,
}

/// Get a goal by id
pub fn get_goal(conn: &mut SqliteConnection, id: &str) -> Result<Option<Goal>> {
    goals::table
        .filter(goals::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// All goals for a user, newest first
pub fn list_goals(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<Goal>> {
    goals::table
        .filter(goals::user_id.eq(user_id))
        .order(goals::created_at.desc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Goals with their task rollups (totals and progress percentage)
pub fn list_goals_with_progress(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<GoalWithProgress>> {
    let all = list_goals(conn, user_id)?;

    all.into_iter()
        .map(|goal| {
            let total: i64 = tasks::table
                .filter(tasks::goal_id.eq(&goal.id))
                .count()
                .get_result(conn)
                .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;
            let completed: i64 = tasks::table
                .filter(tasks::goal_id.eq(&goal.id))
                .filter(tasks::status.eq("completed"))
                .count()
                .get_result(conn)
                .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;

            Ok(GoalWithProgress {
                progress_percentage: progress_percentage(completed, total),
                total_tasks: total,
                completed_tasks: completed,
                goal,
            })
        })
        .collect()
}

/// Create a goal
pub fn create_goal(
    conn: &mut SqliteConnection,
    user_id: &str,
    input: CreateGoalInput,
) -> Result<Goal> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_goal = NewGoal {
        id: &id,
        user_id,
        title: &input.title,
        description: input.description.as_deref(),
        status: "active",
        target_date: input.target_date.as_deref(),
        created_at: &now,
        updated_at: &now,
    };

    diesel::insert_into(goals::table)
        .values(&new_goal)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_goal(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created goal".into()))
}

/// Update a goal owned by `user_id`. NotFound covers both a missing id and a
/// goal owned by someone else.
pub fn update_goal(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &str,
    input: UpdateGoalInput,
) -> Result<Goal> {
    let goal = get_goal(conn, id)?
        .filter(|g| g.user_id == user_id)
        .ok_or_else(|| CompassError::NotFound(format!("Goal {id} not found")))?;

    let now = current_timestamp();
    diesel::update(goals::table.filter(goals::id.eq(&goal.id)))
        .set((
            goals::title.eq(input.title.unwrap_or(goal.title)),
            goals::description.eq(input.description.unwrap_or(goal.description)),
            goals::status.eq(input.status.unwrap_or(goal.status)),
            goals::target_date.eq(input.target_date.unwrap_or(goal.target_date)),
            goals::updated_at.eq(&now),
        ))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_goal(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve updated goal".into()))
}

/// Delete a goal and all of its tasks in one transaction
pub fn delete_goal(conn: &mut SqliteConnection, user_id: &str, id: &str) -> Result<()> {
    let exists = get_goal(conn, id)?.filter(|g| g.user_id == user_id).is_some();
    if !exists {
        return Err(CompassError::NotFound(format!("Goal {id} not found")));
    }

    conn.transaction(|conn| {
        diesel::delete(tasks::table.filter(tasks::goal_id.eq(id))).execute(conn)?;
        diesel::delete(goals::table.filter(goals::id.eq(id))).execute(conn)?;
        diesel::result::QueryResult::Ok(())
    })
    .map_err(|e| CompassError::Database(format!("Delete failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tasks::{complete_task, create_task, list_tasks_for_goal, CreateTaskInput};
    use crate::db::Db;

    #[test]
    fn test_goal_progress_rollup() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let goal = create_goal(
            &mut conn,
            "user-1",
            CreateGoalInput {
                title: "Learn X".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();

        let mut task_ids = Vec::new();
        for i in 0..5 {
            let task = create_task(
                &mut conn,
                "user-1",
                &goal.id,
                CreateTaskInput {
                    title: format!("Task {i}"),
                    due_date: None,
                },
            )
            .unwrap();
            task_ids.push(task.id);
        }
        for id in task_ids.iter().take(3) {
            complete_task(&mut conn, "user-1", id).unwrap();
        }

        let rollup = list_goals_with_progress(&mut conn, "user-1").unwrap();
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].total_tasks, 5);
        assert_eq!(rollup[0].completed_tasks, 3);
        assert_eq!(rollup[0].progress_percentage, 60);
    }

    #[test]
    fn test_goal_without_tasks_is_zero_percent() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        create_goal(
            &mut conn,
            "user-1",
            CreateGoalInput {
                title: "Empty".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();

        let rollup = list_goals_with_progress(&mut conn, "user-1").unwrap();
        assert_eq!(rollup[0].total_tasks, 0);
        assert_eq!(rollup[0].progress_percentage, 0);
    }

    #[test]
    fn test_delete_cascades_tasks() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let goal = create_goal(
            &mut conn,
            "user-1",
            CreateGoalInput {
                title: "Doomed".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();
        for i in 0..4 {
            create_task(
                &mut conn,
                "user-1",
                &goal.id,
                CreateTaskInput {
                    title: format!("T{i}"),
                    due_date: None,
                },
            )
            .unwrap();
        }

        delete_goal(&mut conn, "user-1", &goal.id).unwrap();

        assert!(get_goal(&mut conn, &goal.id).unwrap().is_none());
        assert!(list_tasks_for_goal(&mut conn, &goal.id).unwrap().is_empty());
    }

    #[test]
    fn test_update_null_clears_description_absent_keeps_it() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let goal = create_goal(
            &mut conn,
            "user-1",
            CreateGoalInput {
                title: "G".into(),
                description: Some("ship it".into()),
                target_date: Some("2026-12-31".into()),
            },
        )
        .unwrap();

        // Absent fields leave stored values alone
        let input: UpdateGoalInput =
            serde_json::from_value(serde_json::json!({"title": "G2"})).unwrap();
        let updated = update_goal(&mut conn, "user-1", &goal.id, input).unwrap();
        assert_eq!(updated.title, "G2");
        assert_eq!(updated.description.as_deref(), Some("ship it"));

        // An explicit null clears the column
        let input: UpdateGoalInput =
            serde_json::from_value(serde_json::json!({"description": null})).unwrap();
        let cleared = update_goal(&mut conn, "user-1", &goal.id, input).unwrap();
        assert!(cleared.description.is_none());
        assert_eq!(cleared.target_date.as_deref(), Some("2026-12-31"));
    }

    #[test]
    fn test_update_denied_for_other_user() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let goal = create_goal(
            &mut conn,
            "user-1",
            CreateGoalInput {
                title: "Mine".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();

        let err = update_goal(
            &mut conn,
            "user-2",
            &goal.id,
            UpdateGoalInput {
                title: Some("Stolen".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompassError::NotFound(_)));
    }
}
