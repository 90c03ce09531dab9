//! Task CRUD operations (Plan-Do)

use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{current_timestamp, NewTask, Task};
use super::schema::tasks;
use crate::types::{CompassError, Result};

/// Input for creating a task under a goal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Input for updating a task. Absent fields stay unchanged; an explicit JSON
/// `null` clears the due date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "super::nullable_update")]
    pub due_date: Option<Option<String>>,
}

/// Get a task by id
pub fn get_task(conn: &mut SqliteConnection, id: &str) -> Result<Option<Task>> {
    tasks::table
        .filter(tasks::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// All tasks under a goal, oldest first
pub fn list_tasks_for_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Vec<Task>> {
    tasks::table
        .filter(tasks::goal_id.eq(goal_id))
        .order(tasks::created_at.asc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// All tasks for a user, oldest first
pub fn list_tasks_for_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<Task>> {
    tasks::table
        .filter(tasks::user_id.eq(user_id))
        .order(tasks::created_at.asc())
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Create a task under a goal the user owns
pub fn create_task(
    conn: &mut SqliteConnection,
    user_id: &str,
    goal_id: &str,
    input: CreateTaskInput,
) -> Result<Task> {
    let goal = super::goals::get_goal(conn, goal_id)?
        .filter(|g| g.user_id == user_id)
        .ok_or_else(|| CompassError::NotFound(format!("Goal {goal_id} not found")))?;

    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_task = NewTask {
        id: &id,
        goal_id: &goal.id,
        user_id,
        title: &input.title,
        status: "pending",
        due_date: input.due_date.as_deref(),
        completed_at: None,
        created_at: &now,
        updated_at: &now,
    };

    diesel::insert_into(tasks::table)
        .values(&new_task)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_task(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created task".into()))
}

/// Update a task owned by `user_id`. Setting status to `completed` stamps
/// completed_at; reverting to `pending` clears it.
pub fn update_task(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &str,
    input: UpdateTaskInput,
) -> Result<Task> {
    let task = get_task(conn, id)?
        .filter(|t| t.user_id == user_id)
        .ok_or_else(|| CompassError::NotFound(format!("Task {id} not found")))?;

    let now = current_timestamp();
    let new_status = input.status.unwrap_or_else(|| task.status.clone());
    let completed_at = match new_status.as_str() {
        "completed" => task.completed_at.clone().or_else(|| Some(now.clone())),
        _ => None,
    };

    diesel::update(tasks::table.filter(tasks::id.eq(&task.id)))
        .set((
            tasks::title.eq(input.title.unwrap_or(task.title)),
            tasks::status.eq(&new_status),
            tasks::due_date.eq(input.due_date.unwrap_or(task.due_date)),
            tasks::completed_at.eq(completed_at),
            tasks::updated_at.eq(&now),
        ))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_task(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve updated task".into()))
}

/// Mark a task completed
pub fn complete_task(conn: &mut SqliteConnection, user_id: &str, id: &str) -> Result<Task> {
    update_task(
        conn,
        user_id,
        id,
        UpdateTaskInput {
            status: Some("completed".into()),
            ..Default::default()
        },
    )
}

/// Delete a task owned by `user_id`
pub fn delete_task(conn: &mut SqliteConnection, user_id: &str, id: &str) -> Result<()> {
    let deleted = diesel::delete(
        tasks::table
            .filter(tasks::id.eq(id))
            .filter(tasks::user_id.eq(user_id)),
    )
    .execute(conn)
    .map_err(|e| CompassError::Database(format!("Delete failed: {e}")))?;

    if deleted == 0 {
        return Err(CompassError::NotFound(format!("Task {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::goals::{create_goal, CreateGoalInput};
    use crate::db::Db;

    fn goal(conn: &mut SqliteConnection) -> String {
        create_goal(
            conn,
            "user-1",
            CreateGoalInput {
                title: "G".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_complete_sets_completed_at() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let goal_id = goal(&mut conn);

        let task = create_task(
            &mut conn,
            "user-1",
            &goal_id,
            CreateTaskInput {
                title: "T".into(),
                due_date: None,
            },
        )
        .unwrap();
        assert!(task.completed_at.is_none());

        let done = complete_task(&mut conn, "user-1", &task.id).unwrap();
        assert_eq!(done.status, "completed");
        assert!(done.completed_at.is_some());

        // Reverting clears the stamp
        let reverted = update_task(
            &mut conn,
            "user-1",
            &task.id,
            UpdateTaskInput {
                status: Some("pending".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(reverted.completed_at.is_none());
    }

    #[test]
    fn test_update_null_clears_due_date() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let goal_id = goal(&mut conn);

        let task = create_task(
            &mut conn,
            "user-1",
            &goal_id,
            CreateTaskInput {
                title: "T".into(),
                due_date: Some("2026-09-01".into()),
            },
        )
        .unwrap();

        // Absent field keeps the date, explicit null removes it
        let input: UpdateTaskInput =
            serde_json::from_value(serde_json::json!({"title": "T2"})).unwrap();
        let kept = update_task(&mut conn, "user-1", &task.id, input).unwrap();
        assert_eq!(kept.due_date.as_deref(), Some("2026-09-01"));

        let input: UpdateTaskInput =
            serde_json::from_value(serde_json::json!({"dueDate": null})).unwrap();
        let cleared = update_task(&mut conn, "user-1", &task.id, input).unwrap();
        assert!(cleared.due_date.is_none());
    }

    #[test]
    fn test_create_under_foreign_goal_rejected() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let goal_id = goal(&mut conn);

        let err = create_task(
            &mut conn,
            "user-2",
            &goal_id,
            CreateTaskInput {
                title: "T".into(),
                due_date: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompassError::NotFound(_)));
    }
}
