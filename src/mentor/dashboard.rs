//! Mentor dashboard aggregation
//!
//! One pass over the mentor's active relationships; per client a handful of
//! independent aggregate queries combined into a summary, then plain
//! aggregates over the summaries for the top-level statistics. No
//! pagination; the relationship list is loaded whole.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use super::status::{
    determine_client_status, overall_progress, parse_timestamp, progress_percentage, ClientStatus,
};
use crate::db::schema::{goals, tasks};
use crate::db::{logs, reflections, relationships, users};
use crate::types::{CompassError, Result};

/// Per-client summary row on the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub client_id: String,
    pub relationship_id: String,
    pub name: String,
    pub email: String,
    pub total_goals: i64,
    pub completed_goals: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overall_progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    pub status: ClientStatus,
}

/// Top-level dashboard statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub active_clients: usize,
    pub needs_follow_up: usize,
    pub average_progress: i32,
}

/// Full dashboard response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub clients: Vec<ClientSummary>,
}

fn count_goals(conn: &mut SqliteConnection, user_id: &str) -> Result<(i64, i64)> {
    let total: i64 = goals::table
        .filter(goals::user_id.eq(user_id))
        .count()
        .get_result(conn)
        .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;
    let completed: i64 = goals::table
        .filter(goals::user_id.eq(user_id))
        .filter(goals::status.eq("completed"))
        .count()
        .get_result(conn)
        .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;
    Ok((total, completed))
}

fn count_tasks(conn: &mut SqliteConnection, user_id: &str) -> Result<(i64, i64)> {
    let total: i64 = tasks::table
        .filter(tasks::user_id.eq(user_id))
        .count()
        .get_result(conn)
        .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;
    let completed: i64 = tasks::table
        .filter(tasks::user_id.eq(user_id))
        .filter(tasks::status.eq("completed"))
        .count()
        .get_result(conn)
        .map_err(|e| CompassError::Database(format!("Count query failed: {e}")))?;
    Ok((total, completed))
}

/// Most recent of the client's last log and last reflection
pub fn last_activity(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<String>> {
    let last_log = logs::last_log_timestamp(conn, user_id)?;
    let last_reflection = reflections::last_reflection_timestamp(conn, user_id)?;

    Ok(match (last_log, last_reflection) {
        (Some(a), Some(b)) => Some(if a >= b { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    })
}

/// Summarize one client for the dashboard
pub fn summarize_client(
    conn: &mut SqliteConnection,
    relationship: &crate::db::models::Relationship,
    now: DateTime<Utc>,
) -> Result<ClientSummary> {
    let client_id = &relationship.client_id;
    let user = users::get_user(conn, client_id)?
        .ok_or_else(|| CompassError::NotFound(format!("Client {client_id} not found")))?;

    let (total_goals, completed_goals) = count_goals(conn, client_id)?;
    let (total_tasks, completed_tasks) = count_tasks(conn, client_id)?;

    let goal_pct = progress_percentage(completed_goals, total_goals);
    let task_pct = progress_percentage(completed_tasks, total_tasks);

    let last_activity_date = last_activity(conn, client_id)?;
    let last_activity_parsed = last_activity_date.as_deref().and_then(parse_timestamp);
    let status = determine_client_status(last_activity_parsed, now);

    Ok(ClientSummary {
        client_id: user.id,
        relationship_id: relationship.id.clone(),
        name: user.name,
        email: user.email,
        total_goals,
        completed_goals,
        total_tasks,
        completed_tasks,
        overall_progress: overall_progress(goal_pct, task_pct),
        last_activity_date,
        status,
    })
}

/// Build the whole dashboard for a mentor
pub fn build_dashboard(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    now: DateTime<Utc>,
) -> Result<Dashboard> {
    let active = relationships::list_active_for_mentor(conn, mentor_id)?;

    let clients: Vec<ClientSummary> = active
        .iter()
        .map(|relationship| summarize_client(conn, relationship, now))
        .collect::<Result<_>>()?;

    let total_clients = clients.len();
    let needs_follow_up = clients
        .iter()
        .filter(|c| c.status == ClientStatus::NeedsFollowup)
        .count();
    let active_clients = total_clients - needs_follow_up;
    let average_progress = if total_clients == 0 {
        0
    } else {
        let sum: i64 = clients.iter().map(|c| c.overall_progress as i64).sum();
        (sum as f64 / total_clients as f64).round() as i32
    };

    Ok(Dashboard {
        stats: DashboardStats {
            total_clients,
            active_clients,
            needs_follow_up,
            average_progress,
        },
        clients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::goals::{create_goal, CreateGoalInput};
    use crate::db::logs::{create_log, CreateLogInput};
    use crate::db::tasks::{complete_task, create_task, CreateTaskInput};
    use crate::db::users::{create_user, CreateUserInput};
    use crate::db::{relationships, Db};

    fn setup_client(conn: &mut SqliteConnection, email: &str, mentor_id: &str) -> String {
        let user = create_user(
            conn,
            CreateUserInput {
                name: "Client",
                email,
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();
        let invite = relationships::create_invite(conn, mentor_id, &user.id).unwrap();
        relationships::accept_invite(conn, &invite.id, &user.id).unwrap();
        user.id
    }

    #[test]
    fn test_empty_dashboard() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let dashboard = build_dashboard(&mut conn, "mentor-1", Utc::now()).unwrap();
        assert_eq!(dashboard.stats.total_clients, 0);
        assert_eq!(dashboard.stats.average_progress, 0);
        assert!(dashboard.clients.is_empty());
    }

    #[test]
    fn test_client_summary_combines_goal_and_task_progress() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let client_id = setup_client(&mut conn, "c1@example.com", "mentor-1");

        // One active goal (0% goal completion), 5 tasks with 3 completed (60%)
        let goal = create_goal(
            &mut conn,
            &client_id,
            CreateGoalInput {
                title: "Learn X".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();
        let mut task_ids = Vec::new();
        for i in 0..5 {
            let t = create_task(
                &mut conn,
                &client_id,
                &goal.id,
                CreateTaskInput {
                    title: format!("T{i}"),
                    due_date: None,
                },
            )
            .unwrap();
            task_ids.push(t.id);
        }
        for id in task_ids.iter().take(3) {
            complete_task(&mut conn, &client_id, id).unwrap();
        }

        // Fresh activity keeps the client on track
        create_log(
            &mut conn,
            &client_id,
            CreateLogInput {
                content: "today".into(),
                mood: None,
                logged_at: None,
            },
        )
        .unwrap();

        let dashboard = build_dashboard(&mut conn, "mentor-1", Utc::now()).unwrap();
        assert_eq!(dashboard.clients.len(), 1);
        let summary = &dashboard.clients[0];
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(summary.completed_tasks, 3);
        // round((0 + 60) / 2) = 30
        assert_eq!(summary.overall_progress, 30);
        assert_eq!(summary.status, ClientStatus::OnTrack);

        assert_eq!(dashboard.stats.total_clients, 1);
        assert_eq!(dashboard.stats.active_clients, 1);
        assert_eq!(dashboard.stats.needs_follow_up, 0);
        assert_eq!(dashboard.stats.average_progress, 30);
    }

    #[test]
    fn test_client_without_activity_needs_followup() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        setup_client(&mut conn, "c2@example.com", "mentor-1");

        let dashboard = build_dashboard(&mut conn, "mentor-1", Utc::now()).unwrap();
        assert_eq!(dashboard.clients[0].status, ClientStatus::NeedsFollowup);
        assert_eq!(dashboard.stats.needs_follow_up, 1);
        assert_eq!(dashboard.stats.active_clients, 0);
    }

    #[test]
    fn test_stale_log_classifies_stagnant() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let client_id = setup_client(&mut conn, "c3@example.com", "mentor-1");

        let fifteen_days_ago = (Utc::now() - chrono::Duration::days(15))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        create_log(
            &mut conn,
            &client_id,
            CreateLogInput {
                content: "old".into(),
                mood: None,
                logged_at: Some(fifteen_days_ago),
            },
        )
        .unwrap();

        let dashboard = build_dashboard(&mut conn, "mentor-1", Utc::now()).unwrap();
        assert_eq!(dashboard.clients[0].status, ClientStatus::Stagnant);
        // stagnant still counts as active
        assert_eq!(dashboard.stats.active_clients, 1);
    }
}
