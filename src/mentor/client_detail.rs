//! Client detail assembly for the mentor view
//!
//! Every category is gated by the client's permission flags; a denied
//! category is absent from the response entirely, not an empty list. The
//! caller records the returned audit entries after the response is built;
//! that write is best-effort and never fails the request.

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use serde::Serialize;

use super::access::{category_allowed, DataCategory};
use super::dashboard::last_activity;
use super::status::{determine_client_status, parse_timestamp, ClientStatus};
use crate::db::models::{AnalysisReport, GoalWithProgress, Log, Reflection, Task};
use crate::db::permissions::{self, PermissionFlags};
use crate::db::view_logs::ViewEntry;
use crate::db::{goals, logs, reflections, relationships, reports, tasks, users};
use crate::types::{CompassError, Result};

const LOGS_LIMIT: i64 = 50;
const REFLECTIONS_LIMIT: i64 = 20;
const REPORTS_LIMIT: i64 = 10;

/// Client profile and permitted data categories. Denied categories stay
/// `None` and are omitted from the serialized response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    pub client_id: String,
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    pub permissions: PermissionFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<GoalWithProgress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<Log>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflections: Option<Vec<Reflection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_reports: Option<Vec<AnalysisReport>>,
}

fn view_entry(category: DataCategory, record_ids: Vec<String>) -> ViewEntry {
    ViewEntry {
        data_type: category.as_str().to_string(),
        record_ids,
    }
}

/// Assemble a client's detail view for a mentor.
///
/// NotFound when no active relationship exists. Returns the detail plus the
/// audit entries for the categories that actually returned data.
pub fn build_client_detail(
    conn: &mut SqliteConnection,
    mentor_id: &str,
    client_id: &str,
    now: DateTime<Utc>,
) -> Result<(ClientDetail, Vec<ViewEntry>)> {
    let Some(relationship) = relationships::find_active(conn, mentor_id, client_id)? else {
        return Err(CompassError::NotFound(format!(
            "No active relationship with client {client_id}"
        )));
    };

    let user = users::get_user(conn, client_id)?
        .ok_or_else(|| CompassError::NotFound(format!("Client {client_id} not found")))?;

    let flags = permissions::effective_flags(conn, &relationship.id)?;

    let last_activity_date = last_activity(conn, client_id)?;
    let last_activity_parsed = last_activity_date.as_deref().and_then(parse_timestamp);
    let status = determine_client_status(last_activity_parsed, now);

    let mut detail = ClientDetail {
        client_id: user.id,
        name: user.name,
        email: user.email,
        status,
        last_activity_date,
        permissions: flags,
        goals: None,
        tasks: None,
        logs: None,
        reflections: None,
        ai_reports: None,
    };

    let mut audit = Vec::new();

    if category_allowed(&flags, DataCategory::Goals) {
        let rows = goals::list_goals_with_progress(conn, client_id)?;
        audit.push(view_entry(
            DataCategory::Goals,
            rows.iter().map(|g| g.goal.id.clone()).collect(),
        ));
        detail.goals = Some(rows);
    }
    if category_allowed(&flags, DataCategory::Tasks) {
        let rows = tasks::list_tasks_for_user(conn, client_id)?;
        audit.push(view_entry(
            DataCategory::Tasks,
            rows.iter().map(|t| t.id.clone()).collect(),
        ));
        detail.tasks = Some(rows);
    }
    if category_allowed(&flags, DataCategory::Logs) {
        let rows = logs::list_logs(conn, client_id, LOGS_LIMIT)?;
        audit.push(view_entry(
            DataCategory::Logs,
            rows.iter().map(|l| l.id.clone()).collect(),
        ));
        detail.logs = Some(rows);
    }
    if category_allowed(&flags, DataCategory::Reflections) {
        let rows = reflections::list_reflections(conn, client_id, REFLECTIONS_LIMIT)?;
        audit.push(view_entry(
            DataCategory::Reflections,
            rows.iter().map(|r| r.id.clone()).collect(),
        ));
        detail.reflections = Some(rows);
    }
    if category_allowed(&flags, DataCategory::AiReports) {
        let rows = reports::list_reports(conn, client_id, REPORTS_LIMIT)?;
        audit.push(view_entry(
            DataCategory::AiReports,
            rows.iter().map(|r| r.id.clone()).collect(),
        ));
        detail.ai_reports = Some(rows);
    }

    Ok((detail, audit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::goals::{create_goal, CreateGoalInput};
    use crate::db::logs::{create_log, CreateLogInput};
    use crate::db::permissions::upsert_flags;
    use crate::db::users::{create_user, CreateUserInput};
    use crate::db::{relationships, Db};

    fn setup(conn: &mut SqliteConnection) -> (String, crate::db::models::Relationship) {
        let client = create_user(
            conn,
            CreateUserInput {
                name: "Client",
                email: "client@example.com",
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();
        let invite = relationships::create_invite(conn, "mentor-1", &client.id).unwrap();
        let active = relationships::accept_invite(conn, &invite.id, &client.id).unwrap();
        (client.id, active)
    }

    #[test]
    fn test_no_active_relationship_is_not_found() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let err = build_client_detail(&mut conn, "mentor-1", "nobody", Utc::now()).unwrap_err();
        assert!(matches!(err, CompassError::NotFound(_)));
    }

    #[test]
    fn test_denied_categories_are_omitted() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let (client_id, active) = setup(&mut conn);

        create_goal(
            &mut conn,
            &client_id,
            CreateGoalInput {
                title: "Hidden".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();

        // No permission row at all: everything denied
        let (detail, audit) =
            build_client_detail(&mut conn, "mentor-1", &client_id, Utc::now()).unwrap();
        assert!(detail.goals.is_none());
        assert!(detail.tasks.is_none());
        assert!(detail.logs.is_none());
        assert!(audit.is_empty());

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("goals").is_none());

        // Grant goals only
        let mut flags = PermissionFlags::deny_all();
        flags.allow_goals = true;
        upsert_flags(&mut conn, &active, flags).unwrap();

        let (detail, audit) =
            build_client_detail(&mut conn, "mentor-1", &client_id, Utc::now()).unwrap();
        let goals = detail.goals.as_ref().unwrap();
        assert_eq!(goals.len(), 1);
        assert!(detail.logs.is_none());
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].data_type, "goals");
        assert_eq!(audit[0].record_ids.len(), 1);
    }

    #[test]
    fn test_logs_are_bounded() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let (client_id, active) = setup(&mut conn);

        let mut flags = PermissionFlags::deny_all();
        flags.allow_logs = true;
        upsert_flags(&mut conn, &active, flags).unwrap();

        for i in 0..60 {
            create_log(
                &mut conn,
                &client_id,
                CreateLogInput {
                    content: format!("entry {i}"),
                    mood: None,
                    logged_at: Some(format!("2026-07-01T{:02}:{:02}:00Z", i / 60, i % 60)),
                },
            )
            .unwrap();
        }

        let (detail, audit) =
            build_client_detail(&mut conn, "mentor-1", &client_id, Utc::now()).unwrap();
        assert_eq!(detail.logs.as_ref().unwrap().len(), 50);
        assert_eq!(audit[0].record_ids.len(), 50);
    }
}
