//! Idempotent schema creation
//!
//! Run at startup and from tests; every statement is CREATE ... IF NOT EXISTS
//! so re-opening an existing database is a no-op.

use diesel::prelude::*;
use diesel::sql_query;

use crate::types::{CompassError, Result};

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'client',
        is_mentor INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mentor_client_relationships (
        id TEXT PRIMARY KEY NOT NULL,
        mentor_id TEXT NOT NULL,
        client_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        invited_at TEXT NOT NULL,
        accepted_at TEXT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_relationship_pair
     ON mentor_client_relationships(mentor_id, client_id)",
    r#"
    CREATE TABLE IF NOT EXISTS client_data_access_permissions (
        id TEXT PRIMARY KEY NOT NULL,
        relationship_id TEXT NOT NULL UNIQUE,
        client_id TEXT NOT NULL,
        allow_goals INTEGER NOT NULL DEFAULT 0,
        allow_tasks INTEGER NOT NULL DEFAULT 0,
        allow_logs INTEGER NOT NULL DEFAULT 0,
        allow_reflections INTEGER NOT NULL DEFAULT 0,
        allow_ai_reports INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        target_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY NOT NULL,
        goal_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        due_date TEXT,
        completed_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_goal ON tasks(goal_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS logs (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        mood TEXT,
        logged_at TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_logs_user ON logs(user_id, logged_at)",
    r#"
    CREATE TABLE IF NOT EXISTS reflections (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        period_start TEXT NOT NULL,
        period_end TEXT NOT NULL,
        went_well TEXT NOT NULL,
        to_improve TEXT NOT NULL,
        next_actions TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reflections_user ON reflections(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS ai_analysis_reports (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        reflection_id TEXT,
        summary TEXT NOT NULL,
        strengths TEXT NOT NULL,
        improvements TEXT NOT NULL,
        suggestions TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reports_user ON ai_analysis_reports(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS action_plans (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        report_id TEXT,
        title TEXT NOT NULL,
        items_json TEXT NOT NULL DEFAULT '[]',
        status TEXT NOT NULL DEFAULT 'open',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_action_plans_user ON action_plans(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS mentor_notes (
        id TEXT PRIMARY KEY NOT NULL,
        mentor_id TEXT NOT NULL,
        client_id TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_mentor_notes_pair ON mentor_notes(mentor_id, client_id)",
    r#"
    CREATE TABLE IF NOT EXISTS data_view_logs (
        id TEXT PRIMARY KEY NOT NULL,
        mentor_id TEXT NOT NULL,
        client_id TEXT NOT NULL,
        data_type TEXT NOT NULL,
        record_ids_json TEXT NOT NULL DEFAULT '[]',
        action TEXT NOT NULL DEFAULT 'view',
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_view_logs_pair ON data_view_logs(mentor_id, client_id)",
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        message TEXT NOT NULL,
        read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, read)",
    r#"
    CREATE TABLE IF NOT EXISTS chat_messages (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        mode TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_chat_user_mode ON chat_messages(user_id, mode, created_at)",
];

/// Create all tables and indexes if they do not exist yet
pub fn init_schema(conn: &mut SqliteConnection) -> Result<()> {
    for stmt in DDL {
        sql_query(*stmt)
            .execute(conn)
            .map_err(|e| CompassError::Database(format!("Schema init failed: {e}")))?;
    }
    Ok(())
}
