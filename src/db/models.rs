//! Diesel model definitions for database tables
//!
//! - Queryable structs: for SELECT queries (reading data)
//! - Insertable structs: for INSERT queries (writing data)
//!
//! Rows that go straight into JSON responses serialize as camelCase to match
//! the web client's field naming.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema::*;

// ============================================================================
// Timestamp Helpers (SQLite stores timestamps as TEXT)
// ============================================================================

/// Get current UTC timestamp as ISO 8601 string for SQLite TEXT columns
pub fn current_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

// ============================================================================
// User Models
// ============================================================================

/// User account row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_mentor: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// New user for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub is_mentor: i32,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

// ============================================================================
// Relationship Models
// ============================================================================

/// Mentor-client pairing row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = mentor_client_relationships)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub mentor_id: String,
    pub client_id: String,
    pub status: String,
    pub invited_at: String,
    pub accepted_at: Option<String>,
}

/// New relationship for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mentor_client_relationships)]
pub struct NewRelationship<'a> {
    pub id: &'a str,
    pub mentor_id: &'a str,
    pub client_id: &'a str,
    pub status: &'a str,
    pub invited_at: &'a str,
    pub accepted_at: Option<&'a str>,
}

/// Relationship status values
pub mod relationship_status {
    pub const PENDING: &str = "pending";
    pub const ACTIVE: &str = "active";
    pub const DECLINED: &str = "declined";
}

// ============================================================================
// Permission Models
// ============================================================================

/// Per-relationship data-access permission row.
///
/// The five flags are independent; `is_active` is a snapshot of the
/// relationship status taken when the row is first created and is never
/// updated afterward.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = client_data_access_permissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DataAccessPermission {
    pub id: String,
    pub relationship_id: String,
    pub client_id: String,
    pub allow_goals: i32,
    pub allow_tasks: i32,
    pub allow_logs: i32,
    pub allow_reflections: i32,
    pub allow_ai_reports: i32,
    pub is_active: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// New permission row for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = client_data_access_permissions)]
pub struct NewDataAccessPermission<'a> {
    pub id: &'a str,
    pub relationship_id: &'a str,
    pub client_id: &'a str,
    pub allow_goals: i32,
    pub allow_tasks: i32,
    pub allow_logs: i32,
    pub allow_reflections: i32,
    pub allow_ai_reports: i32,
    pub is_active: i32,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

// ============================================================================
// Plan-Do Models
// ============================================================================

/// Goal row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub target_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New goal for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = goals)]
pub struct NewGoal<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub target_date: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Goal with its task rollup (API response)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalWithProgress {
    #[serde(flatten)]
    pub goal: Goal,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub progress_percentage: i32,
}

/// Task row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub goal_id: String,
    pub user_id: String,
    pub title: String,
    pub status: String,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New task for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
    pub id: &'a str,
    pub goal_id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub status: &'a str,
    pub due_date: Option<&'a str>,
    pub completed_at: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

// ============================================================================
// Check-Action Models
// ============================================================================

/// Daily activity log row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub mood: Option<String>,
    pub logged_at: String,
    pub created_at: String,
}

/// New log for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = logs)]
pub struct NewLog<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub content: &'a str,
    pub mood: Option<&'a str>,
    pub logged_at: &'a str,
    pub created_at: &'a str,
}

/// Periodic reflection row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = reflections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: String,
    pub user_id: String,
    pub period_start: String,
    pub period_end: String,
    pub went_well: String,
    pub to_improve: String,
    pub next_actions: String,
    pub created_at: String,
}

/// New reflection for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reflections)]
pub struct NewReflection<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub period_start: &'a str,
    pub period_end: &'a str,
    pub went_well: &'a str,
    pub to_improve: &'a str,
    pub next_actions: &'a str,
    pub created_at: &'a str,
}

/// AI analysis report row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ai_analysis_reports)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: String,
    pub user_id: String,
    pub reflection_id: Option<String>,
    pub summary: String,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
    pub created_at: String,
}

/// New analysis report for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ai_analysis_reports)]
pub struct NewAnalysisReport<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub reflection_id: Option<&'a str>,
    pub summary: &'a str,
    pub strengths: &'a str,
    pub improvements: &'a str,
    pub suggestions: &'a str,
    pub created_at: &'a str,
}

/// Action plan row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = action_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub id: String,
    pub user_id: String,
    pub report_id: Option<String>,
    pub title: String,
    pub items_json: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// New action plan for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = action_plans)]
pub struct NewActionPlan<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub report_id: Option<&'a str>,
    pub title: &'a str,
    pub items_json: &'a str,
    pub status: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

// ============================================================================
// Mentor-Side Models
// ============================================================================

/// Mentor's private note on a client
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = mentor_notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct MentorNote {
    pub id: String,
    pub mentor_id: String,
    pub client_id: String,
    pub content: String,
    pub created_at: String,
}

/// New mentor note for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mentor_notes)]
pub struct NewMentorNote<'a> {
    pub id: &'a str,
    pub mentor_id: &'a str,
    pub client_id: &'a str,
    pub content: &'a str,
    pub created_at: &'a str,
}

/// Audit row for a mentor viewing client data
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = data_view_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DataViewLog {
    pub id: String,
    pub mentor_id: String,
    pub client_id: String,
    pub data_type: String,
    pub record_ids_json: String,
    pub action: String,
    pub created_at: String,
}

/// New audit row for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = data_view_logs)]
pub struct NewDataViewLog<'a> {
    pub id: &'a str,
    pub mentor_id: &'a str,
    pub client_id: &'a str,
    pub data_type: &'a str,
    pub record_ids_json: &'a str,
    pub action: &'a str,
    pub created_at: &'a str,
}

// ============================================================================
// Notification / Chat Models
// ============================================================================

/// Notification row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub read: i32,
    pub created_at: String,
}

/// New notification for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub kind: &'a str,
    pub message: &'a str,
    pub read: i32,
    pub created_at: &'a str,
}

/// AI assistant chat message row
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub mode: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// New chat message for INSERT
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessage<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub mode: &'a str,
    pub role: &'a str,
    pub content: &'a str,
    pub created_at: &'a str,
}
