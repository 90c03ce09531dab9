//! AI analysis report operations

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, AnalysisReport, NewAnalysisReport};
use super::schema::ai_analysis_reports as reports;
use crate::types::{CompassError, Result};

/// Persisted output of an analysis run
#[derive(Debug, Clone)]
pub struct CreateReportInput<'a> {
    pub reflection_id: Option<&'a str>,
    pub summary: &'a str,
    pub strengths: &'a str,
    pub improvements: &'a str,
    pub suggestions: &'a str,
}

/// Reports for a user, newest first, bounded
pub fn list_reports(
    conn: &mut SqliteConnection,
    user_id: &str,
    limit: i64,
) -> Result<Vec<AnalysisReport>> {
    reports::table
        .filter(reports::user_id.eq(user_id))
        .order(reports::created_at.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

pub fn create_report(
    conn: &mut SqliteConnection,
    user_id: &str,
    input: CreateReportInput<'_>,
) -> Result<AnalysisReport> {
    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_report = NewAnalysisReport {
        id: &id,
        user_id,
        reflection_id: input.reflection_id,
        summary: input.summary,
        strengths: input.strengths,
        improvements: input.improvements,
        suggestions: input.suggestions,
        created_at: &now,
    };

    diesel::insert_into(reports::table)
        .values(&new_report)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    reports::table
        .filter(reports::id.eq(&id))
        .first(conn)
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}
