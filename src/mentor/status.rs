//! Client status classification and progress percentages
//!
//! Single shared implementations used by both the dashboard and the
//! client-detail paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days without activity before a client is considered stagnant
pub const STAGNANT_DAYS: i64 = 14;
/// Days without activity before a client needs follow-up
pub const FOLLOWUP_DAYS: i64 = 21;

/// Activity-recency label for a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    OnTrack,
    Stagnant,
    NeedsFollowup,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientStatus::OnTrack => write!(f, "on_track"),
            ClientStatus::Stagnant => write!(f, "stagnant"),
            ClientStatus::NeedsFollowup => write!(f, "needs_followup"),
        }
    }
}

/// Classify a client by most recent activity.
///
/// No activity at all means follow-up. At exactly 14 or 21 days the more
/// severe label wins (>= comparison).
pub fn determine_client_status(
    last_activity: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ClientStatus {
    let Some(last) = last_activity else {
        return ClientStatus::NeedsFollowup;
    };

    let days = (now - last).num_days();
    if days >= FOLLOWUP_DAYS {
        ClientStatus::NeedsFollowup
    } else if days >= STAGNANT_DAYS {
        ClientStatus::Stagnant
    } else {
        ClientStatus::OnTrack
    }
}

/// completed/total as a rounded percentage; 0 when total is 0
pub fn progress_percentage(completed: i64, total: i64) -> i32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i32
}

/// Average of goal and task completion percentages, rounded
pub fn overall_progress(goal_pct: i32, task_pct: i32) -> i32 {
    ((goal_pct as f64 + task_pct as f64) / 2.0).round() as i32
}

/// Parse a stored ISO-8601 TEXT timestamp; invalid values count as no activity
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_no_activity_needs_followup() {
        let now = Utc::now();
        assert_eq!(determine_client_status(None, now), ClientStatus::NeedsFollowup);
    }

    #[test]
    fn test_recent_activity_on_track() {
        let now = Utc::now();
        assert_eq!(
            determine_client_status(Some(now - Duration::days(1)), now),
            ClientStatus::OnTrack
        );
        assert_eq!(
            determine_client_status(Some(now - Duration::days(13)), now),
            ClientStatus::OnTrack
        );
    }

    #[test]
    fn test_stagnant_range() {
        let now = Utc::now();
        assert_eq!(
            determine_client_status(Some(now - Duration::days(15)), now),
            ClientStatus::Stagnant
        );
        // Boundary: exactly 14 days resolves to the more severe label
        assert_eq!(
            determine_client_status(Some(now - Duration::days(14)), now),
            ClientStatus::Stagnant
        );
    }

    #[test]
    fn test_followup_range() {
        let now = Utc::now();
        assert_eq!(
            determine_client_status(Some(now - Duration::days(22)), now),
            ClientStatus::NeedsFollowup
        );
        // Boundary: exactly 21 days
        assert_eq!(
            determine_client_status(Some(now - Duration::days(21)), now),
            ClientStatus::NeedsFollowup
        );
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(3, 5), 60);
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 7), 0);
        assert_eq!(progress_percentage(7, 7), 100);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
    }

    #[test]
    fn test_overall_progress_rounds() {
        assert_eq!(overall_progress(60, 50), 55);
        assert_eq!(overall_progress(0, 0), 0);
        assert_eq!(overall_progress(33, 66), 50); // 49.5 rounds up
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2026-08-01T00:00:00Z").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClientStatus::NeedsFollowup).unwrap(),
            "\"needs_followup\""
        );
        assert_eq!(ClientStatus::OnTrack.to_string(), "on_track");
    }
}
