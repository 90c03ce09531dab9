//! Reflection analysis service
//!
//! Turns a client's recent reflections and logs into a structured report
//! (summary, strengths, improvements, suggestions). The provider is a trait
//! so a hosted LLM backend can be swapped in; the default implementation is
//! deterministic and template-based, deriving its text from the submitted
//! reflection content.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::db::models::{Log, Reflection};
use crate::types::Result;

/// Input snapshot for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// The reflection that triggered the run, if any
    pub reflection: Option<Reflection>,
    /// Recent activity logs, newest first
    pub recent_logs: Vec<Log>,
}

/// Structured analysis output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub summary: String,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
}

/// Produces an analysis report from a client's recent activity
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisOutput>;
}

/// Default template-based provider.
///
/// No external calls; output is assembled from the input so the rest of the
/// pipeline (persistence, mentor visibility, audit) is exercised end to end.
pub struct TemplateAnalysisProvider;

#[async_trait]
impl AnalysisProvider for TemplateAnalysisProvider {
    async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisOutput> {
        debug!(
            has_reflection = input.reflection.is_some(),
            log_count = input.recent_logs.len(),
            "Running template analysis"
        );

        let summary = match &input.reflection {
            Some(r) => format!(
                "Over the period {} to {} you recorded {} activity log(s) and completed a reflection.",
                r.period_start,
                r.period_end,
                input.recent_logs.len()
            ),
            None => format!(
                "You recorded {} recent activity log(s). No reflection was submitted for this run.",
                input.recent_logs.len()
            ),
        };

        let strengths = match &input.reflection {
            Some(r) if !r.went_well.trim().is_empty() => format!(
                "You identified concrete wins: {}. Naming what worked makes it repeatable.",
                r.went_well.trim()
            ),
            _ => "Consistent logging itself is a strength: it keeps progress visible.".to_string(),
        };

        let improvements = match &input.reflection {
            Some(r) if !r.to_improve.trim().is_empty() => format!(
                "You flagged areas to work on: {}. Pick one and make it the focus of the next period.",
                r.to_improve.trim()
            ),
            _ => "Consider writing down one thing to improve after each work session.".to_string(),
        };

        let suggestions = match &input.reflection {
            Some(r) if !r.next_actions.trim().is_empty() => format!(
                "Turn your planned next actions ({}) into small, dated tasks under a goal.",
                r.next_actions.trim()
            ),
            _ => "Break your current goal into tasks with due dates and complete one this week."
                .to_string(),
        };

        Ok(AnalysisOutput {
            summary,
            strengths,
            improvements,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflection() -> Reflection {
        Reflection {
            id: "r1".into(),
            user_id: "u1".into(),
            period_start: "2026-08-01".into(),
            period_end: "2026-08-07".into(),
            went_well: "Shipped the draft".into(),
            to_improve: "Starting earlier".into(),
            next_actions: "Outline chapter two".into(),
            created_at: "2026-08-07T12:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn test_template_output_uses_reflection_content() {
        let provider = TemplateAnalysisProvider;
        let output = provider
            .analyze(&AnalysisInput {
                reflection: Some(reflection()),
                recent_logs: vec![],
            })
            .await
            .unwrap();

        assert!(output.summary.contains("2026-08-01"));
        assert!(output.strengths.contains("Shipped the draft"));
        assert!(output.improvements.contains("Starting earlier"));
        assert!(output.suggestions.contains("Outline chapter two"));
    }

    #[tokio::test]
    async fn test_template_output_without_reflection() {
        let provider = TemplateAnalysisProvider;
        let output = provider
            .analyze(&AnalysisInput {
                reflection: None,
                recent_logs: vec![],
            })
            .await
            .unwrap();

        assert!(output.summary.contains("No reflection"));
        assert!(!output.suggestions.is_empty());
    }
}
