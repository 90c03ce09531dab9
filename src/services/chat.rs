//! AI assistant chat service
//!
//! Four conversation modes, each with its own coaching stance. The provider
//! is a trait so an LLM backend can be plugged in; the default implementation
//! replies from mode-specific templates and echoes enough of the user's
//! message to keep the conversation grounded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::db::models::ChatMessage;
use crate::types::{CompassError, Result};

/// Conversation mode for the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    GoalSetting,
    Reflection,
    Motivation,
    FreeTalk,
}

impl ChatMode {
    pub const ALL: [ChatMode; 4] = [
        ChatMode::GoalSetting,
        ChatMode::Reflection,
        ChatMode::Motivation,
        ChatMode::FreeTalk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::GoalSetting => "goal_setting",
            ChatMode::Reflection => "reflection",
            ChatMode::Motivation => "motivation",
            ChatMode::FreeTalk => "free_talk",
        }
    }

    /// Parse a wire value; unknown modes are a validation error
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "goal_setting" => Ok(ChatMode::GoalSetting),
            "reflection" => Ok(ChatMode::Reflection),
            "motivation" => Ok(ChatMode::Motivation),
            "free_talk" => Ok(ChatMode::FreeTalk),
            other => Err(CompassError::Validation(format!(
                "Unknown chat mode: {other}"
            ))),
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates assistant replies for a chat turn
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Produce the assistant's reply to `message`, given the prior history
    /// for this mode (oldest first).
    async fn reply(
        &self,
        mode: ChatMode,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String>;
}

/// Default template-based provider
pub struct TemplateChatProvider;

#[async_trait]
impl ChatProvider for TemplateChatProvider {
    async fn reply(
        &self,
        mode: ChatMode,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        debug!(mode = %mode, history_len = history.len(), "Generating template reply");

        let excerpt: String = message.chars().take(120).collect();
        let reply = match mode {
            ChatMode::GoalSetting => format!(
                "Let's shape that into a goal. You said: \"{excerpt}\". \
                 What would success look like, and by when? Try phrasing it as one \
                 sentence with a target date, then we can break it into tasks."
            ),
            ChatMode::Reflection => format!(
                "Thanks for sharing. Thinking about \"{excerpt}\": what went well \
                 there, and what would you do differently next time? Writing both \
                 down turns the experience into something you can reuse."
            ),
            ChatMode::Motivation => format!(
                "You're putting in the work, and that counts. \"{excerpt}\" shows \
                 you're engaged with it. Pick the smallest next step you could \
                 finish today; momentum beats intensity."
            ),
            ChatMode::FreeTalk => format!(
                "I hear you: \"{excerpt}\". Tell me more, or if you'd like, we can \
                 switch to goal setting or reflection and work on it together."
            ),
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        for mode in ChatMode::ALL {
            assert_eq!(ChatMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_unknown_mode_rejected() {
        let err = ChatMode::parse("career_advice").unwrap_err();
        assert!(matches!(err, CompassError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reply_varies_by_mode() {
        let provider = TemplateChatProvider;
        let a = provider
            .reply(ChatMode::GoalSetting, &[], "run a marathon")
            .await
            .unwrap();
        let b = provider
            .reply(ChatMode::Motivation, &[], "run a marathon")
            .await
            .unwrap();

        assert!(a.contains("run a marathon"));
        assert!(b.contains("run a marathon"));
        assert_ne!(a, b);
    }
}
