//! Services layer for COM:PASS
//!
//! Business-logic services with external or pluggable backends:
//!
//! - **Analysis**: reflection analysis reports (pluggable provider)
//! - **Chat**: AI assistant conversation modes (pluggable provider)
//! - **Mailer**: transactional email for the password-reset flow

pub mod analysis;
pub mod chat;
pub mod mailer;

pub use analysis::{AnalysisInput, AnalysisOutput, AnalysisProvider, TemplateAnalysisProvider};
pub use chat::{ChatMode, ChatProvider, TemplateChatProvider};
pub use mailer::{mailer_from_args, DisabledMailer, HttpMailer, Mailer};
