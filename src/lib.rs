//! COM:PASS - coaching platform backend
//!
//! A REST API for Plan-Do / Check-Action coaching: personal goals and tasks,
//! daily logs, periodic reflections, AI-assisted analysis, and mentor-client
//! relationships with per-category data-access permissions.
//!
//! ## Surfaces
//!
//! - **Auth**: register/login with JWT bearer tokens, password reset by email
//! - **Plan**: goals with nested tasks and computed progress
//! - **Journal**: daily logs and Check-Action reflections
//! - **Insight**: AI analysis reports, action plans, and the chat assistant
//! - **Mentor**: invitations, dashboard, permission-gated client detail, notes
//! - **Settings**: profile, password, account deletion

pub mod auth;
pub mod config;
pub mod db;
pub mod mentor;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{CompassError, Result};
