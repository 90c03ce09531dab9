//! Configuration for the COM:PASS backend
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// COM:PASS - coaching platform REST backend
#[derive(Parser, Debug, Clone)]
#[command(name = "compass")]
#[command(about = "REST API server for the COM:PASS coaching platform")]
pub struct Args {
    /// Unique node identifier for this server instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "compass.db")]
    pub database_path: String,

    /// JWT secret for token signing (required unless --skip-auth)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "86400")]
    pub jwt_expiry_seconds: u64,

    /// Skip authentication and act as a fixed mock user.
    /// For browser-automation tests only - must never be enabled in production.
    #[arg(long, env = "SKIP_AUTH", default_value = "false")]
    pub skip_auth: bool,

    /// Transactional email API endpoint (e.g. https://api.resend.com/emails)
    #[arg(long, env = "EMAIL_API_URL")]
    pub email_api_url: Option<String>,

    /// API key for the transactional email service
    #[arg(long, env = "EMAIL_API_KEY")]
    pub email_api_key: Option<String>,

    /// From address for outbound email
    #[arg(long, env = "EMAIL_FROM", default_value = "noreply@compass.example")]
    pub email_from: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Fixed user id substituted for every request when --skip-auth is set.
pub const SKIP_AUTH_USER_ID: &str = "00000000-0000-0000-0000-0000000000e2";

impl Args {
    /// Get effective JWT secret (uses an insecure default when auth is skipped)
    pub fn jwt_secret(&self) -> String {
        if self.skip_auth {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "test-only-insecure-secret".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("JWT_SECRET is required when authentication is enabled")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.skip_auth && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required when authentication is enabled".to_string());
        }

        if self.email_api_url.is_some() && self.email_api_key.is_none() {
            return Err("EMAIL_API_KEY is required when EMAIL_API_URL is set".to_string());
        }

        Ok(())
    }
}
