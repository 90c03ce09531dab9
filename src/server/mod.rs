//! HTTP server for COM:PASS

pub mod http;

pub use http::{authenticate, run, AppState, AuthContext};
