//! Authentication for COM:PASS
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - Temporary password generation for the reset flow

pub mod jwt;
pub mod password;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenValidationResult};
pub use password::{generate_temp_password, hash_password, verify_password, MIN_PASSWORD_LEN};
