//! JWT token generation and validation
//!
//! Stateless bearer tokens carrying the user id, email and role.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::CompassError;

/// JWT claims for an authenticated COM:PASS user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (uuid)
    pub sub: String,
    /// User email
    pub email: String,
    /// Role: "client" or "mentor"
    pub role: String,
    /// Whether the user has the mentor capability
    pub is_mentor: bool,
    /// Expiry (unix seconds)
    pub exp: u64,
    /// Issued at (unix seconds)
    pub iat: u64,
}

/// Result of verifying a token
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

/// Issues and verifies JWT tokens with a shared HMAC secret
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a token for a user. Returns (token, expires_at).
    pub fn issue_token(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        is_mentor: bool,
    ) -> Result<(String, u64), CompassError> {
        let now = Utc::now().timestamp() as u64;
        let expires_at = now + self.expiry_seconds;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            is_mentor,
            exp: expires_at,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CompassError::Auth(format!("Failed to sign token: {e}")))?;

        Ok((token, expires_at))
    }

    /// Verify a token and extract its claims
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => TokenValidationResult {
                valid: true,
                claims: Some(data.claims),
                error: None,
            },
            Err(e) => TokenValidationResult {
                valid: false,
                claims: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| h.strip_prefix("Bearer ")).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let jwt = JwtValidator::new("test-secret", 3600);
        let (token, expires_at) = jwt
            .issue_token("user-1", "a@example.com", "client", false)
            .unwrap();

        assert!(expires_at > Utc::now().timestamp() as u64);

        let result = jwt.verify_token(&token);
        assert!(result.valid);
        let claims = result.claims.unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.role, "client");
        assert!(!claims.is_mentor);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = JwtValidator::new("secret-a", 3600);
        let (token, _) = jwt
            .issue_token("user-1", "a@example.com", "mentor", true)
            .unwrap();

        let other = JwtValidator::new("secret-b", 3600);
        let result = other.verify_token(&token);
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(
            extract_token_from_header(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_header(Some("Basic foo")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
