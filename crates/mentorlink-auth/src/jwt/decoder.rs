//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use mentorlink_core::config::AuthConfig;
use mentorlink_core::error::AppError;

use super::claims::Claims;

/// Validates identity tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    ///
    /// Every failure maps to `AUTHENTICATION`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::jwt::JwtEncoder;
    use mentorlink_core::ErrorKind;
    use mentorlink_core::types::UserId;
    use mentorlink_entity::user::UserRole;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let cfg = config("test-secret");
        let user = UserId::new();
        let (token, exp) = JwtEncoder::new(&cfg)
            .issue(user, UserRole::Mentor, "Omar")
            .unwrap();

        let claims = JwtDecoder::new(&cfg).decode(&token).unwrap();
        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.role, UserRole::Mentor);
        assert_eq!(claims.name, "Omar");
        assert_eq!(claims.expires_at().timestamp(), exp.timestamp());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (token, _) = JwtEncoder::new(&config("issuer"))
            .issue(UserId::new(), UserRole::Mentee, "Mia")
            .unwrap();
        let err = JwtDecoder::new(&config("someone-else"))
            .decode(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_and_garbage_tokens() {
        let cfg = config("test-secret");
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: UserId::new(),
            role: UserRole::Mentee,
            name: "Mia".into(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4(),
        };
        let token = JwtEncoder::new(&cfg).sign(&expired).unwrap();

        let decoder = JwtDecoder::new(&cfg);
        let err = decoder.decode(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Token has expired");

        let err = decoder.decode("not.a.jwt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
