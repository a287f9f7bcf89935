//! WebSocket authentication: validates the identity token before upgrade.

use std::sync::Arc;

use mentorlink_auth::jwt::JwtDecoder;
use mentorlink_core::error::AppError;
use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserRole;

/// Authenticated connection info extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedConnection {
    /// User ID.
    pub user_id: UserId,
    /// User role.
    pub role: UserRole,
    /// Display name.
    pub display_name: String,
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection from a `?token=` value or bearer header.
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedConnection, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing authentication token"))?;
        let claims = self.decoder.decode(token)?;

        Ok(AuthenticatedConnection {
            user_id: claims.user_id(),
            role: claims.role,
            display_name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_auth::JwtEncoder;
    use mentorlink_core::ErrorKind;
    use mentorlink_core::config::AuthConfig;

    #[test]
    fn test_authenticate() {
        let config = AuthConfig::default();
        let auth = WsAuthenticator::new(Arc::new(JwtDecoder::new(&config)));
        let user = UserId::new();
        let (token, _) = JwtEncoder::new(&config)
            .issue(user, UserRole::Mentee, "Mia")
            .unwrap();

        let conn = auth.authenticate(Some(&token)).unwrap();
        assert_eq!(conn.user_id, user);
        assert_eq!(conn.display_name, "Mia");

        for bad in [None, Some(""), Some("garbage")] {
            let err = auth.authenticate(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }
}
