//! Session token creation and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use masnaa_config::JwtConfig;
use masnaa_core::{AppError, Message};

use crate::claims::SessionClaims;

/// Identity data embedded in a new session token.
#[derive(Debug, Clone, Copy)]
pub struct SessionSubject<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub roles: &'a [String],
}

pub fn create_session_token(
    subject: SessionSubject<'_>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.session_expiry.max(0) as usize;

    let claims = SessionClaims {
        user_id: subject.user_id,
        email: subject.email.to_string(),
        name: subject.name.to_string(),
        role: subject.role.to_string(),
        roles: subject.roles.to_vec(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

/// Rejects tampered, malformed or expired tokens with a 401.
pub fn verify_session_token(token: &str, jwt_config: &JwtConfig) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(Message::SessionExpired))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::with_secret("test-secret-key-for-session-tokens-0123456789").unwrap()
    }

    fn roles() -> Vec<String> {
        vec!["manager".to_string(), "viewer".to_string()]
    }

    fn subject(roles: &[String]) -> SessionSubject<'_> {
        SessionSubject {
            user_id: Uuid::from_u128(42),
            email: "manager@factory.example",
            name: "Plant Manager",
            role: "manager",
            roles,
        }
    }

    #[test]
    fn test_create_and_verify() {
        let config = test_config();
        let roles = roles();
        let token = create_session_token(subject(&roles), &config).unwrap();

        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.user_id, Uuid::from_u128(42));
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let roles = roles();
        let token = create_session_token(subject(&roles), &test_config()).unwrap();
        let other = JwtConfig::with_secret("another-secret-key-that-is-long-enough!!").unwrap();

        let err = verify_session_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.message(), Some(Message::SessionExpired));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_session_token("not.a.jwt", &test_config()).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let roles = roles();
        // Expired well past the default 60s leeway.
        let claims = SessionClaims {
            user_id: Uuid::from_u128(1),
            email: "a@b.example".to_string(),
            name: "A".to_string(),
            role: "viewer".to_string(),
            roles,
            exp: (Utc::now().timestamp() - 3600) as usize,
            iat: (Utc::now().timestamp() - 7200) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_session_token(&token, &config).is_err());
    }
}
