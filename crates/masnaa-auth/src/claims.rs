//! Session token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by the session token.
///
/// Roles are informational (display, client-side routing). Authorization is never
/// decided from these claims; permissions are resolved from the database on every
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    /// Highest-privilege role name, or `member` when the user holds none.
    pub role: String,
    /// Active role names, highest privilege first.
    pub roles: Vec<String>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let claims = SessionClaims {
            user_id: Uuid::nil(),
            email: "buyer@factory.example".to_string(),
            name: "Buyer".to_string(),
            role: "purchasing".to_string(),
            roles: vec!["purchasing".to_string(), "viewer".to_string()],
            exp: 2_000_000_000,
            iat: 1_999_000_000,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], Uuid::nil().to_string());
        assert_eq!(json["role"], "purchasing");
        assert_eq!(json["roles"][1], "viewer");
        assert!(json.get("user_id").is_none());

        let back: SessionClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }
}
