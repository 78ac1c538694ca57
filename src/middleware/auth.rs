use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use masnaa_auth::{SessionClaims, verify_session_token};
use masnaa_config::JwtConfig;
use masnaa_core::permissions::{Action, Module};
use masnaa_core::{AppError, Message};
use masnaa_models::UserId;

use crate::modules::permissions::service::ensure_active_user;
use crate::state::AppState;

/// Extractor for an authenticated session.
///
/// Accepts `Authorization: Bearer <token>` or the session cookie. The token only
/// establishes identity: the user must still exist and be active, and nothing in the
/// claims is used for authorization.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        UserId::from(self.0.user_id)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

/// Bearer header first, then the session cookie.
pub fn session_token(headers: &HeaderMap, jwt_config: &JwtConfig) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(&jwt_config.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.jwt_config)
            .ok_or_else(|| AppError::unauthorized(Message::Unauthenticated))?;

        let claims = verify_session_token(&token, &state.jwt_config)?;
        ensure_active_user(&state.db, UserId::from(claims.user_id)).await?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that admits the request only when the caller's stored
/// permissions include `(module, action)`.
///
/// Permissions are resolved from the database on every request.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $module:expr, $action:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = masnaa_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                let permissions = $crate::modules::permissions::service::resolve_permissions(
                    &state.db,
                    auth_user.user_id(),
                )
                .await?;

                if !permissions.allows($module, $action) {
                    tracing::warn!(
                        user.id = %auth_user.user_id(),
                        module = $module.as_str(),
                        action = $action.as_str(),
                        "Permission denied"
                    );
                    masnaa_observability::track_authorization_denied(
                        $module.as_str(),
                        $action.as_str(),
                    );
                    return Err(masnaa_core::AppError::forbidden(
                        masnaa_core::Message::Forbidden,
                    ));
                }

                Ok($name(auth_user))
            }
        }
    };
}

// Users
require_permission!(RequireUsersCreate, Module::Users, Action::Create);
require_permission!(RequireUsersRead, Module::Users, Action::Read);
require_permission!(RequireUsersUpdate, Module::Users, Action::Update);

// Roles
require_permission!(RequireRolesCreate, Module::Roles, Action::Create);
require_permission!(RequireRolesRead, Module::Roles, Action::Read);
require_permission!(RequireRolesUpdate, Module::Roles, Action::Update);
require_permission!(RequireRolesDelete, Module::Roles, Action::Delete);

// Suppliers
require_permission!(RequireSuppliersCreate, Module::Suppliers, Action::Create);
require_permission!(RequireSuppliersRead, Module::Suppliers, Action::Read);
require_permission!(RequireSuppliersUpdate, Module::Suppliers, Action::Update);
require_permission!(RequireSuppliersDelete, Module::Suppliers, Action::Delete);

// Purchase orders
require_permission!(RequirePurchaseOrdersCreate, Module::PurchaseOrders, Action::Create);
require_permission!(RequirePurchaseOrdersRead, Module::PurchaseOrders, Action::Read);
require_permission!(RequirePurchaseOrdersUpdate, Module::PurchaseOrders, Action::Update);
require_permission!(RequirePurchaseOrdersDelete, Module::PurchaseOrders, Action::Delete);
