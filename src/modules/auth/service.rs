use masnaa_auth::{SessionSubject, create_session_token, primary_role};
use masnaa_config::JwtConfig;
use masnaa_core::{
    AppError, Message, hash_password, verify_against_dummy, verify_password,
};
use masnaa_models::{User, UserId};
use masnaa_observability::{track_login_failure, track_login_success, track_session_issued};
use sqlx::{FromRow, PgPool};
use tracing::{Span, info, instrument, warn};

use crate::modules::permissions::service::resolve_access;

use super::model::{ChangePasswordDto, LoginRequest, LoginResponse, MeResponse};

pub(crate) const USER_COLUMNS: &str =
    "id, email, name, is_active, role, last_login_at, created_at, updated_at";

#[derive(FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: Option<String>,
}

/// Why a login was refused. Only ever logged and counted; the caller always sees
/// [`Message::InvalidCredentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginFailure {
    UnknownEmail,
    Inactive,
    NoPassword,
    WrongPassword,
}

impl LoginFailure {
    fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownEmail => "unknown_email",
            Self::Inactive => "inactive",
            Self::NoPassword => "no_password",
            Self::WrongPassword => "wrong_password",
        }
    }
}

/// Runs exactly one bcrypt verification whatever the account state.
fn check_credentials(
    account: Option<UserWithPassword>,
    password: &str,
) -> Result<User, LoginFailure> {
    let Some(account) = account else {
        verify_against_dummy(password);
        return Err(LoginFailure::UnknownEmail);
    };

    let Some(hashed) = account.password.as_deref().filter(|h| !h.is_empty()) else {
        verify_against_dummy(password);
        return Err(LoginFailure::NoPassword);
    };

    // Verify before looking at is_active so the timing matches a live account.
    let matches = verify_password(password, hashed).unwrap_or(false);

    if !account.user.is_active {
        return Err(LoginFailure::Inactive);
    }
    if !matches {
        return Err(LoginFailure::WrongPassword);
    }

    Ok(account.user)
}

pub struct AuthService;

impl AuthService {
    /// Verifies credentials and issues a session token.
    ///
    /// Every refusal is the same 401. `last_login_at` is only written on success.
    /// The submitted email never reaches the span; `user.id` is filled in on success.
    #[instrument(skip(db, dto, jwt_config), fields(user.id = tracing::field::Empty))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let account = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE email = $1"
        ))
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let user = match check_credentials(account, &dto.password) {
            Ok(user) => user,
            Err(reason) => {
                warn!(reason = reason.as_str(), "Login refused");
                track_login_failure(reason.as_str());
                return Err(AppError::unauthorized(Message::InvalidCredentials));
            }
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .fetch_one(db)
        .await?;
        Span::current().record("user.id", tracing::field::display(user.id));

        let access = resolve_access(db, user.id).await?;
        let role = primary_role(&access.roles);
        let roles = access.role_names();

        let token = create_session_token(
            SessionSubject {
                user_id: user.id.into_inner(),
                email: user.email.as_str(),
                name: &user.name,
                role: &role,
                roles: &roles,
            },
            jwt_config,
        )?;

        info!(user.id = %user.id, role = %role, "Login succeeded");
        track_login_success(&role);
        track_session_issued();

        Ok(LoginResponse {
            token,
            user,
            role,
            roles,
        })
    }

    /// Profile plus roles and permissions read fresh from the database.
    #[instrument(skip(db))]
    pub async fn get_me(db: &PgPool, user_id: UserId) -> Result<MeResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::UserNotFound))?;

        let access = resolve_access(db, user_id).await?;

        Ok(MeResponse {
            user,
            role: primary_role(&access.roles),
            roles: access.role_names(),
            permissions: access.permissions.grouped(),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: UserId,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(Message::UserNotFound))?;

        let matches = match current.as_deref() {
            Some(hashed) => verify_password(&dto.current_password, hashed).unwrap_or(false),
            None => verify_against_dummy(&dto.current_password),
        };
        if !matches {
            return Err(AppError::bad_request(Message::CurrentPasswordIncorrect));
        }

        let hashed = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&hashed)
            .bind(user_id)
            .execute(db)
            .await?;

        info!(user.id = %user_id, "Password changed");
        Ok(())
    }
}
