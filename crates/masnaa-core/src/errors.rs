//! Application error type with HTTP response conversion.
//!
//! `AppError` pairs a status code with an [`anyhow::Error`]. When the inner error is a
//! localized [`Message`], the response body carries both the Arabic and the English
//! text. A [`Detailed`] error keeps the Arabic summary of its message and puts the
//! specifics (which fields failed, and why) in the English text. Server errors are logged and replaced with a generic message so that nothing
//! internal leaks to the caller.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::i18n::Message;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Arabic message.
    pub error: String,
    /// English message.
    pub error_en: String,
}

/// A localized message plus English detail for the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct Detailed {
    pub message: Message,
    pub detail: String,
}

impl Detailed {
    pub fn new(message: Message, detail: impl Into<String>) -> Self {
        Self {
            message,
            detail: detail.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn too_many_requests<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::TOO_MANY_REQUESTS, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// The localized message carried by this error, if any.
    pub fn message(&self) -> Option<Message> {
        self.error
            .downcast_ref::<Message>()
            .copied()
            .or_else(|| self.error.downcast_ref::<Detailed>().map(|d| d.message))
    }

    fn body(&self) -> ErrorResponse {
        if self.status.is_server_error() {
            return ErrorResponse {
                error: Message::InternalError.ar(),
                error_en: Message::InternalError.en().to_string(),
            };
        }

        if let Some(detailed) = self.error.downcast_ref::<Detailed>() {
            return ErrorResponse {
                error: detailed.message.ar(),
                error_en: detailed.detail.clone(),
            };
        }

        match self.message() {
            Some(msg) => ErrorResponse {
                error: msg.ar(),
                error_en: msg.en().to_string(),
            },
            None => {
                let text = self.error.to_string();
                ErrorResponse {
                    error: text.clone(),
                    error_en: text,
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = %self.status.as_u16(),
                error = ?self.error,
                "Request failed with internal error"
            );
        }

        let body = self.body();
        (
            self.status,
            Json(json!({
                "error": body.error,
                "error_en": body.error_en,
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
