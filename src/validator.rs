use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use masnaa_core::{AppError, Detailed, Message};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

fn describe(path: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(msg) => msg.to_string(),
        None if error.code == "blank" => format!("{} must not be blank", path),
        None => format!("{} is invalid", path),
    }
}

/// Flattens field errors, including those of nested items (`items[0].quantity`).
fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|error| describe(&path, error)));
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_errors("", errors, &mut messages);
    messages.join(", ")
}

/// JSON body extractor that runs `validator` rules.
///
/// Unparseable bodies are rejected with 400, rule violations with 422. Both carry an
/// Arabic summary; the English text names the offending fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::bad_request(Detailed::new(
                        Message::InvalidRequestBody,
                        format!("{} is required", field),
                    ));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(Detailed::new(
                        Message::InvalidRequestBody,
                        "Missing 'Content-Type: application/json' header",
                    ));
                }

                AppError::bad_request(Message::InvalidRequestBody)
            })?;

        value.validate().map_err(|errors| {
            AppError::unprocessable(Detailed::new(
                Message::ValidationFailed,
                format_errors(&errors),
            ))
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use http_body_util::BodyExt;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "name is too short"))]
        name: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Line {
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Order {
        #[validate(nested)]
        lines: Vec<Line>,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"bolts"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "bolts");
    }

    #[tokio::test]
    async fn test_rule_violation_is_unprocessable() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"x"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), Some(Message::ValidationFailed));
        assert_eq!(err.error.to_string(), "name is too short");

        let body = axum::response::IntoResponse::into_response(err)
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], Message::ValidationFailed.ar());
        assert_eq!(body["error_en"], "name is too short");
    }

    #[tokio::test]
    async fn test_nested_errors_name_the_item() {
        let body = r#"{"lines":[{"quantity":2},{"quantity":0}]}"#;
        let err = ValidatedJson::<Order>::from_request(json_request(body), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error.to_string(), "lines[1].quantity is invalid");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), Some(Message::InvalidRequestBody));
        assert_eq!(err.error.to_string(), "name is required");
    }

    #[tokio::test]
    async fn test_malformed_json_is_localized() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), Some(Message::InvalidRequestBody));
    }
}
