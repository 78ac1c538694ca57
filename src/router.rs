use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use masnaa_core::{AppError, Message};
use masnaa_observability::{logging_middleware, metrics_middleware};
use serde_json::json;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::modules::auth::router::init_auth_router;
use crate::modules::permissions::router::init_permissions_router;
use crate::modules::purchase_orders::router::init_purchase_orders_router;
use crate::modules::roles::router::init_roles_router;
use crate::modules::suppliers::router::init_suppliers_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => Json(json!({ "status": "ok", "database": "up" })).into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down" })),
            )
                .into_response()
        }
    }
}

/// Replaces the governor's plain-text 429 with the localized error body.
async fn localize_rate_limit(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let retry_after = response.headers().get(header::RETRY_AFTER).cloned();
    let mut localized = AppError::too_many_requests(Message::TooManyRequests).into_response();
    if let Some(value) = retry_after {
        localized.headers_mut().insert(header::RETRY_AFTER, value);
    }
    localized
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let mut auth_router = init_auth_router();
    if let Some(config) = state.rate_limit_config.auth_governor_config() {
        auth_router = auth_router
            .layer(GovernorLayer::new(Arc::new(config)))
            .layer(middleware::map_response(localize_rate_limit));
    }

    let mut api_router = Router::new()
        .nest("/auth", auth_router)
        .nest("/permissions", init_permissions_router())
        .nest("/roles", init_roles_router())
        .nest("/users", init_users_router())
        .nest("/suppliers", init_suppliers_router())
        .nest("/purchase-orders", init_purchase_orders_router());
    if let Some(config) = state.rate_limit_config.general_governor_config() {
        api_router = api_router
            .layer(GovernorLayer::new(Arc::new(config)))
            .layer(middleware::map_response(localize_rate_limit));
    }

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api", api_router)
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.server_config.request_timeout))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
