//! Masnaa observability: tracing setup, request logging and Prometheus metrics.
//!
//! Compiled in with the `observability` feature (default). Without it every entry
//! point below is a no-op except [`init_tracing`], which still installs console
//! logging. At runtime `OBSERVABILITY_ENABLED=false` has the same effect.
//!
//! ```no_run
//! use masnaa_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ...
//!     shutdown_tracer().await;
//! }
//! ```

use std::sync::OnceLock;

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// `OBSERVABILITY_ENABLED` (default on). Always `false` when compiled out.
pub fn is_observability_enabled() -> bool {
    cfg!(feature = "observability")
        && *OBSERVABILITY_ENABLED.get_or_init(|| {
            std::env::var("OBSERVABILITY_ENABLED")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(true)
        })
}

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use self::metrics::{
    init_metrics, metrics_app, metrics_middleware, track_authorization_denied,
    track_login_failure, track_login_success, track_purchase_order_created,
    track_role_permissions_replaced, track_session_issued,
};

#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    /// Stands in for the Prometheus handle; never constructed.
    #[derive(Clone, Debug)]
    pub enum PrometheusHandle {}

    pub fn init_tracing() {
        crate::basic_logging::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn metrics_app(handle: PrometheusHandle) -> Router {
        match handle {}
    }

    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &'static str) {}
    pub fn track_session_issued() {}
    pub fn track_authorization_denied(_module: &'static str, _action: &'static str) {}
    pub fn track_role_permissions_replaced() {}
    pub fn track_purchase_order_created() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
