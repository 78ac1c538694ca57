use std::net::SocketAddr;

use dotenvy::dotenv;
use masnaa::router::init_router;
use masnaa::state::init_app_state;
use masnaa_observability::{init_metrics, init_tracing, metrics_app, shutdown_tracer};
use tracing::{error, info};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn serve_metrics(handle: masnaa_observability::PrometheusHandle, addr: String) {
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind metrics server");
            return;
        }
    };

    info!("Metrics server running on http://{}/metrics", addr);
    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
        error!(error = %e, "Metrics server stopped");
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to start");
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    if let Some(handle) = init_metrics() {
        let addr = format!(
            "{}:{}",
            state.server_config.host, state.server_config.metrics_port
        );
        tokio::spawn(serve_metrics(handle, addr));
    }

    let db = state.db.clone();
    let addr = state.server_config.bind_address();
    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!(error = %e, "Server error");
    }

    masnaa_db::close(&db).await;
    shutdown_tracer().await;
}
