//! HTTP gateway: routing, auth layering, OpenAPI, server bootstrap.

pub mod handlers;
pub mod openapi;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::api_key_middleware;
use state::AppState;

/// Build the full application router.
///
/// `/health` is public; every `/transfers` route sits behind the
/// `x-api-key` middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/transfers", post(handlers::create_transfer))
        .route("/transfers", get(handlers::list_transfers))
        .route("/transfers/{id}", get(handlers::get_transfer))
        .route("/transfers/{id}/process", post(handlers::process_transfer))
        .route("/transfers/{id}/cancel", post(handlers::cancel_transfer))
        .route("/transfers/{id}/audit", get(handlers::get_transfer_audit))
        .layer(from_fn_with_state(state.clone(), api_key_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process exits
pub async fn run_server(state: AppState, host: &str, port: u16) {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!("   Hint: Port {} may already be in use", port);
            std::process::exit(1);
        }
    };

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
