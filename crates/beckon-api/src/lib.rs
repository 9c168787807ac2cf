pub mod handlers;
pub mod ws;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/presence", get(handlers::handle_presence))
        .route("/register", post(handlers::handle_register));

    Router::new()
        .route("/ws", get(ws::handle_upgrade))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: ApiState, bind_addr: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await?;
    tracing::info!(%bind_addr, port, "signaling server listening");
    serve_on(state, listener).await
}

/// Serve on an already-bound listener. Split out so tests can bind port 0
/// and learn the assigned port before the server starts.
pub async fn serve_on(state: ApiState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
