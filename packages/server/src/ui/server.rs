//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        close_room, create_room, enter_room, get_room_state, health_check, my_rooms,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Routes of the watch-room server.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/join", post(enter_room))
        .route("/api/rooms/my-rooms", get(my_rooms))
        .route("/api/rooms/{room_id}", get(get_room_state))
        .route("/api/rooms/{room_id}/close", post(close_room))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch-room server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(build_app_state(&config));
/// server.run("127.0.0.1".to_string(), 5000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the server until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_router(self.state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Watch-room server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
