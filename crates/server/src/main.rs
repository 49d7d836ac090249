//! Kanban board server
//!
//! Hosts one board persisted in a data directory. It provides a REST API
//! and a Socket.IO channel for live drag-and-drop, on separate ports.

mod config;
mod routes;
mod socket;
mod state;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::socket::{create_socket_layer, spawn_sync_relay, SocketState};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kanban_server=debug,kanban_core=info,tower_http=debug,socketioxide=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let app_state = AppState::new(&config)
        .await
        .context("Failed to load board")?;

    // Socket.IO layer, fed by board change notifications
    let socket_state = SocketState {
        board_store: app_state.board_store().clone(),
    };
    let (socket_layer, io) = create_socket_layer(socket_state);
    spawn_sync_relay(app_state.board_store().clone(), io);

    // REST API server
    let rest_app = Router::new()
        .merge(routes::health::router())
        .merge(routes::board::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Socket.IO server
    // Layers are applied bottom-to-top, so CorsLayer is added last to be applied first
    let socket_app = Router::new()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(socket_layer);

    let rest_addr = SocketAddr::from(([0, 0, 0, 0], config.rest_port));
    let socket_addr = SocketAddr::from(([0, 0, 0, 0], config.socket_port));

    tracing::info!("REST API listening on {}", rest_addr);
    tracing::info!("Socket.IO listening on {}", socket_addr);

    let rest_listener = tokio::net::TcpListener::bind(rest_addr)
        .await
        .with_context(|| format!("Failed to bind {}", rest_addr))?;
    let socket_listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("Failed to bind {}", socket_addr))?;

    tokio::try_join!(
        async { axum::serve(rest_listener, rest_app).await.context("REST server failed") },
        async { axum::serve(socket_listener, socket_app).await.context("Socket.IO server failed") },
    )?;

    Ok(())
}
