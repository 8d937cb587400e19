//! wsPresence hub
//!
//! - WebSocket endpoint: /v1/ws?ticket=...
//! - Online/offline broadcast on first/last connection of an identity
//! - Direct messages fanned out to every connection of the recipient
//! - HTTP lookups: /v1/presence/online, /v1/presence/{identity}

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wspresence_core::PresenceRegistry;
use wspresence_hub::{app_state, config, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = config::resolve_path(std::env::args().nth(1));
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen = cfg.hub.listen_addr().expect("hub.listen must be a valid SocketAddr");

    // One registry for the whole process, shared by every connection handler.
    let registry = Arc::new(PresenceRegistry::new());
    let state = app_state::AppState::new(cfg, registry).expect("app state init failed");
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "wspresence-hub starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
