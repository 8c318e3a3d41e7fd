use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use service::{storage, WallService};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::observability;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connects the store and assembles the router. Fails when the store is unreachable.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = storage::connect(&cfg.store).await?;
    let wall = WallService::new(store, cfg.wall.word_policy);
    let state = AppState::new(wall, &cfg.wall);
    observability::init();
    Ok(routes::build_router(state, cfg.wall.mode, build_cors()))
}

async fn bind(cfg: &AppConfig) -> Result<TcpListener, StartupError> {
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|source| StartupError::Bind { addr, source })
}

/// Public entry: connect the store, bind, and serve until Ctrl+C or SIGTERM.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // 先连接存储，失败则不开始监听
    let app = build_app(&cfg).await?;
    let listener = bind(&cfg).await?;
    let addr: SocketAddr = listener.local_addr()?;

    info!(
        %addr,
        mode = ?cfg.wall.mode,
        policy = ?cfg.wall.word_policy,
        backend = ?cfg.store.backend,
        "word wall server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!(event = "shutdown_signal", "received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
