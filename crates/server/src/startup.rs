use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::info;

use service::playlist::{repo::seaorm::SeaOrmPlaylistStore, PlaylistServiceImpl};

use crate::{errors::StartupError, routes, state::AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad listen address: {e}")))
}

/// Connect, migrate and wire the playlist service into a router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    common::env::ensure_database_dir(&cfg.database.url).await?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migration failed: {e}")))?;

    let store = Arc::new(SeaOrmPlaylistStore::new(db.clone()));
    let playlists = Arc::new(PlaylistServiceImpl::new(store));
    let state = AppState::new(playlists, db, Duration::from_secs(cfg.server.request_timeout_secs));

    Ok(routes::build_router(state, build_cors()))
}

/// Run until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_shutdown<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_addr(&cfg)?;
    let app = build_app(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, request_timeout_secs = cfg.server.request_timeout_secs, "playlist server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("playlist server stopped");
    Ok(())
}
