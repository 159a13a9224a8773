use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use sanakota_backend::config::Config;
use sanakota_backend::db::{migrate, Database};
use sanakota_backend::logging;
use sanakota_backend::routes;
use sanakota_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let database = match Database::connect(&config.database).await {
        Ok(database) => {
            if let Err(err) = migrate::run_migrations(database.pool()).await {
                tracing::error!(error = %err, "database migrations failed");
            }
            Some(Arc::new(database))
        }
        Err(err) => {
            tracing::warn!(error = %err, "database not initialized, serving degraded");
            None
        }
    };

    let state = AppState::new(database);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "sanakota-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
