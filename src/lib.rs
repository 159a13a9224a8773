pub mod client;
pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod morphology;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::Database;
use crate::state::AppState;

/// App constructor shared by the server binary and the integration tests.
/// A failed store connection degrades the app instead of aborting it; the
/// affected endpoints then answer with store-failure envelopes.
pub async fn create_app() -> axum::Router {
    let config = Config::from_env();

    let database = match Database::connect(&config.database).await {
        Ok(database) => Some(Arc::new(database)),
        Err(_) => None,
    };

    routes::router(AppState::new(database))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
