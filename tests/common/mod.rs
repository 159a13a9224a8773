use axum::Router;

pub async fn create_test_app() -> Router {
    // An empty DATABASE_URL fails to parse as a connection string, so the
    // app comes up without a store and endpoints take their degraded paths.
    std::env::set_var("DATABASE_URL", "");

    sanakota_backend::create_app().await
}
