mod health;
mod words;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route(
            "/api/words",
            get(words::list_words).post(words::create_word),
        )
        .route("/api/words/search", get(words::search_words))
        .route("/api/words/stats", get(words::stats))
        .route("/api/words/pos/:pos", get(words::words_by_pos))
        .route("/api/words/category/:category", get(words::words_by_category))
        .route(
            "/api/words/:id",
            get(words::get_word)
                .put(words::update_word)
                .delete(words::delete_word),
        )
        .fallback(fallback_handler)
        .with_state(state)
}

#[derive(Serialize)]
struct NotFoundBody {
    error: &'static str,
    path: String,
}

async fn fallback_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Route not found",
            path: uri.to_string(),
        }),
    )
        .into_response()
}
