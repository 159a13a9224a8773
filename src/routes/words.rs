use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::services::words::{
    NewWord, WordEntry, WordFilters, WordUpdate, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    data: Vec<WordEntry>,
    count: usize,
    filters: WordFilters,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    data: Vec<WordEntry>,
    count: usize,
    query: String,
}

#[derive(Serialize)]
struct PosResponse {
    success: bool,
    data: Vec<WordEntry>,
    count: usize,
    pos: String,
}

#[derive(Serialize)]
struct CategoryResponse {
    success: bool,
    data: Vec<WordEntry>,
    count: usize,
    category: String,
}

#[derive(Serialize)]
struct DataResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct MutationResponse {
    success: bool,
    data: WordEntry,
    message: &'static str,
}

#[derive(Serialize)]
struct DeletedResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    lemma: Option<String>,
    pos: Option<String>,
    lexical_category: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreateWordRequest {
    lemma: Option<String>,
    pos: Option<String>,
    translation: Option<String>,
    definition: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    inflections: BTreeMap<String, String>,
    lexical_category: Option<String>,
    #[serde(default)]
    example_sentences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateWordRequest {
    lemma: Option<String>,
    pos: Option<String>,
    translation: Option<String>,
    definition: Option<String>,
    synonyms: Option<Vec<String>>,
    inflections: Option<BTreeMap<String, String>>,
    lexical_category: Option<String>,
    example_sentences: Option<Vec<String>>,
}

pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    let filters = WordFilters {
        lemma: query.lemma.filter(|v| !v.trim().is_empty()),
        pos: query.pos.filter(|v| !v.trim().is_empty()),
        lexical_category: query.lexical_category.filter(|v| !v.trim().is_empty()),
        limit: query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        offset: query.offset.unwrap_or(0),
    };

    match repo.find_all(&filters).await {
        Ok(words) => Json(ListResponse {
            success: true,
            count: words.len(),
            data: words,
            filters,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "words list query failed");
            AppError::store("Failed to fetch words", err).into_response()
        }
    }
}

pub async fn search_words(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    let Some(term) = term else {
        return AppError::validation("Search query is required").into_response();
    };

    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    match repo.search(&term, limit).await {
        Ok(words) => Json(SearchResponse {
            success: true,
            count: words.len(),
            data: words,
            query: term,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "word search failed");
            AppError::store("Failed to search words", err).into_response()
        }
    }
}

pub async fn stats(State(state): State<AppState>) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.stats().await {
        Ok(stats) => Json(DataResponse {
            success: true,
            data: stats,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "stats query failed");
            AppError::store("Failed to fetch statistics", err).into_response()
        }
    }
}

pub async fn words_by_pos(State(state): State<AppState>, Path(pos): Path<String>) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.find_by_pos(&pos).await {
        Ok(words) => Json(PosResponse {
            success: true,
            count: words.len(),
            data: words,
            pos,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "words by pos query failed");
            AppError::store("Failed to fetch words by part of speech", err).into_response()
        }
    }
}

pub async fn words_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.find_by_lexical_category(&category).await {
        Ok(words) => Json(CategoryResponse {
            success: true,
            count: words.len(),
            data: words,
            category,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "words by category query failed");
            AppError::store("Failed to fetch words by category", err).into_response()
        }
    }
}

pub async fn get_word(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.find_by_id(id).await {
        Ok(Some(word)) => Json(DataResponse {
            success: true,
            data: word,
        })
        .into_response(),
        Ok(None) => AppError::not_found("Word not found").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "word lookup failed");
            AppError::store("Failed to fetch word", err).into_response()
        }
    }
}

pub async fn create_word(State(state): State<AppState>, req: Request<Body>) -> Response {
    let payload: CreateWordRequest = match parse_body(req).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let data = match validate_create(payload) {
        Ok(data) => data,
        Err(err) => return err.into_response(),
    };

    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.create(data).await {
        Ok(word) => (
            StatusCode::CREATED,
            Json(MutationResponse {
                success: true,
                data: word,
                message: "Word created successfully",
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "word insert failed");
            AppError::store("Failed to create word", err).into_response()
        }
    }
}

pub async fn update_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    req: Request<Body>,
) -> Response {
    let payload: UpdateWordRequest = match parse_body(req).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let update = match validate_update(payload) {
        Ok(update) => update,
        Err(err) => return err.into_response(),
    };

    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.update(id, update).await {
        Ok(Some(word)) => Json(MutationResponse {
            success: true,
            data: word,
            message: "Word updated successfully",
        })
        .into_response(),
        Ok(None) => AppError::not_found("Word not found").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "word update failed");
            AppError::store("Failed to update word", err).into_response()
        }
    }
}

pub async fn delete_word(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let Some(repo) = state.repository() else {
        return AppError::unavailable().into_response();
    };

    match repo.delete(id).await {
        Ok(true) => Json(DeletedResponse {
            success: true,
            message: "Word deleted successfully",
        })
        .into_response(),
        Ok(false) => AppError::not_found("Word not found").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "word delete failed");
            AppError::store("Failed to delete word", err).into_response()
        }
    }
}

async fn parse_body<T: serde::de::DeserializeOwned>(req: Request<Body>) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::validation("Invalid request body"))?;

    serde_json::from_slice(&bytes).map_err(|_| AppError::validation("Invalid request body"))
}

fn validate_create(payload: CreateWordRequest) -> Result<NewWord, AppError> {
    let (Some(lemma), Some(pos)) = (payload.lemma, payload.pos) else {
        return Err(AppError::validation("Lemma and part of speech are required"));
    };

    let lemma = lemma.trim().to_string();
    if lemma.is_empty() {
        return Err(AppError::validation("Lemma must be a non-empty string"));
    }

    let pos = pos.trim().to_string();
    if pos.is_empty() {
        return Err(AppError::validation(
            "Part of speech must be a non-empty string",
        ));
    }

    Ok(NewWord {
        lemma,
        pos,
        translation: payload.translation,
        definition: payload.definition,
        synonyms: payload.synonyms,
        inflections: payload.inflections,
        lexical_category: payload.lexical_category,
        example_sentences: payload.example_sentences,
    })
}

fn validate_update(payload: UpdateWordRequest) -> Result<WordUpdate, AppError> {
    if let Some(lemma) = payload.lemma.as_deref() {
        if lemma.trim().is_empty() {
            return Err(AppError::validation("Lemma must be a non-empty string"));
        }
    }

    if let Some(pos) = payload.pos.as_deref() {
        if pos.trim().is_empty() {
            return Err(AppError::validation(
                "Part of speech must be a non-empty string",
            ));
        }
    }

    Ok(WordUpdate {
        lemma: payload.lemma.map(|v| v.trim().to_string()),
        pos: payload.pos.map(|v| v.trim().to_string()),
        translation: payload.translation,
        definition: payload.definition,
        synonyms: payload.synonyms,
        inflections: payload.inflections,
        lexical_category: payload.lexical_category,
        example_sentences: payload.example_sentences,
    })
}
