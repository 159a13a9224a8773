use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::words::{WordEntry, WordFilters, WordStats};

/// Thin data-access wrapper over the word service HTTP surface: one method
/// per endpoint, no retries, no caching. Any non-2xx response becomes a
/// [`ClientError::Status`] carrying the body as diagnostic text.
#[derive(Debug, Clone)]
pub struct WordsClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateWordBody {
    pub lemma: String,
    pub pos: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inflections: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub example_sentences: Vec<String>,
}

/// Absent fields are omitted from the payload entirely so the service
/// treats them as "keep current value".
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateWordBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflections: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct WordListPayload {
    pub success: bool,
    pub data: Vec<WordEntry>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct WordPayload {
    pub success: bool,
    pub data: WordEntry,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsPayload {
    pub success: bool,
    pub data: WordStats,
}

#[derive(Debug, Deserialize)]
pub struct DeletePayload {
    pub success: bool,
    pub message: String,
}

impl WordsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn list(&self, filters: &WordFilters) -> Result<WordListPayload, ClientError> {
        let mut request = self
            .client
            .get(format!("{}/api/words", self.base_url))
            .query(&[("limit", filters.limit), ("offset", filters.offset)]);

        if let Some(lemma) = &filters.lemma {
            request = request.query(&[("lemma", lemma)]);
        }
        if let Some(pos) = &filters.pos {
            request = request.query(&[("pos", pos)]);
        }
        if let Some(category) = &filters.lexical_category {
            request = request.query(&[("lexical_category", category)]);
        }

        self.fetch_json(request).await
    }

    pub async fn search(&self, q: &str, limit: i64) -> Result<WordListPayload, ClientError> {
        let request = self
            .client
            .get(format!("{}/api/words/search", self.base_url))
            .query(&[("q", q)])
            .query(&[("limit", limit)]);

        self.fetch_json(request).await
    }

    pub async fn stats(&self) -> Result<StatsPayload, ClientError> {
        self.fetch_json(self.client.get(format!("{}/api/words/stats", self.base_url)))
            .await
    }

    pub async fn list_by_pos(&self, pos: &str) -> Result<WordListPayload, ClientError> {
        let url = format!(
            "{}/api/words/pos/{}",
            self.base_url,
            urlencoding::encode(pos)
        );
        self.fetch_json(self.client.get(url)).await
    }

    pub async fn list_by_category(&self, category: &str) -> Result<WordListPayload, ClientError> {
        let url = format!(
            "{}/api/words/category/{}",
            self.base_url,
            urlencoding::encode(category)
        );
        self.fetch_json(self.client.get(url)).await
    }

    pub async fn get(&self, id: i64) -> Result<WordPayload, ClientError> {
        self.fetch_json(
            self.client
                .get(format!("{}/api/words/{id}", self.base_url)),
        )
        .await
    }

    pub async fn create(&self, body: &CreateWordBody) -> Result<WordPayload, ClientError> {
        self.fetch_json(
            self.client
                .post(format!("{}/api/words", self.base_url))
                .json(body),
        )
        .await
    }

    pub async fn update(&self, id: i64, body: &UpdateWordBody) -> Result<WordPayload, ClientError> {
        self.fetch_json(
            self.client
                .put(format!("{}/api/words/{id}", self.base_url))
                .json(body),
        )
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<DeletePayload, ClientError> {
        self.fetch_json(
            self.client
                .delete(format!("{}/api/words/{id}", self.base_url)),
        )
        .await
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
