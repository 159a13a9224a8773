use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::db::Database;

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: i64,
    pub lemma: String,
    pub pos: String,
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    pub inflections: BTreeMap<String, String>,
    pub lexical_category: Option<String>,
    pub example_sentences: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewWord {
    pub lemma: String,
    pub pos: String,
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    pub inflections: BTreeMap<String, String>,
    pub lexical_category: Option<String>,
    pub example_sentences: Vec<String>,
}

/// Partial update: absent fields keep their stored value. There is no way
/// to null out a field, matching the create/update contract.
#[derive(Debug, Clone, Default)]
pub struct WordUpdate {
    pub lemma: Option<String>,
    pub pos: Option<String>,
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub synonyms: Option<Vec<String>>,
    pub inflections: Option<BTreeMap<String, String>>,
    pub lexical_category: Option<String>,
    pub example_sentences: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for WordFilters {
    fn default() -> Self {
        Self {
            lemma: None,
            pos: None,
            lexical_category: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordStats {
    pub total_words: i64,
    pub unique_pos: i64,
    pub unique_categories: i64,
    pub first_word_date: Option<DateTime<Utc>>,
    pub last_word_date: Option<DateTime<Utc>>,
}

const WORD_COLUMNS: &str = "id, lemma, pos, translation, definition, synonyms, inflections, \
                            lexical_category, example_sentences, created_at, updated_at";

/// The only component issuing SQL against the words table. Store errors
/// surface unchanged; the service layer decides status codes.
#[derive(Clone)]
pub struct WordRepository {
    pool: PgPool,
}

impl WordRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn find_all(&self, filters: &WordFilters) -> Result<Vec<WordEntry>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE 1=1"
        ));

        if let Some(lemma) = filters.lemma.as_deref() {
            qb.push(" AND lemma ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(lemma)));
        }
        if let Some(pos) = filters.pos.as_deref() {
            qb.push(" AND pos = ");
            qb.push_bind(pos.to_string());
        }
        if let Some(category) = filters.lexical_category.as_deref() {
            qb.push(" AND lexical_category = ");
            qb.push_bind(category.to_string());
        }

        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(filters.limit.max(0));
        qb.push(" OFFSET ");
        qb.push_bind(filters.offset.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_word_row).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<WordEntry>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_word_row).transpose()
    }

    /// Case-insensitive exact match on the headword; first row wins.
    pub async fn find_by_lemma(&self, lemma: &str) -> Result<Option<WordEntry>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE lower(lemma) = lower($1) ORDER BY id LIMIT 1"
        ))
        .bind(lemma)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_word_row).transpose()
    }

    /// Ranking is delegated to the store: ts_rank over lemma + definition.
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<WordEntry>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {WORD_COLUMNS},
                   ts_rank(
                       to_tsvector('english', lemma || ' ' || COALESCE(definition, '')),
                       plainto_tsquery('english', $1)
                   ) AS rank
            FROM words
            WHERE to_tsvector('english', lemma || ' ' || COALESCE(definition, ''))
                  @@ plainto_tsquery('english', $1)
            ORDER BY rank DESC
            LIMIT $2
            "#
        ))
        .bind(term)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_word_row).collect()
    }

    pub async fn find_by_pos(&self, pos: &str) -> Result<Vec<WordEntry>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE pos = $1 ORDER BY lemma ASC"
        ))
        .bind(pos)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_word_row).collect()
    }

    pub async fn find_by_lexical_category(
        &self,
        category: &str,
    ) -> Result<Vec<WordEntry>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE lexical_category = $1 ORDER BY lemma ASC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_word_row).collect()
    }

    pub async fn create(&self, data: NewWord) -> Result<WordEntry, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO words
                (lemma, pos, translation, definition, synonyms, inflections,
                 lexical_category, example_sentences)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {WORD_COLUMNS}
            "#
        ))
        .bind(&data.lemma)
        .bind(&data.pos)
        .bind(&data.translation)
        .bind(&data.definition)
        .bind(Json(&data.synonyms))
        .bind(Json(&data.inflections))
        .bind(&data.lexical_category)
        .bind(Json(&data.example_sentences))
        .fetch_one(&self.pool)
        .await?;

        map_word_row(&row)
    }

    /// `updated_at` is refreshed even when no fields are provided.
    pub async fn update(
        &self,
        id: i64,
        update: WordUpdate,
    ) -> Result<Option<WordEntry>, sqlx::Error> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE words SET
                lemma = COALESCE($1, lemma),
                pos = COALESCE($2, pos),
                translation = COALESCE($3, translation),
                definition = COALESCE($4, definition),
                synonyms = COALESCE($5, synonyms),
                inflections = COALESCE($6, inflections),
                lexical_category = COALESCE($7, lexical_category),
                example_sentences = COALESCE($8, example_sentences),
                updated_at = NOW()
            WHERE id = $9
            RETURNING {WORD_COLUMNS}
            "#
        ))
        .bind(&update.lemma)
        .bind(&update.pos)
        .bind(&update.translation)
        .bind(&update.definition)
        .bind(update.synonyms.as_ref().map(Json))
        .bind(update.inflections.as_ref().map(Json))
        .bind(&update.lexical_category)
        .bind(update.example_sentences.as_ref().map(Json))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_word_row).transpose()
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Used by the batch importer's --truncate mode.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM words").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn stats(&self) -> Result<WordStats, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_words,
                COUNT(DISTINCT pos) AS unique_pos,
                COUNT(DISTINCT lexical_category) AS unique_categories,
                MIN(created_at) AS first_word_date,
                MAX(created_at) AS last_word_date
            FROM words
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(WordStats {
            total_words: row.try_get("total_words")?,
            unique_pos: row.try_get("unique_pos")?,
            unique_categories: row.try_get("unique_categories")?,
            first_word_date: row.try_get("first_word_date")?,
            last_word_date: row.try_get("last_word_date")?,
        })
    }

    /// Batch selection for the offline inflection generator, oldest first.
    pub async fn find_inflection_batch(
        &self,
        pos: Option<&str>,
        only_missing: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WordEntry>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE 1=1"
        ));

        if let Some(pos) = pos {
            qb.push(" AND pos = ");
            qb.push_bind(pos.to_string());
        }
        if only_missing {
            qb.push(" AND inflections = '{}'::jsonb");
        }

        qb.push(" ORDER BY created_at ASC LIMIT ");
        qb.push_bind(limit.max(0));
        qb.push(" OFFSET ");
        qb.push_bind(offset.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_word_row).collect()
    }
}

fn map_word_row(row: &PgRow) -> Result<WordEntry, sqlx::Error> {
    Ok(WordEntry {
        id: row.try_get("id")?,
        lemma: row.try_get("lemma")?,
        pos: row.try_get("pos")?,
        translation: row.try_get("translation")?,
        definition: row.try_get("definition")?,
        synonyms: row.try_get::<Json<Vec<String>>, _>("synonyms")?.0,
        inflections: row
            .try_get::<Json<BTreeMap<String, String>>, _>("inflections")?
            .0,
        lexical_category: row.try_get("lexical_category")?,
        example_sentences: row
            .try_get::<Json<Vec<String>>, _>("example_sentences")?
            .0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_pattern_metacharacters() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("kala"), "kala");
    }

    #[test]
    fn default_filters_are_first_page() {
        let filters = WordFilters::default();
        assert_eq!(filters.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(filters.offset, 0);
        assert!(filters.lemma.is_none());
        assert!(filters.pos.is_none());
        assert!(filters.lexical_category.is_none());
    }

    #[test]
    fn filters_echo_skips_absent_fields() {
        let filters = WordFilters {
            pos: Some("noun".to_string()),
            ..WordFilters::default()
        };

        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"pos": "noun", "limit": 20, "offset": 0})
        );
    }
}
