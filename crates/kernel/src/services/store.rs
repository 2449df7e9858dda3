//! Translation store.
//!
//! The single owner of translation rows: composite-key lookups, atomic
//! upserts, and deletion. No fallback logic lives here; resolution policy
//! belongs to the resolver.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::translation::{
    ObjectType, TranslationPayload, TranslationRecord, TranslationRow, TranslationStatus,
};

/// Columns returned by every row-producing query.
const RECORD_COLUMNS: &str = "object_id, object_type, language_code, original_language, \
     translated_content, translated_title, translated_excerpt, translated_slug, \
     translated_attr_title, translated_description, status, last_updated";

/// Outcome of a save call.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// The record was inserted or updated.
    Saved(TranslationRecord),
    /// Every submitted field was blank; any existing record was removed.
    Removed,
}

/// Filters for the report/status listing.
#[derive(Debug, Clone, Default)]
pub struct TranslationFilter {
    pub object_type: Option<ObjectType>,
    pub language_code: Option<String>,
    pub status: Option<TranslationStatus>,
}

/// CRUD service over the `translation` table.
#[derive(Clone)]
pub struct TranslationStore {
    pool: PgPool,
}

impl TranslationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up one translation by its composite key.
    pub async fn get(
        &self,
        object_id: i64,
        object_type: ObjectType,
        language_code: &str,
    ) -> Result<Option<TranslationRecord>> {
        let row = sqlx::query_as::<_, TranslationRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM translation
            WHERE object_id = $1 AND object_type = $2 AND language_code = $3
            "#
        ))
        .bind(object_id)
        .bind(object_type.as_str())
        .bind(language_code)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch translation")?;

        row.map(TranslationRecord::try_from).transpose()
    }

    /// Upsert a translation.
    ///
    /// Keyed on `(object_id, object_type, language_code)`; the storage
    /// layer's unique index makes concurrent saves to the same key safe
    /// (last writer wins), with no application-level locking. New rows
    /// record `original_language` from the default language in effect at
    /// call time; updates leave it untouched. Every write bumps
    /// `last_updated`.
    ///
    /// A payload whose every field is blank deletes the record instead of
    /// storing an empty row.
    pub async fn save(
        &self,
        object_id: i64,
        language_code: &str,
        payload: &TranslationPayload,
        status: TranslationStatus,
        default_language: &str,
    ) -> Result<SaveOutcome> {
        let object_type = payload.object_type();

        if payload.is_blank() {
            self.delete(object_id, object_type, Some(language_code))
                .await?;
            return Ok(SaveOutcome::Removed);
        }

        let columns = payload.columns();

        let row = sqlx::query_as::<_, TranslationRow>(&format!(
            r#"
            INSERT INTO translation (
                object_id, object_type, language_code, original_language,
                translated_content, translated_title, translated_excerpt,
                translated_slug, translated_attr_title, translated_description,
                status, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now())
            ON CONFLICT (object_id, object_type, language_code) DO UPDATE SET
                translated_content = EXCLUDED.translated_content,
                translated_title = EXCLUDED.translated_title,
                translated_excerpt = EXCLUDED.translated_excerpt,
                translated_slug = EXCLUDED.translated_slug,
                translated_attr_title = EXCLUDED.translated_attr_title,
                translated_description = EXCLUDED.translated_description,
                status = EXCLUDED.status,
                last_updated = now()
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(object_id)
        .bind(object_type.as_str())
        .bind(language_code)
        .bind(default_language)
        .bind(columns.content)
        .bind(columns.title)
        .bind(columns.excerpt)
        .bind(columns.slug)
        .bind(columns.attr_title)
        .bind(columns.description)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .context("failed to save translation")?;

        Ok(SaveOutcome::Saved(row.try_into()?))
    }

    /// Delete translations for an object.
    ///
    /// With a language code, removes that single record; without one,
    /// removes the object's translations across every language (the
    /// source-object deletion path). Returns the number of rows removed.
    pub async fn delete(
        &self,
        object_id: i64,
        object_type: ObjectType,
        language_code: Option<&str>,
    ) -> Result<u64> {
        let result = match language_code {
            Some(language) => {
                sqlx::query(
                    r#"
                    DELETE FROM translation
                    WHERE object_id = $1 AND object_type = $2 AND language_code = $3
                    "#,
                )
                .bind(object_id)
                .bind(object_type.as_str())
                .bind(language)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query("DELETE FROM translation WHERE object_id = $1 AND object_type = $2")
                    .bind(object_id)
                    .bind(object_type.as_str())
                    .execute(&self.pool)
                    .await
            }
        }
        .context("failed to delete translation")?;

        Ok(result.rows_affected())
    }

    /// Filtered listing for the status/report view, newest first.
    pub async fn list(
        &self,
        filter: &TranslationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TranslationRecord>> {
        let rows = sqlx::query_as::<_, TranslationRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM translation
            WHERE ($1::text IS NULL OR object_type = $1)
              AND ($2::text IS NULL OR language_code = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY last_updated DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.object_type.map(ObjectType::as_str))
        .bind(filter.language_code.as_deref())
        .bind(filter.status.map(TranslationStatus::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("failed to list translations")?;

        rows.into_iter()
            .map(TranslationRecord::try_from)
            .collect::<Result<Vec<_>>>()
    }

    /// Count records matching the listing filters.
    pub async fn count(&self, filter: &TranslationFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM translation
            WHERE ($1::text IS NULL OR object_type = $1)
              AND ($2::text IS NULL OR language_code = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(filter.object_type.map(ObjectType::as_str))
        .bind(filter.language_code.as_deref())
        .bind(filter.status.map(TranslationStatus::as_str))
        .fetch_one(&self.pool)
        .await
        .context("failed to count translations")?;

        Ok(count)
    }
}

impl std::fmt::Debug for TranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationStore").finish()
    }
}
