//! Translation editing and report endpoints for admin collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::language::validate_locale;
use crate::models::settings::TranslatorSettings;
use crate::models::translation::{
    ObjectType, TranslationPayload, TranslationRecord, TranslationStatus,
};
use crate::services::machine;
use crate::services::store::{SaveOutcome, TranslationFilter};
use crate::state::AppState;

// =============================================================================
// Request/response data
// =============================================================================

#[derive(Debug, Deserialize)]
struct SaveTranslationRequest {
    /// Translated field values; which keys apply depends on the object type.
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,

    /// Publication status (defaults to draft).
    #[serde(default)]
    status: Option<TranslationStatus>,

    /// Source-language field values, used only to machine-translate blank
    /// fields when auto-translation is configured.
    #[serde(default)]
    source: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: u64,
}

#[derive(Serialize)]
struct ListResponse {
    translations: Vec<TranslationRecord>,
    total: i64,
    page: i64,
    total_pages: i64,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_object_type(raw: &str) -> AppResult<ObjectType> {
    ObjectType::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn checked_locale(raw: &str) -> AppResult<()> {
    validate_locale(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Build the typed payload for an object type from loose field values.
///
/// The object type comes from the URL, so the body carries bare fields;
/// tagging happens here before deserialization into the payload union.
fn payload_from_fields(
    object_type: ObjectType,
    mut fields: serde_json::Map<String, serde_json::Value>,
) -> AppResult<TranslationPayload> {
    fields.insert(
        "object_type".to_string(),
        serde_json::Value::String(object_type.as_str().to_string()),
    );
    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("invalid translation fields: {e}")))
}

/// Kick off background machine translation of blank fields, when configured.
///
/// Never blocks or fails the save: by the time the spawned task runs, the
/// editor's response is already on its way.
fn maybe_auto_translate(
    state: &AppState,
    settings: &TranslatorSettings,
    record: &TranslationRecord,
    source: Option<serde_json::Map<String, serde_json::Value>>,
    language_code: &str,
    default_language: &str,
) {
    if !settings.auto_translate {
        return;
    }
    let Some(source) = source else {
        return;
    };
    let Some(backend) = machine::backend_for(state.http(), settings) else {
        return;
    };

    let has_blank_fields = record
        .payload
        .prose_fields()
        .iter()
        .any(|&field| record.payload.non_blank(field).is_none());
    if !has_blank_fields {
        return;
    }

    let source_payload = match payload_from_fields(record.object_type(), source) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed auto-translation source fields");
            return;
        }
    };

    machine::spawn_fill(
        state.store().clone(),
        backend,
        record.object_id,
        language_code.to_string(),
        default_language.to_string(),
        record.payload.clone(),
        source_payload,
        record.status,
    );
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/translations/{object_type}/{object_id}/{language}
async fn get_translation(
    State(state): State<AppState>,
    Path((object_type, object_id, language)): Path<(String, i64, String)>,
) -> AppResult<Json<TranslationRecord>> {
    let object_type = parse_object_type(&object_type)?;
    checked_locale(&language)?;

    let record = state
        .store()
        .get(object_id, object_type, &language)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(record))
}

/// PUT /api/translations/{object_type}/{object_id}/{language}
///
/// Upsert. A body whose every field is blank deletes the record instead
/// (204); otherwise the saved record is returned.
async fn save_translation(
    State(state): State<AppState>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Path((object_type, object_id, language)): Path<(String, i64, String)>,
    Json(body): Json<SaveTranslationRequest>,
) -> AppResult<Response> {
    let object_type = parse_object_type(&object_type)?;
    checked_locale(&language)?;

    let payload = payload_from_fields(object_type, body.fields)?;
    let status = body.status.unwrap_or(TranslationStatus::Draft);
    let default_language = state.languages().default_language(&settings);

    let outcome = state
        .store()
        .save(object_id, &language, &payload, status, &default_language)
        .await?;

    if object_type == ObjectType::String {
        state.strings().invalidate(&language, object_id);
    }

    match outcome {
        SaveOutcome::Removed => Ok(StatusCode::NO_CONTENT.into_response()),
        SaveOutcome::Saved(record) => {
            maybe_auto_translate(
                &state,
                &settings,
                &record,
                body.source,
                &language,
                &default_language,
            );
            Ok(Json(record).into_response())
        }
    }
}

/// DELETE /api/translations/{object_type}/{object_id}/{language}
async fn delete_translation(
    State(state): State<AppState>,
    Path((object_type, object_id, language)): Path<(String, i64, String)>,
) -> AppResult<Json<DeleteResponse>> {
    let object_type = parse_object_type(&object_type)?;
    checked_locale(&language)?;

    let removed = state
        .store()
        .delete(object_id, object_type, Some(&language))
        .await?;

    if object_type == ObjectType::String {
        state.strings().invalidate(&language, object_id);
    }

    Ok(Json(DeleteResponse { removed }))
}

/// DELETE /api/translations/{object_type}/{object_id}
///
/// Removes the object's translations across every language; called when the
/// source object itself is deleted.
async fn delete_all_languages(
    State(state): State<AppState>,
    Path((object_type, object_id)): Path<(String, i64)>,
) -> AppResult<Json<DeleteResponse>> {
    let object_type = parse_object_type(&object_type)?;

    let removed = state.store().delete(object_id, object_type, None).await?;

    if object_type == ObjectType::String {
        state.strings().invalidate_all_languages(object_id);
    }

    Ok(Json(DeleteResponse { removed }))
}

/// GET /api/translations?object_type=&language=&status=&page=
///
/// Filtered listing backing the translation status/report view.
async fn list_translations(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListResponse>> {
    let mut filter = TranslationFilter::default();

    if let Some(raw) = params.get("object_type") {
        filter.object_type = Some(parse_object_type(raw)?);
    }
    if let Some(language) = params.get("language") {
        checked_locale(language)?;
        filter.language_code = Some(language.clone());
    }
    if let Some(raw) = params.get("status") {
        filter.status = Some(match raw.as_str() {
            "draft" => TranslationStatus::Draft,
            "published" => TranslationStatus::Published,
            other => {
                return Err(AppError::BadRequest(format!("unknown status '{other}'")));
            }
        });
    }

    let page: i64 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
        .max(1);
    let per_page: i64 = 50;
    let offset = (page - 1) * per_page;

    let translations = state.store().list(&filter, per_page, offset).await?;
    let total = state.store().count(&filter).await?;
    let total_pages = (total as f64 / per_page as f64).ceil() as i64;

    Ok(Json(ListResponse {
        translations,
        total,
        page,
        total_pages,
    }))
}

/// Create the translations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/translations", get(list_translations))
        .route(
            "/api/translations/{object_type}/{object_id}",
            delete(delete_all_languages),
        )
        .route(
            "/api/translations/{object_type}/{object_id}/{language}",
            get(get_translation)
                .put(save_translation)
                .delete(delete_translation),
        )
}
