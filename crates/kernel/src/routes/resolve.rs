//! Render-path resolution endpoints.
//!
//! Render collaborators (post rendering, menu building, term display,
//! widget rendering) post source-language values here and get back the best
//! available text for the request's resolved language. Missing or partial
//! translations degrade to the submitted source values; these endpoints
//! never fail a page render over translation state.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::content::overlay::PostView;
use crate::error::{AppError, AppResult};
use crate::middleware::language::ResolvedLanguage;
use crate::models::settings::TranslatorSettings;
use crate::models::translation::{ObjectType, TranslationField};
use crate::services::resolver::{ContentResolver, MenuItemView, TermView};
use crate::state::AppState;

/// Build the per-request resolver from middleware-provided context.
fn resolver<'a>(
    state: &'a AppState,
    settings: &TranslatorSettings,
    current_language: &str,
) -> ContentResolver<'a> {
    let default_language = state.languages().default_language(settings);
    ContentResolver::new(
        state.store(),
        state.strings(),
        settings,
        current_language,
        &default_language,
    )
}

// =============================================================================
// Single-field resolution
// =============================================================================

#[derive(Deserialize)]
struct ResolveRequest {
    object_id: i64,
    object_type: String,
    field: TranslationField,
    #[serde(default)]
    source_value: String,
}

#[derive(Serialize)]
struct ResolveResponse {
    resolved: String,
    language: String,
}

/// POST /api/resolve
async fn resolve_field(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<ResolveRequest>,
) -> AppResult<Json<ResolveResponse>> {
    let object_type =
        ObjectType::parse(&body.object_type).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let resolved = resolver(&state, &settings, &language)
        .resolve_field(body.object_id, object_type, body.field, &body.source_value)
        .await;

    Ok(Json(ResolveResponse {
        resolved,
        language,
    }))
}

// =============================================================================
// Typed render-path resolution
// =============================================================================

#[derive(Deserialize)]
struct ResolvePostRequest {
    object_id: i64,
    #[serde(flatten)]
    post: PostView,
}

/// POST /api/resolve/post
async fn resolve_post(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<ResolvePostRequest>,
) -> Json<PostView> {
    let view = resolver(&state, &settings, &language)
        .post(body.object_id, body.post, state.overlays())
        .await;
    Json(view)
}

#[derive(Deserialize)]
struct ResolveMenuRequest {
    items: Vec<MenuItemView>,
}

/// POST /api/resolve/menu
async fn resolve_menu(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<ResolveMenuRequest>,
) -> Json<Vec<MenuItemView>> {
    let resolver = resolver(&state, &settings, &language);

    let mut items = Vec::with_capacity(body.items.len());
    for item in body.items {
        items.push(resolver.menu_item(item).await);
    }
    Json(items)
}

/// POST /api/resolve/term
async fn resolve_term(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(term): Json<TermView>,
) -> Json<TermView> {
    let view = resolver(&state, &settings, &language).term(term).await;
    Json(view)
}

#[derive(Deserialize)]
struct ResolveWidgetRequest {
    widget_id: i64,
    #[serde(default)]
    title: String,
}

#[derive(Serialize)]
struct ResolveWidgetResponse {
    title: String,
}

/// POST /api/resolve/widget
async fn resolve_widget(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<ResolveWidgetRequest>,
) -> Json<ResolveWidgetResponse> {
    let title = resolver(&state, &settings, &language)
        .widget_title(body.widget_id, &body.title)
        .await;
    Json(ResolveWidgetResponse { title })
}

#[derive(Deserialize)]
struct ResolveTextRequest {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct ResolveTextResponse {
    text: String,
}

/// POST /api/resolve/text
async fn resolve_text(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<ResolveTextRequest>,
) -> Json<ResolveTextResponse> {
    let text = resolver(&state, &settings, &language).text(&body.text).await;
    Json(ResolveTextResponse { text })
}

// =============================================================================
// Link localization
// =============================================================================

#[derive(Deserialize)]
struct LocalizeUrlRequest {
    url: String,
    /// When present, slug substitution is attempted before tagging.
    #[serde(default)]
    object_id: Option<i64>,
    #[serde(default)]
    object_type: Option<String>,
    #[serde(default)]
    source_slug: Option<String>,
}

#[derive(Serialize)]
struct LocalizeUrlResponse {
    url: String,
}

/// POST /api/localize-url
async fn localize_url(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<LocalizeUrlRequest>,
) -> AppResult<Json<LocalizeUrlResponse>> {
    let resolver = resolver(&state, &settings, &language);

    let url = match (body.object_id, body.object_type, body.source_slug) {
        (Some(object_id), Some(object_type), Some(source_slug)) => {
            let object_type = ObjectType::parse(&object_type)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            resolver
                .localize_permalink(&body.url, &source_slug, object_id, object_type)
                .await
        }
        _ => resolver.add_language(&body.url),
    };

    Ok(Json(LocalizeUrlResponse { url }))
}

/// Create the resolution router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/resolve", post(resolve_field))
        .route("/api/resolve/post", post(resolve_post))
        .route("/api/resolve/menu", post(resolve_menu))
        .route("/api/resolve/term", post(resolve_term))
        .route("/api/resolve/widget", post(resolve_widget))
        .route("/api/resolve/text", post(resolve_text))
        .route("/api/localize-url", post(localize_url))
}
