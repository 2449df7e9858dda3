//! Language listing and preference persistence.
//!
//! `GET /api/languages` is what switcher collaborators render from;
//! `PUT /api/language` persists a visitor's explicit choice.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::language::{ResolvedLanguage, preference_cookie};
use crate::models::language::LanguageDescriptor;
use crate::models::settings::{SwitcherStyle, TranslatorSettings};
use crate::state::AppState;

/// Language listing for this request.
#[derive(Serialize)]
struct LanguagesResponse {
    current: String,
    default: String,
    display_language_switcher: bool,
    language_switcher_style: SwitcherStyle,
    available: Vec<LanguageDescriptor>,
    enabled: Vec<LanguageDescriptor>,
}

/// GET /api/languages
async fn list_languages(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(current)): Extension<ResolvedLanguage>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
) -> Json<LanguagesResponse> {
    let registry = state.languages();

    Json(LanguagesResponse {
        current,
        default: registry.default_language(&settings),
        display_language_switcher: settings.display_language_switcher,
        language_switcher_style: settings.language_switcher_style,
        available: registry.available_languages(),
        enabled: registry.enabled_languages(&settings),
    })
}

#[derive(Deserialize)]
struct SetLanguageRequest {
    locale: String,
}

/// PUT /api/language
///
/// Persists the preference cookie when the locale is enabled; a disabled or
/// unknown locale is never persisted.
async fn set_language(
    State(state): State<AppState>,
    Extension(settings): Extension<Arc<TranslatorSettings>>,
    Json(body): Json<SetLanguageRequest>,
) -> AppResult<Response> {
    let registry = state.languages();

    if !registry.is_enabled(&settings, &body.locale) {
        return Err(AppError::Unprocessable(format!(
            "language '{}' is not enabled",
            body.locale
        )));
    }

    let cookie = preference_cookie(&body.locale, state.cookie_same_site());
    let value = cookie
        .parse()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid cookie header: {e}")))?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

/// Create the language router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/languages", get(list_languages))
        .route("/api/language", put(set_language))
}
