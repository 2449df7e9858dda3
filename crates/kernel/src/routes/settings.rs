//! Translator settings endpoints for the admin collaborator.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::models::settings::TranslatorSettings;
use crate::state::AppState;

/// GET /api/settings
async fn get_settings(State(state): State<AppState>) -> AppResult<Json<TranslatorSettings>> {
    let settings = TranslatorSettings::load(state.db()).await?;
    Ok(Json(settings))
}

/// PUT /api/settings
///
/// The default∈enabled invariant is enforced here, at the admin persistence
/// point; reads elsewhere tolerate already-stored violations.
async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<TranslatorSettings>,
) -> AppResult<Json<TranslatorSettings>> {
    settings
        .validate()
        .map_err(|e| AppError::Unprocessable(e.to_string()))?;

    settings.save(state.db()).await?;

    // Stored string translations may now resolve differently.
    state.strings().clear();

    Ok(Json(settings))
}

/// Create the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(put_settings))
}
