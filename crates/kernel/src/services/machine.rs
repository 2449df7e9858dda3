//! Machine-translation backends.
//!
//! External translation services behind one async trait. The save path
//! never waits on these: auto-translation runs as a detached task after the
//! record is persisted, and a failed or slow call leaves the record exactly
//! as the editor saved it.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::settings::{TranslationBackend, TranslatorSettings};
use crate::models::translation::{TranslationPayload, TranslationStatus};
use crate::services::store::TranslationStore;

/// An external translation service.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Translate text between two locales.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Build the configured backend, if any.
///
/// Requires both a selected service and an API key; anything else means
/// auto-translation stays off.
pub fn backend_for(
    client: &reqwest::Client,
    settings: &TranslatorSettings,
) -> Option<Arc<dyn MachineTranslator>> {
    let api_key = settings.api_key.trim();
    if api_key.is_empty() {
        return None;
    }

    match settings.translation_service {
        TranslationBackend::None => None,
        TranslationBackend::Google => Some(Arc::new(GoogleTranslator {
            client: client.clone(),
            api_key: api_key.to_string(),
        })),
        TranslationBackend::Deepl => Some(Arc::new(DeeplTranslator {
            client: client.clone(),
            api_key: api_key.to_string(),
        })),
    }
}

/// Google Cloud Translation v2.
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl MachineTranslator for GoogleTranslator {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .post("https://translation.googleapis.com/language/translate/v2")
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "q": text,
                "source": lang_code(source),
                "target": lang_code(target),
                "format": "html",
            }))
            .send()
            .await
            .context("google translate request failed")?
            .error_for_status()
            .context("google translate returned an error status")?;

        let body: GoogleResponse = response
            .json()
            .await
            .context("google translate response was not valid JSON")?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .context("google translate returned no translations")
    }
}

/// DeepL API v2.
pub struct DeeplTranslator {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Deserialize)]
struct DeeplTranslation {
    text: String,
}

#[async_trait]
impl MachineTranslator for DeeplTranslator {
    fn name(&self) -> &'static str {
        "deepl"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .post("https://api.deepl.com/v2/translate")
            .form(&[
                ("auth_key", self.api_key.as_str()),
                ("text", text),
                ("source_lang", &lang_code(source).to_uppercase()),
                ("target_lang", &lang_code(target).to_uppercase()),
            ])
            .send()
            .await
            .context("deepl request failed")?
            .error_for_status()
            .context("deepl returned an error status")?;

        let body: DeeplResponse = response
            .json()
            .await
            .context("deepl response was not valid JSON")?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .context("deepl returned no translations")
    }
}

/// 2-letter language code from a locale ("fr_FR" → "fr").
fn lang_code(locale: &str) -> String {
    locale.chars().take(2).collect::<String>().to_lowercase()
}

/// Translate the blank prose fields of a saved payload from editor-supplied
/// source text. Returns how many fields were filled; per-field failures are
/// logged and skipped.
pub async fn translate_blank_fields(
    translator: &dyn MachineTranslator,
    payload: &mut TranslationPayload,
    source: &TranslationPayload,
    from: &str,
    to: &str,
) -> usize {
    let mut filled = 0;

    for &field in payload.prose_fields() {
        if payload.non_blank(field).is_some() {
            continue;
        }
        let Some(source_text) = source.non_blank(field) else {
            continue;
        };

        match translator.translate(source_text, from, to).await {
            Ok(translated) if !translated.trim().is_empty() => {
                payload.set_field(field, translated);
                filled += 1;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = translator.name(),
                    ?field,
                    "machine translation failed, leaving field untranslated"
                );
            }
        }
    }

    filled
}

/// Fill a just-saved record's blank fields in the background.
///
/// Detached from the save path: the editor response has already been
/// produced by the time this runs, and any failure leaves the record as
/// saved.
pub fn spawn_fill(
    store: TranslationStore,
    translator: Arc<dyn MachineTranslator>,
    object_id: i64,
    language_code: String,
    default_language: String,
    saved: TranslationPayload,
    source: TranslationPayload,
    status: TranslationStatus,
) {
    tokio::spawn(async move {
        let mut payload = saved;
        let filled = translate_blank_fields(
            translator.as_ref(),
            &mut payload,
            &source,
            &default_language,
            &language_code,
        )
        .await;

        if filled == 0 {
            return;
        }

        tracing::debug!(
            object_id,
            language = %language_code,
            filled,
            backend = translator.name(),
            "auto-translated blank fields"
        );

        if let Err(e) = store
            .save(object_id, &language_code, &payload, status, &default_language)
            .await
        {
            tracing::warn!(error = %e, object_id, "failed to persist auto-translated fields");
        }
    });
}
