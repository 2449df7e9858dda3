//! Translator settings, persisted as a single JSON blob.
//!
//! The `setting` table is a generic key/value store; the translator keeps
//! everything under one key and reads/writes the blob as a whole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Setting key holding the translator configuration blob.
pub const SETTINGS_KEY: &str = "translator";

/// Raw key/value setting record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    /// Setting key.
    pub key: String,

    /// Setting value (JSON).
    pub value: serde_json::Value,

    /// When this setting was last updated.
    pub updated: chrono::DateTime<chrono::Utc>,
}

impl Setting {
    /// Get a setting value by key.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>> {
        let result =
            sqlx::query_scalar::<_, serde_json::Value>("SELECT value FROM setting WHERE key = $1")
                .bind(key)
                .fetch_optional(pool)
                .await
                .context("failed to get setting")?;

        Ok(result)
    }

    /// Set a setting value.
    pub async fn set(pool: &PgPool, key: &str, value: serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO setting (key, value, updated)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = $2, updated = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .context("failed to set setting")?;

        Ok(())
    }
}

/// Language switcher rendering style (consumed by switcher collaborators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitcherStyle {
    #[default]
    Dropdown,
    List,
    Flags,
}

/// Configured machine-translation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationBackend {
    #[default]
    None,
    Google,
    Deepl,
}

/// The translator configuration record.
///
/// Missing fields in a stored blob fall back to their defaults, so blobs
/// written by older versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    /// Locales offered to visitors, in display order.
    pub enabled_languages: Vec<String>,

    /// The source-content language.
    pub default_language: String,

    /// Whether collaborators should render a language switcher.
    pub display_language_switcher: bool,

    /// Switcher rendering style.
    pub language_switcher_style: SwitcherStyle,

    /// Whether localized links substitute translated slugs.
    pub translate_slugs: bool,

    /// Whether saves trigger background machine translation of blank fields.
    pub auto_translate: bool,

    /// Machine-translation backend.
    pub translation_service: TranslationBackend,

    /// API key for the machine-translation backend.
    pub api_key: String,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            enabled_languages: vec![crate::models::language::DEFAULT_LOCALE.to_string()],
            default_language: crate::models::language::DEFAULT_LOCALE.to_string(),
            display_language_switcher: true,
            language_switcher_style: SwitcherStyle::default(),
            translate_slugs: true,
            auto_translate: false,
            translation_service: TranslationBackend::default(),
            api_key: String::new(),
        }
    }
}

impl TranslatorSettings {
    /// Load the settings blob, falling back to defaults.
    ///
    /// A missing row yields defaults; a corrupt blob logs a warning and
    /// yields defaults rather than failing the caller.
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let Some(value) = Setting::get(pool, SETTINGS_KEY).await? else {
            return Ok(Self::default());
        };

        match serde_json::from_value(value) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt translator settings, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Persist the settings blob.
    pub async fn save(&self, pool: &PgPool) -> Result<()> {
        let value = serde_json::to_value(self).context("failed to serialize settings")?;
        Setting::set(pool, SETTINGS_KEY, value).await
    }

    /// Validate the invariant enforced at the admin persistence point:
    /// the default language must be a member of the enabled set.
    pub fn validate(&self) -> Result<()> {
        let default = self.default_language.trim();
        if default.is_empty() {
            anyhow::bail!("default language must not be empty");
        }
        if !self.enabled_languages.iter().any(|l| l == default) {
            anyhow::bail!("default language '{default}' is not in the enabled set");
        }
        Ok(())
    }
}
