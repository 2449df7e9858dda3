//! Language registry.
//!
//! Enumerates the locales this deployment can translate into and derives
//! display metadata for them. The catalog is built into the binary; which
//! subset is enabled, and which locale is the default, comes from the
//! translator settings.

use serde::{Deserialize, Serialize};

use crate::models::settings::TranslatorSettings;

/// The built-in default locale, always available.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Display metadata for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    /// Locale code, e.g. "fr_FR".
    pub locale: String,

    /// English display name.
    pub name: String,

    /// Native display name.
    pub native_name: String,

    /// Two-letter language code, e.g. "fr".
    pub lang_code: String,

    /// Flag asset key, the locale's country suffix lower-cased.
    pub flag: String,
}

/// Built-in locale catalog: (locale, English name, native name).
///
/// The analogue of a host platform's installed-translation list. en_US is
/// intentionally absent here; it is hard-coded in `describe` and always
/// listed first.
const CATALOG: &[(&str, &str, &str)] = &[
    ("ar", "Arabic", "العربية"),
    ("cs_CZ", "Czech", "Čeština"),
    ("da_DK", "Danish", "Dansk"),
    ("de_DE", "German", "Deutsch"),
    ("el", "Greek", "Ελληνικά"),
    ("en_GB", "English (UK)", "English (UK)"),
    ("es_ES", "Spanish (Spain)", "Español"),
    ("fi", "Finnish", "Suomi"),
    ("fr_FR", "French (France)", "Français"),
    ("he_IL", "Hebrew", "עברית"),
    ("hu_HU", "Hungarian", "Magyar"),
    ("id_ID", "Indonesian", "Bahasa Indonesia"),
    ("it_IT", "Italian", "Italiano"),
    ("ja", "Japanese", "日本語"),
    ("ko_KR", "Korean", "한국어"),
    ("nb_NO", "Norwegian (Bokmål)", "Norsk bokmål"),
    ("nl_NL", "Dutch", "Nederlands"),
    ("pl_PL", "Polish", "Polski"),
    ("pt_BR", "Portuguese (Brazil)", "Português do Brasil"),
    ("pt_PT", "Portuguese (Portugal)", "Português"),
    ("ro_RO", "Romanian", "Română"),
    ("ru_RU", "Russian", "Русский"),
    ("sv_SE", "Swedish", "Svenska"),
    ("tr_TR", "Turkish", "Türkçe"),
    ("uk", "Ukrainian", "Українська"),
    ("vi", "Vietnamese", "Tiếng Việt"),
    ("zh_CN", "Chinese (China)", "简体中文"),
    ("zh_TW", "Chinese (Taiwan)", "繁體中文"),
];

/// Registry over the built-in catalog and the configured language set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageRegistry;

impl LanguageRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Derive the descriptor for a locale.
    ///
    /// en_US is hard-coded; catalog locales get their catalog names; anything
    /// else falls back to the raw locale string for both names. The language
    /// code is the 2-letter prefix and the flag key the 2-letter suffix,
    /// lower-cased.
    pub fn describe(&self, locale: &str) -> LanguageDescriptor {
        if locale == DEFAULT_LOCALE {
            return LanguageDescriptor {
                locale: DEFAULT_LOCALE.to_string(),
                name: "English (United States)".to_string(),
                native_name: "English (United States)".to_string(),
                lang_code: "en".to_string(),
                flag: "us".to_string(),
            };
        }

        let (name, native_name) = CATALOG
            .iter()
            .find(|(l, _, _)| *l == locale)
            .map(|(_, name, native)| (name.to_string(), native.to_string()))
            .unwrap_or_else(|| (locale.to_string(), locale.to_string()));

        LanguageDescriptor {
            locale: locale.to_string(),
            name,
            native_name,
            lang_code: prefix_code(locale),
            flag: suffix_code(locale),
        }
    }

    /// All locales this deployment can offer, en_US first.
    pub fn available_languages(&self) -> Vec<LanguageDescriptor> {
        let mut languages = Vec::with_capacity(CATALOG.len() + 1);
        languages.push(self.describe(DEFAULT_LOCALE));
        languages.extend(CATALOG.iter().map(|(locale, _, _)| self.describe(locale)));
        languages
    }

    /// Whether a locale resolves in the available set.
    pub fn is_available(&self, locale: &str) -> bool {
        locale == DEFAULT_LOCALE || CATALOG.iter().any(|(l, _, _)| *l == locale)
    }

    /// The configured default language, en_US when unset or blank.
    pub fn default_language(&self, settings: &TranslatorSettings) -> String {
        let configured = settings.default_language.trim();
        if configured.is_empty() {
            DEFAULT_LOCALE.to_string()
        } else {
            configured.to_string()
        }
    }

    /// The enabled subset, in configured order.
    ///
    /// Configured locales that no longer resolve in the available set are
    /// dropped silently (stale configuration), and the default language is
    /// implicitly enabled even when the configured set omits it.
    pub fn enabled_languages(&self, settings: &TranslatorSettings) -> Vec<LanguageDescriptor> {
        let default = self.default_language(settings);

        let mut languages: Vec<LanguageDescriptor> = settings
            .enabled_languages
            .iter()
            .filter(|locale| self.is_available(locale))
            .map(|locale| self.describe(locale))
            .collect();

        if self.is_available(&default) && !languages.iter().any(|l| l.locale == default) {
            languages.insert(0, self.describe(&default));
        }

        languages
    }

    /// Whether a locale is in the enabled set.
    pub fn is_enabled(&self, settings: &TranslatorSettings, locale: &str) -> bool {
        self.enabled_languages(settings)
            .iter()
            .any(|l| l.locale == locale)
    }
}

/// Validate a locale code supplied by an editing caller.
///
/// Accepts the usual locale shapes ("en_US", "ja", "pt_BR", "zh-hans"):
/// ASCII letters, digits, underscores, and hyphens, at most 20 characters.
/// Anything else is rejected before it can reach storage.
pub fn validate_locale(locale: &str) -> anyhow::Result<()> {
    if locale.is_empty() || locale.len() > 20 {
        anyhow::bail!("locale must be 1-20 characters, got '{locale}'");
    }
    if !locale
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        anyhow::bail!("locale contains invalid characters: '{locale}'");
    }
    Ok(())
}

/// 2-letter language code from a locale ("fr_FR" → "fr", "ja" → "ja").
fn prefix_code(locale: &str) -> String {
    locale.chars().take(2).collect::<String>().to_lowercase()
}

/// 2-letter flag key from a locale ("fr_FR" → "fr", "de_DE" → "de").
fn suffix_code(locale: &str) -> String {
    let chars: Vec<char> = locale.chars().collect();
    let start = chars.len().saturating_sub(2);
    chars[start..].iter().collect::<String>().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn settings(enabled: &[&str], default: &str) -> TranslatorSettings {
        TranslatorSettings {
            enabled_languages: enabled.iter().map(|s| s.to_string()).collect(),
            default_language: default.to_string(),
            ..TranslatorSettings::default()
        }
    }

    #[test]
    fn default_locale_is_hard_coded() {
        let registry = LanguageRegistry::new();
        let en = registry.describe("en_US");
        assert_eq!(en.name, "English (United States)");
        assert_eq!(en.native_name, "English (United States)");
        assert_eq!(en.lang_code, "en");
        assert_eq!(en.flag, "us");
    }

    #[test]
    fn catalog_locale_derivation() {
        let registry = LanguageRegistry::new();
        let fr = registry.describe("fr_FR");
        assert_eq!(fr.name, "French (France)");
        assert_eq!(fr.native_name, "Français");
        assert_eq!(fr.lang_code, "fr");
        assert_eq!(fr.flag, "fr");

        let pt = registry.describe("pt_BR");
        assert_eq!(pt.lang_code, "pt");
        assert_eq!(pt.flag, "br");
    }

    #[test]
    fn unknown_locale_falls_back_to_raw_string() {
        let registry = LanguageRegistry::new();
        let xx = registry.describe("xx_YY");
        assert_eq!(xx.name, "xx_YY");
        assert_eq!(xx.native_name, "xx_YY");
        assert_eq!(xx.lang_code, "xx");
        assert_eq!(xx.flag, "yy");
    }

    #[test]
    fn short_locale_flag_derivation() {
        let registry = LanguageRegistry::new();
        let ja = registry.describe("ja");
        assert_eq!(ja.lang_code, "ja");
        assert_eq!(ja.flag, "ja");
    }

    #[test]
    fn available_languages_lists_default_first() {
        let registry = LanguageRegistry::new();
        let available = registry.available_languages();
        assert_eq!(available[0].locale, "en_US");
        assert!(available.iter().any(|l| l.locale == "fr_FR"));
    }

    #[test]
    fn enabled_languages_preserves_configured_order() {
        let registry = LanguageRegistry::new();
        let settings = settings(&["en_US", "fr_FR", "de_DE"], "en_US");
        let enabled = registry.enabled_languages(&settings);
        let locales: Vec<&str> = enabled.iter().map(|l| l.locale.as_str()).collect();
        assert_eq!(locales, vec!["en_US", "fr_FR", "de_DE"]);
    }

    #[test]
    fn enabled_languages_drops_stale_locales() {
        let registry = LanguageRegistry::new();
        let settings = settings(&["en_US", "xx_YY"], "en_US");
        let enabled = registry.enabled_languages(&settings);
        let locales: Vec<&str> = enabled.iter().map(|l| l.locale.as_str()).collect();
        assert_eq!(locales, vec!["en_US"]);
    }

    #[test]
    fn default_is_implicitly_enabled() {
        // A violated default∈enabled invariant is tolerated at read time.
        let registry = LanguageRegistry::new();
        let settings = settings(&["fr_FR"], "en_US");
        assert!(registry.is_enabled(&settings, "en_US"));
        assert!(registry.is_enabled(&settings, "fr_FR"));
        assert!(!registry.is_enabled(&settings, "de_DE"));
    }

    #[test]
    fn validate_locale_accepts_usual_shapes() {
        assert!(validate_locale("en_US").is_ok());
        assert!(validate_locale("ja").is_ok());
        assert!(validate_locale("zh-hans").is_ok());
    }

    #[test]
    fn validate_locale_rejects_invalid() {
        assert!(validate_locale("").is_err(), "empty");
        assert!(validate_locale("fr FR").is_err(), "space");
        assert!(validate_locale("../etc").is_err(), "path traversal");
        assert!(validate_locale(&"a".repeat(21)).is_err(), "too long");
    }

    #[test]
    fn blank_default_falls_back_to_en_us() {
        let registry = LanguageRegistry::new();
        let settings = settings(&["fr_FR"], "  ");
        assert_eq!(registry.default_language(&settings), "en_US");
    }
}
