//! Data models.

pub mod language;
pub mod settings;
pub mod translation;

pub use language::{DEFAULT_LOCALE, LanguageDescriptor, LanguageRegistry};
pub use settings::{Setting, SwitcherStyle, TranslationBackend, TranslatorSettings};
pub use translation::{
    ObjectType, TranslationField, TranslationPayload, TranslationRecord, TranslationStatus,
};
