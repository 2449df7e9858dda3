//! HTTP middleware components.

pub mod language;

pub use language::{
    LanguageNegotiator, ResolvedLanguage, negotiate_language, preference_cookie, select_language,
};
