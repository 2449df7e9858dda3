//! Language negotiation middleware.
//!
//! Resolves the active language for each request using a chain of
//! negotiators: explicit query parameter → stored cookie preference →
//! default. An explicit signal always overrides the cookie, even a stale
//! one; signals carrying a disabled or unknown language are skipped, never
//! surfaced as errors.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::models::settings::TranslatorSettings;
use crate::services::resolver::LANGUAGE_PARAM;
use crate::state::AppState;

/// Cookie holding a visitor's persisted language preference.
pub const LANGUAGE_COOKIE: &str = "tradotto_language";

/// Preference cookie lifetime: 30 days.
pub const COOKIE_MAX_AGE_SECONDS: i64 = 30 * 86_400;

/// The resolved language for the current request.
///
/// Stored in request extensions for per-request access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage(pub String);

/// Trait for language negotiation strategies.
///
/// Implementations inspect the request and return a candidate language code
/// if they can determine one. The middleware chains negotiators by priority
/// (highest first); the first candidate that is actually enabled wins.
pub trait LanguageNegotiator: Send + Sync {
    /// Attempt to extract a candidate language from the request.
    fn negotiate(&self, request: &Request<Body>) -> Option<String>;

    /// Priority of this negotiator (higher = checked first).
    fn priority(&self) -> i32;

    /// Negotiator name for logging.
    fn name(&self) -> &'static str;
}

/// Negotiates language from the explicit `lang` query parameter.
pub struct QueryParamNegotiator;

impl LanguageNegotiator for QueryParamNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let query = request.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == LANGUAGE_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    fn priority(&self) -> i32 {
        100
    }

    fn name(&self) -> &'static str {
        "query_param"
    }
}

/// Negotiates language from the stored preference cookie.
pub struct CookieNegotiator;

impl CookieNegotiator {
    /// Extract a cookie value from a `Cookie` header line.
    fn cookie_value(header: &str, name: &str) -> Option<String> {
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
    }
}

impl LanguageNegotiator for CookieNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|line| Self::cookie_value(line, LANGUAGE_COOKIE))
    }

    fn priority(&self) -> i32 {
        50
    }

    fn name(&self) -> &'static str {
        "cookie"
    }
}

/// Select the active language (sync, testable).
///
/// Walks the negotiator chain in priority order; a candidate wins only when
/// it is in the enabled set, so an invalid explicit signal falls through to
/// the stored preference, and an invalid preference falls through to the
/// default.
pub fn select_language(
    negotiators: &[Arc<dyn LanguageNegotiator>],
    request: &Request<Body>,
    enabled_languages: &[String],
    default_language: &str,
) -> String {
    for negotiator in negotiators {
        if let Some(candidate) = negotiator.negotiate(request) {
            if enabled_languages.iter().any(|l| l == &candidate) {
                return candidate;
            }
            tracing::warn!(
                language = %candidate,
                negotiator = negotiator.name(),
                "request carries unknown or disabled language, ignoring"
            );
        }
    }

    default_language.to_string()
}

/// Build the `Set-Cookie` value persisting a language preference:
/// 30-day expiry, scoped to the whole site path.
pub fn preference_cookie(locale: &str, same_site: &str) -> String {
    let same_site = match same_site {
        "none" => "None",
        "strict" => "Strict",
        _ => "Lax",
    };
    format!("{LANGUAGE_COOKIE}={locale}; Max-Age={COOKIE_MAX_AGE_SECONDS}; Path=/; SameSite={same_site}")
}

/// Middleware to negotiate the active language for each request.
///
/// Loads the settings snapshot once per request, resolves the language,
/// and inserts both into request extensions. A valid explicit query signal
/// is additionally persisted as the preference cookie on the response,
/// so following a tagged link switches the visitor's stored language.
pub async fn negotiate_language(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Health probes don't need language negotiation or a settings load.
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let settings = match TranslatorSettings::load(state.db()).await {
        Ok(settings) => settings,
        Err(e) => {
            // The render path never fails over configuration; fall back to
            // defaults and keep serving source-language content.
            tracing::warn!(error = %e, "failed to load translator settings, using defaults");
            TranslatorSettings::default()
        }
    };

    let registry = state.languages();
    let default_language = registry.default_language(&settings);
    let enabled_languages: Vec<String> = registry
        .enabled_languages(&settings)
        .into_iter()
        .map(|l| l.locale)
        .collect();

    let language = select_language(
        state.language_negotiators(),
        &request,
        &enabled_languages,
        &default_language,
    );

    // Persist a valid explicit signal after the response is produced.
    let persist = QueryParamNegotiator
        .negotiate(&request)
        .filter(|candidate| *candidate == language);

    let settings = Arc::new(settings);
    request
        .extensions_mut()
        .insert(ResolvedLanguage(language.clone()));
    request.extensions_mut().insert(settings);

    let mut response = next.run(request).await;

    if let Some(locale) = persist {
        let cookie = preference_cookie(&locale, state.cookie_same_site());
        match cookie.parse() {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(error = %e, locale = %locale, "failed to build preference cookie");
            }
        }
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn chain() -> Vec<Arc<dyn LanguageNegotiator>> {
        let mut negotiators: Vec<Arc<dyn LanguageNegotiator>> =
            vec![Arc::new(CookieNegotiator), Arc::new(QueryParamNegotiator)];
        negotiators.sort_by_key(|n| std::cmp::Reverse(n.priority()));
        negotiators
    }

    fn enabled() -> Vec<String> {
        vec!["en_US".to_string(), "fr_FR".to_string()]
    }

    fn request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    // --- QueryParamNegotiator tests ---

    #[test]
    fn query_param_extracts_language() {
        let req = request("/post/42?lang=fr_FR", None);
        assert_eq!(
            QueryParamNegotiator.negotiate(&req),
            Some("fr_FR".to_string())
        );
    }

    #[test]
    fn query_param_ignores_other_parameters() {
        let req = request("/post/42?page=2&slang=xx", None);
        assert_eq!(QueryParamNegotiator.negotiate(&req), None);
    }

    #[test]
    fn query_param_empty_value_ignored() {
        let req = request("/post/42?lang=", None);
        assert_eq!(QueryParamNegotiator.negotiate(&req), None);
    }

    #[test]
    fn query_param_no_query_returns_none() {
        let req = request("/post/42", None);
        assert_eq!(QueryParamNegotiator.negotiate(&req), None);
    }

    // --- CookieNegotiator tests ---

    #[test]
    fn cookie_extracts_language() {
        let req = request("/", Some("tradotto_language=fr_FR"));
        assert_eq!(CookieNegotiator.negotiate(&req), Some("fr_FR".to_string()));
    }

    #[test]
    fn cookie_found_among_others() {
        let req = request("/", Some("session=abc123; tradotto_language=fr_FR; theme=dark"));
        assert_eq!(CookieNegotiator.negotiate(&req), Some("fr_FR".to_string()));
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        let req = request("/", Some("xtradotto_language=fr_FR"));
        assert_eq!(CookieNegotiator.negotiate(&req), None);
    }

    #[test]
    fn cookie_absent_returns_none() {
        let req = request("/", None);
        assert_eq!(CookieNegotiator.negotiate(&req), None);
    }

    // --- select_language tests ---

    #[test]
    fn explicit_signal_wins() {
        let req = request("/?lang=fr_FR", Some("tradotto_language=en_US"));
        let result = select_language(&chain(), &req, &enabled(), "en_US");
        assert_eq!(result, "fr_FR");
    }

    #[test]
    fn invalid_explicit_signal_falls_to_cookie() {
        // de_DE is not enabled; the stored fr_FR preference wins.
        let req = request("/?lang=de_DE", Some("tradotto_language=fr_FR"));
        let result = select_language(&chain(), &req, &enabled(), "en_US");
        assert_eq!(result, "fr_FR");
    }

    #[test]
    fn cookie_wins_without_explicit_signal() {
        let req = request("/", Some("tradotto_language=fr_FR"));
        let result = select_language(&chain(), &req, &enabled(), "en_US");
        assert_eq!(result, "fr_FR");
    }

    #[test]
    fn invalid_cookie_falls_to_default() {
        let req = request("/", Some("tradotto_language=de_DE"));
        let result = select_language(&chain(), &req, &enabled(), "en_US");
        assert_eq!(result, "en_US");
    }

    #[test]
    fn nothing_set_falls_to_default() {
        let req = request("/", None);
        let result = select_language(&chain(), &req, &enabled(), "en_US");
        assert_eq!(result, "en_US");
    }

    // --- preference_cookie tests ---

    #[test]
    fn preference_cookie_format() {
        let cookie = preference_cookie("fr_FR", "lax");
        assert_eq!(
            cookie,
            "tradotto_language=fr_FR; Max-Age=2592000; Path=/; SameSite=Lax"
        );
    }

    #[test]
    fn preference_cookie_same_site_variants() {
        assert!(preference_cookie("fr_FR", "strict").ends_with("SameSite=Strict"));
        assert!(preference_cookie("fr_FR", "none").ends_with("SameSite=None"));
        assert!(preference_cookie("fr_FR", "bogus").ends_with("SameSite=Lax"));
    }
}
