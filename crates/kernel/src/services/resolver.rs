//! Content resolution facade.
//!
//! Applies the fallback rule for every render-path consumer: a missing or
//! partially filled translation degrades field-by-field to the source
//! value, never to an error or a hidden object. Built per request from the
//! resolved language and a settings snapshot.

use url::Url;

use crate::content::overlay::{OverlayPipeline, PostView};
use crate::models::settings::TranslatorSettings;
use crate::models::translation::{
    ObjectType, TranslationField, TranslationRecord, TranslationStatus,
};
use crate::services::store::TranslationStore;
use crate::services::strings::{StringCache, string_object_id};

/// Query parameter carrying the explicit language signal.
pub const LANGUAGE_PARAM: &str = "lang";

/// Menu item fields seen by the render path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MenuItemView {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub attr_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Custom links get the language parameter appended to their URL.
    #[serde(default)]
    pub custom_link: bool,
}

/// Term fields seen by the render path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TermView {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Per-request resolution facade.
pub struct ContentResolver<'a> {
    store: &'a TranslationStore,
    strings: &'a StringCache,
    current_language: String,
    default_language: String,
    translate_slugs: bool,
}

impl<'a> ContentResolver<'a> {
    /// Build a resolver for one request.
    pub fn new(
        store: &'a TranslationStore,
        strings: &'a StringCache,
        settings: &TranslatorSettings,
        current_language: &str,
        default_language: &str,
    ) -> Self {
        Self {
            store,
            strings,
            current_language: current_language.to_string(),
            default_language: default_language.to_string(),
            translate_slugs: settings.translate_slugs,
        }
    }

    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    fn in_default_language(&self) -> bool {
        self.current_language == self.default_language
    }

    /// Fetch the translation eligible for public display, if any.
    ///
    /// Returns `None` in the default language (no lookup at all), for
    /// missing or draft records, and on storage failure — the render path
    /// degrades to source content rather than erroring.
    async fn displayable(
        &self,
        object_id: i64,
        object_type: ObjectType,
    ) -> Option<TranslationRecord> {
        if self.in_default_language() {
            return None;
        }

        match self
            .store
            .get(object_id, object_type, &self.current_language)
            .await
        {
            Ok(record) => record.filter(|r| r.status == TranslationStatus::Published),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    object_id,
                    object_type = %object_type,
                    "translation lookup failed, falling back to source content"
                );
                None
            }
        }
    }

    /// Resolve one field: the translated value when present and non-blank,
    /// otherwise the source value.
    pub async fn resolve_field(
        &self,
        object_id: i64,
        object_type: ObjectType,
        field: TranslationField,
        source_value: &str,
    ) -> String {
        match self.displayable(object_id, object_type).await {
            Some(record) => record
                .payload
                .non_blank(field)
                .unwrap_or(source_value)
                .to_string(),
            None => source_value.to_string(),
        }
    }

    /// Resolve a post view through the overlay pipeline.
    pub async fn post(&self, object_id: i64, mut view: PostView, pipeline: &OverlayPipeline) -> PostView {
        if let Some(record) = self.displayable(object_id, ObjectType::Post).await {
            pipeline.apply(&mut view, &record.payload);
        }
        view
    }

    /// Resolve a menu item: title, attribute title, and description overlay
    /// field-by-field; custom-link URLs get the language parameter.
    pub async fn menu_item(&self, mut view: MenuItemView) -> MenuItemView {
        if let Some(record) = self.displayable(view.id, ObjectType::MenuItem).await {
            if let Some(title) = record.payload.non_blank(TranslationField::Title) {
                view.title = title.to_string();
            }
            if let Some(attr_title) = record.payload.non_blank(TranslationField::AttrTitle) {
                view.attr_title = attr_title.to_string();
            }
            if let Some(description) = record.payload.non_blank(TranslationField::Description) {
                view.description = description.to_string();
            }
            if view.custom_link
                && let Some(url) = view.url.take()
            {
                view.url = Some(self.add_language(&url));
            }
        }
        view
    }

    /// Resolve a term's name and description.
    pub async fn term(&self, mut view: TermView) -> TermView {
        if let Some(record) = self.displayable(view.id, ObjectType::Term).await {
            if let Some(name) = record.payload.non_blank(TranslationField::Title) {
                view.name = name.to_string();
            }
            if let Some(description) = record.payload.non_blank(TranslationField::Description) {
                view.description = description.to_string();
            }
        }
        view
    }

    /// Resolve a widget title by the widget's instance id.
    ///
    /// Empty source titles pass through untouched.
    pub async fn widget_title(&self, widget_id: i64, source_title: &str) -> String {
        if source_title.is_empty() {
            return source_title.to_string();
        }
        self.resolve_field(
            widget_id,
            ObjectType::Widget,
            TranslationField::Title,
            source_title,
        )
        .await
    }

    /// Resolve an arbitrary source string, via the string cache.
    pub async fn text(&self, source: &str) -> String {
        if source.is_empty() || self.in_default_language() {
            return source.to_string();
        }

        let object_id = string_object_id(source);

        if let Some(cached) = self.strings.get(&self.current_language, object_id) {
            return cached;
        }

        let resolved = self
            .resolve_field(object_id, ObjectType::String, TranslationField::Content, source)
            .await;

        if resolved != source {
            self.strings
                .insert(&self.current_language, object_id, resolved.clone());
        }

        resolved
    }

    /// Localize a fully-formed link to an object.
    ///
    /// In the default language the link passes through untouched. Otherwise,
    /// when slug translation is enabled and a displayable translation carries
    /// a slug, the `/{source_slug}/` path segment is substituted; the
    /// language parameter is appended either way.
    pub async fn localize_permalink(
        &self,
        link: &str,
        source_slug: &str,
        object_id: i64,
        object_type: ObjectType,
    ) -> String {
        if self.in_default_language() {
            return link.to_string();
        }

        let mut link = link.to_string();

        if self.translate_slugs && !source_slug.is_empty() {
            if let Some(record) = self.displayable(object_id, object_type).await
                && let Some(translated_slug) = record.payload.non_blank(TranslationField::Slug)
            {
                link = substitute_slug(&link, source_slug, translated_slug);
            }
        }

        self.add_language(&link)
    }

    /// Tag a URL with the current language.
    pub fn add_language(&self, url: &str) -> String {
        add_language_to_url(url, &self.current_language, &self.default_language)
    }
}

/// Substitute the path segment holding the source slug with the translated
/// slug. Matches the segment form `/{slug}/` only, so partial matches
/// inside other segments are left alone.
fn substitute_slug(link: &str, source_slug: &str, translated_slug: &str) -> String {
    link.replace(
        &format!("/{source_slug}/"),
        &format!("/{translated_slug}/"),
    )
}

/// Set or overwrite the language query parameter on a URL.
///
/// No-ops for the default language. Accepts absolute URLs and site-relative
/// paths; reserializes scheme/host/port/path/query/fragment in that fixed
/// order, so reapplying the same language yields the same URL and the
/// parameter is never duplicated. Unparseable input passes through
/// untouched.
pub fn add_language_to_url(url: &str, language: &str, default_language: &str) -> String {
    if language == default_language {
        return url.to_string();
    }

    // Dummy base for site-relative links; stripped back off below.
    const RELATIVE_BASE: &str = "http://relative.invalid";

    let (mut parsed, relative) = match Url::parse(url) {
        Ok(parsed) => (parsed, false),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(RELATIVE_BASE).ok().and_then(|base| base.join(url).ok()) {
                Some(parsed) => (parsed, true),
                None => return url.to_string(),
            }
        }
        Err(_) => return url.to_string(),
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != LANGUAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = parsed.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
        query.append_pair(LANGUAGE_PARAM, language);
    }

    if relative {
        let mut out = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = parsed.fragment() {
            out.push('#');
            out.push_str(fragment);
        }
        out
    } else {
        parsed.to_string()
    }
}
