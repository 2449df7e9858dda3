#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for language negotiation and render-path resolution.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{TestApp, body_json};
use serde_json::json;
use tradotto_kernel::services::string_object_id;

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["postgres"], true);
}

#[tokio::test]
async fn resolution_falls_back_field_by_field() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_001;
    app.cleanup_object("post", object_id).await;

    // Translated title, blank content.
    let response = app
        .put_json(
            &format!("/api/translations/post/{object_id}/fr_FR"),
            json!({ "fields": { "title": "Bonjour" }, "status": "published" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_json(
            "/api/resolve?lang=fr_FR",
            json!({
                "object_id": object_id,
                "object_type": "post",
                "field": "title",
                "source_value": "Hello"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["resolved"], "Bonjour");
    assert_eq!(body["language"], "fr_FR");

    // The blank content field degrades to the source value.
    let response = app
        .post_json(
            "/api/resolve?lang=fr_FR",
            json!({
                "object_id": object_id,
                "object_type": "post",
                "field": "content",
                "source_value": "<p>Hi</p>"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["resolved"], "<p>Hi</p>");

    app.cleanup_object("post", object_id).await;
}

#[tokio::test]
async fn default_language_returns_source_without_lookup() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_002;
    app.cleanup_object("post", object_id).await;

    app.put_json(
        &format!("/api/translations/post/{object_id}/fr_FR"),
        json!({ "fields": { "title": "Bonjour" }, "status": "published" }),
    )
    .await;

    // No language signal: the default language sees source values even
    // though a translation exists.
    let response = app
        .post_json(
            "/api/resolve",
            json!({
                "object_id": object_id,
                "object_type": "post",
                "field": "title",
                "source_value": "Hello"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["resolved"], "Hello");
    assert_eq!(body["language"], "en_US");

    app.cleanup_object("post", object_id).await;
}

#[tokio::test]
async fn draft_translations_stay_off_the_render_path() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_003;
    app.cleanup_object("post", object_id).await;

    app.put_json(
        &format!("/api/translations/post/{object_id}/fr_FR"),
        json!({ "fields": { "title": "Brouillon" }, "status": "draft" }),
    )
    .await;

    let response = app
        .post_json(
            "/api/resolve?lang=fr_FR",
            json!({
                "object_id": object_id,
                "object_type": "post",
                "field": "title",
                "source_value": "Hello"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["resolved"], "Hello");

    // The editing surface still reads the draft.
    let response = app
        .get(&format!("/api/translations/post/{object_id}/fr_FR"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "draft");
    assert_eq!(body["title"], "Brouillon");

    app.cleanup_object("post", object_id).await;
}

#[tokio::test]
async fn invalid_explicit_signal_falls_to_stored_preference() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;

    // de_DE is not enabled; the fr_FR cookie wins.
    let response = app
        .request(
            Request::get("/api/languages?lang=de_DE")
                .header("cookie", "tradotto_language=fr_FR")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["current"], "fr_FR");
    assert_eq!(body["default"], "en_US");
}

#[tokio::test]
async fn valid_explicit_signal_persists_preference_cookie() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;

    let response = app.get("/api/languages?lang=fr_FR").await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("tradotto_language=fr_FR"));
    assert!(cookie.contains("Max-Age=2592000"));
    assert!(cookie.contains("Path=/"));

    let body = body_json(response).await;
    assert_eq!(body["current"], "fr_FR");

    // An invalid signal is skipped and persists nothing.
    let response = app.get("/api/languages?lang=de_DE").await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(body["current"], "en_US");
}

#[tokio::test]
async fn set_language_rejects_disabled_locale() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;

    let response = app
        .put_json("/api/language", json!({ "locale": "de_DE" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = app
        .put_json("/api/language", json!({ "locale": "fr_FR" }))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("tradotto_language=fr_FR"));
}

#[tokio::test]
async fn blank_save_deletes_via_api() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_004;
    app.cleanup_object("post", object_id).await;

    let response = app
        .put_json(
            &format!("/api/translations/post/{object_id}/fr_FR"),
            json!({ "fields": { "title": "Bonjour" }, "status": "published" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Blanking every field removes the record instead of storing it empty.
    let response = app
        .put_json(
            &format!("/api/translations/post/{object_id}/fr_FR"),
            json!({ "fields": { "title": "", "content": "" }, "status": "published" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .get(&format!("/api/translations/post/{object_id}/fr_FR"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_object_type_is_rejected() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };

    let response = app
        .put_json(
            "/api/translations/page/1/fr_FR",
            json!({ "fields": { "title": "Bonjour" } }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/translations/page/1/fr_FR").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn localize_url_substitutes_slug_and_tags_language() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_005;
    app.cleanup_object("post", object_id).await;

    app.put_json(
        &format!("/api/translations/post/{object_id}/fr_FR"),
        json!({
            "fields": { "title": "Bonjour", "slug": "bonjour-monde" },
            "status": "published"
        }),
    )
    .await;

    let response = app
        .post_json(
            "/api/localize-url?lang=fr_FR",
            json!({
                "url": "https://example.com/hello-world/",
                "object_id": object_id,
                "object_type": "post",
                "source_slug": "hello-world"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["url"], "https://example.com/bonjour-monde/?lang=fr_FR");

    // Default language: untouched.
    let response = app
        .post_json(
            "/api/localize-url",
            json!({
                "url": "https://example.com/hello-world/",
                "object_id": object_id,
                "object_type": "post",
                "source_slug": "hello-world"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["url"], "https://example.com/hello-world/");

    app.cleanup_object("post", object_id).await;
}

#[tokio::test]
async fn menu_items_overlay_and_tag_custom_links() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_006;
    app.cleanup_object("menu_item", object_id).await;

    app.put_json(
        &format!("/api/translations/menu_item/{object_id}/fr_FR"),
        json!({
            "fields": { "title": "Accueil", "attr_title": "Page d'accueil" },
            "status": "published"
        }),
    )
    .await;

    let response = app
        .post_json(
            "/api/resolve/menu?lang=fr_FR",
            json!({
                "items": [
                    {
                        "id": object_id,
                        "title": "Home",
                        "attr_title": "Home page",
                        "description": "The front page",
                        "url": "/home",
                        "custom_link": true
                    },
                    {
                        "id": 999_999_901i64,
                        "title": "Untranslated",
                        "custom_link": false
                    }
                ]
            }),
        )
        .await;
    let body = body_json(response).await;

    assert_eq!(body[0]["title"], "Accueil");
    assert_eq!(body[0]["attr_title"], "Page d'accueil");
    // No translated description: the source text stays.
    assert_eq!(body[0]["description"], "The front page");
    assert_eq!(body[0]["url"], "/home?lang=fr_FR");

    // Items without translations pass through untouched.
    assert_eq!(body[1]["title"], "Untranslated");

    app.cleanup_object("menu_item", object_id).await;
}

#[tokio::test]
async fn post_view_resolves_through_overlay_pipeline() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;
    let object_id = 920_007;
    app.cleanup_object("post", object_id).await;

    app.put_json(
        &format!("/api/translations/post/{object_id}/fr_FR"),
        json!({ "fields": { "title": "Bonjour" }, "status": "published" }),
    )
    .await;

    let response = app
        .post_json(
            "/api/resolve/post?lang=fr_FR",
            json!({
                "object_id": object_id,
                "title": "Hello",
                "content": "<p>Hi</p>",
                "excerpt": "Hi"
            }),
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["title"], "Bonjour");
    assert_eq!(body["content"], "<p>Hi</p>");
    assert_eq!(body["excerpt"], "Hi");

    app.cleanup_object("post", object_id).await;
}

#[tokio::test]
async fn arbitrary_strings_resolve_by_derived_id() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    app.enable_french().await;

    let source = "Read more from test 920008";
    let object_id = string_object_id(source);
    app.cleanup_object("string", object_id).await;

    app.put_json(
        &format!("/api/translations/string/{object_id}/fr_FR"),
        json!({ "fields": { "content": "Lire la suite" }, "status": "published" }),
    )
    .await;

    let response = app
        .post_json("/api/resolve/text?lang=fr_FR", json!({ "text": source }))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["text"], "Lire la suite");

    // Second resolution is served from the string cache.
    let response = app
        .post_json("/api/resolve/text?lang=fr_FR", json!({ "text": source }))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["text"], "Lire la suite");

    app.cleanup_object("string", object_id).await;
    app.state.strings().invalidate_all_languages(object_id);
}

#[tokio::test]
async fn settings_reject_default_outside_enabled_set() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };

    let response = app
        .put_json(
            "/api/settings",
            json!({
                "enabled_languages": ["fr_FR"],
                "default_language": "en_US"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
