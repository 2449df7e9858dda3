//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::content::overlay::OverlayPipeline;
use crate::db;
use crate::middleware::language::{CookieNegotiator, LanguageNegotiator, QueryParamNegotiator};
use crate::models::language::LanguageRegistry;
use crate::services::store::TranslationStore;
use crate::services::strings::StringCache;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Translation store, the sole owner of translation rows.
    store: TranslationStore,

    /// Language registry over the built-in locale catalog.
    languages: LanguageRegistry,

    /// Cache of resolved arbitrary-string translations.
    strings: StringCache,

    /// Post render overlay pipeline, registered at startup with explicit
    /// ordering.
    overlays: OverlayPipeline,

    /// Language negotiator chain (sorted by priority descending).
    negotiators: Vec<Arc<dyn LanguageNegotiator>>,

    /// Shared HTTP client for machine-translation backends.
    http: reqwest::Client,

    /// SameSite policy for the preference cookie.
    cookie_same_site: String,
}

impl AppState {
    /// Create new application state with database connections.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        let store = TranslationStore::new(db.clone());

        let mut negotiators: Vec<Arc<dyn LanguageNegotiator>> =
            vec![Arc::new(QueryParamNegotiator), Arc::new(CookieNegotiator)];
        negotiators.sort_by_key(|n| std::cmp::Reverse(n.priority()));

        let overlays = OverlayPipeline::standard();
        info!(overlays = ?overlays.names(), "registered render overlays");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                store,
                languages: LanguageRegistry::new(),
                strings: StringCache::new(),
                overlays,
                negotiators,
                http: reqwest::Client::new(),
                cookie_same_site: config.cookie_same_site.clone(),
            }),
        })
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the translation store.
    pub fn store(&self) -> &TranslationStore {
        &self.inner.store
    }

    /// Get the language registry.
    pub fn languages(&self) -> &LanguageRegistry {
        &self.inner.languages
    }

    /// Get the string translation cache.
    pub fn strings(&self) -> &StringCache {
        &self.inner.strings
    }

    /// Get the post render overlay pipeline.
    pub fn overlays(&self) -> &OverlayPipeline {
        &self.inner.overlays
    }

    /// Get the language negotiator chain (sorted by priority descending).
    pub fn language_negotiators(&self) -> &[Arc<dyn LanguageNegotiator>] {
        &self.inner.negotiators
    }

    /// Get the shared HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// SameSite policy for the preference cookie.
    pub fn cookie_same_site(&self) -> &str {
        &self.inner.cookie_same_site
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
