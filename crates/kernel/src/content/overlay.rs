//! Post render overlay pipeline.
//!
//! Field decorators composed around the post render path, registered at
//! startup in explicit order. Each overlay replaces one view field when the
//! translation carries a non-blank value for it; anything else stays
//! source-language.

use serde::{Deserialize, Serialize};

use crate::models::translation::{TranslationField, TranslationPayload};

/// Post fields seen by the render path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
}

/// Trait for post field overlays in the pipeline.
pub trait FieldOverlay: Send + Sync {
    /// Overlay name for debugging.
    fn name(&self) -> &str;

    /// Apply this overlay to the view.
    fn apply(&self, view: &mut PostView, payload: &TranslationPayload);
}

/// Pipeline of field overlays applied in registration order.
pub struct OverlayPipeline {
    overlays: Vec<Box<dyn FieldOverlay>>,
}

impl OverlayPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            overlays: Vec::new(),
        }
    }

    /// Add an overlay to the pipeline.
    pub fn add<F: FieldOverlay + 'static>(mut self, overlay: F) -> Self {
        self.overlays.push(Box::new(overlay));
        self
    }

    /// The standard post pipeline: title, then content, then excerpt.
    pub fn standard() -> Self {
        Self::new()
            .add(TitleOverlay)
            .add(ContentOverlay)
            .add(ExcerptOverlay)
    }

    /// Apply all overlays to the view, in order.
    pub fn apply(&self, view: &mut PostView, payload: &TranslationPayload) {
        for overlay in &self.overlays {
            overlay.apply(view, payload);
        }
    }

    /// Registered overlay names, in application order.
    pub fn names(&self) -> Vec<&str> {
        self.overlays.iter().map(|o| o.name()).collect()
    }
}

impl Default for OverlayPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Replaces the post title.
pub struct TitleOverlay;

impl FieldOverlay for TitleOverlay {
    fn name(&self) -> &str {
        "title"
    }

    fn apply(&self, view: &mut PostView, payload: &TranslationPayload) {
        if let Some(title) = payload.non_blank(TranslationField::Title) {
            view.title = title.to_string();
        }
    }
}

/// Replaces the post body.
pub struct ContentOverlay;

impl FieldOverlay for ContentOverlay {
    fn name(&self) -> &str {
        "content"
    }

    fn apply(&self, view: &mut PostView, payload: &TranslationPayload) {
        if let Some(content) = payload.non_blank(TranslationField::Content) {
            view.content = content.to_string();
        }
    }
}

/// Replaces the post excerpt.
pub struct ExcerptOverlay;

impl FieldOverlay for ExcerptOverlay {
    fn name(&self) -> &str {
        "excerpt"
    }

    fn apply(&self, view: &mut PostView, payload: &TranslationPayload) {
        if let Some(excerpt) = payload.non_blank(TranslationField::Excerpt) {
            view.excerpt = excerpt.to_string();
        }
    }
}
