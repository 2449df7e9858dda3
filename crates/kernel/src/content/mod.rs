//! Render-path content composition.

pub mod overlay;

pub use overlay::{FieldOverlay, OverlayPipeline, PostView};
