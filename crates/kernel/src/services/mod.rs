//! Kernel services.
//!
//! The translation store owns persistence; the resolver applies fallback
//! policy for render-path consumers; machine translation is a stubbed
//! external backend invoked off the save path.

pub mod machine;
pub mod resolver;
pub mod store;
pub mod strings;

pub use resolver::{ContentResolver, MenuItemView, TermView, add_language_to_url};
pub use store::{SaveOutcome, TranslationFilter, TranslationStore};
pub use strings::{StringCache, string_object_id};
