//! Translation record model.
//!
//! A translation overlays alternate-language text onto one content object,
//! keyed by `(object_id, object_type, language_code)`. The payload is a
//! tagged union: each object type declares its own field set instead of
//! sharing one loosely-typed record.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of translatable content objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Post,
    MenuItem,
    Term,
    Widget,
    String,
}

impl ObjectType {
    /// Stable storage identifier for this object type.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Post => "post",
            ObjectType::MenuItem => "menu_item",
            ObjectType::Term => "term",
            ObjectType::Widget => "widget",
            ObjectType::String => "string",
        }
    }

    /// Parse a storage/wire identifier.
    ///
    /// Unknown values are rejected before any storage access.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "post" => Ok(ObjectType::Post),
            "menu_item" => Ok(ObjectType::MenuItem),
            "term" => Ok(ObjectType::Term),
            "widget" => Ok(ObjectType::Widget),
            "string" => Ok(ObjectType::String),
            other => anyhow::bail!("unknown object type '{other}'"),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication status of a translation.
///
/// Two states, no transition restrictions: either may be set directly by
/// any save. Only published translations surface on the render path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Draft,
    Published,
}

impl TranslationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TranslationStatus::Draft => "draft",
            TranslationStatus::Published => "published",
        }
    }

    /// Parse a stored status value.
    ///
    /// Unknown values degrade to draft (kept out of public display) rather
    /// than failing the read.
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "published" => TranslationStatus::Published,
            "draft" => TranslationStatus::Draft,
            other => {
                tracing::warn!(status = %other, "unknown translation status, treating as draft");
                TranslationStatus::Draft
            }
        }
    }
}

/// Translatable fields across all object types.
///
/// Not every object type carries every field; `TranslationPayload::field`
/// returns `None` for fields a type does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationField {
    Title,
    Content,
    Excerpt,
    Slug,
    AttrTitle,
    Description,
}

/// Per-type translation payload.
///
/// Term names persist in the title column and term descriptions in the
/// content column, matching the shared column layout of the translation
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum TranslationPayload {
    Post {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        excerpt: String,
        #[serde(default)]
        slug: String,
    },
    MenuItem {
        #[serde(default)]
        title: String,
        #[serde(default)]
        attr_title: String,
        #[serde(default)]
        description: String,
    },
    Term {
        #[serde(default)]
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        slug: String,
    },
    Widget {
        #[serde(default)]
        title: String,
    },
    String {
        #[serde(default)]
        content: String,
    },
}

/// Column-level view of a payload, used when binding the shared column set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadColumns<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub excerpt: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub attr_title: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl TranslationPayload {
    /// The object type this payload belongs to.
    pub fn object_type(&self) -> ObjectType {
        match self {
            TranslationPayload::Post { .. } => ObjectType::Post,
            TranslationPayload::MenuItem { .. } => ObjectType::MenuItem,
            TranslationPayload::Term { .. } => ObjectType::Term,
            TranslationPayload::Widget { .. } => ObjectType::Widget,
            TranslationPayload::String { .. } => ObjectType::String,
        }
    }

    /// An all-empty payload for the given object type.
    pub fn empty(object_type: ObjectType) -> Self {
        match object_type {
            ObjectType::Post => TranslationPayload::Post {
                title: Default::default(),
                content: Default::default(),
                excerpt: Default::default(),
                slug: Default::default(),
            },
            ObjectType::MenuItem => TranslationPayload::MenuItem {
                title: Default::default(),
                attr_title: Default::default(),
                description: Default::default(),
            },
            ObjectType::Term => TranslationPayload::Term {
                name: Default::default(),
                description: Default::default(),
                slug: Default::default(),
            },
            ObjectType::Widget => TranslationPayload::Widget {
                title: Default::default(),
            },
            ObjectType::String => TranslationPayload::String {
                content: Default::default(),
            },
        }
    }

    /// Whether every field is blank (empty or whitespace-only).
    ///
    /// A blank payload submitted to the store deletes the record instead of
    /// persisting an empty row.
    pub fn is_blank(&self) -> bool {
        self.columns()
            .into_iter()
            .all(|v| v.is_none_or(|s| s.trim().is_empty()))
    }

    /// Look up a field's value.
    ///
    /// `None` when this object type does not declare the field; the value
    /// may still be empty.
    pub fn field(&self, field: TranslationField) -> Option<&str> {
        match (self, field) {
            (TranslationPayload::Post { title, .. }, TranslationField::Title)
            | (TranslationPayload::MenuItem { title, .. }, TranslationField::Title)
            | (TranslationPayload::Widget { title }, TranslationField::Title)
            | (TranslationPayload::Term { name: title, .. }, TranslationField::Title) => {
                Some(title.as_str())
            }
            (TranslationPayload::Post { content, .. }, TranslationField::Content)
            | (TranslationPayload::String { content }, TranslationField::Content) => {
                Some(content.as_str())
            }
            (TranslationPayload::Post { excerpt, .. }, TranslationField::Excerpt) => {
                Some(excerpt.as_str())
            }
            (TranslationPayload::Post { slug, .. }, TranslationField::Slug)
            | (TranslationPayload::Term { slug, .. }, TranslationField::Slug) => {
                Some(slug.as_str())
            }
            (TranslationPayload::MenuItem { attr_title, .. }, TranslationField::AttrTitle) => {
                Some(attr_title.as_str())
            }
            (TranslationPayload::MenuItem { description, .. }, TranslationField::Description)
            | (TranslationPayload::Term { description, .. }, TranslationField::Description) => {
                Some(description.as_str())
            }
            _ => None,
        }
    }

    /// A field's value when it is present and non-blank.
    pub fn non_blank(&self, field: TranslationField) -> Option<&str> {
        self.field(field).filter(|v| !v.trim().is_empty())
    }

    /// Overwrite a field's value.
    ///
    /// Returns false (leaving the payload untouched) when this object type
    /// does not declare the field.
    pub fn set_field(&mut self, field: TranslationField, value: String) -> bool {
        match (self, field) {
            (TranslationPayload::Post { title, .. }, TranslationField::Title)
            | (TranslationPayload::MenuItem { title, .. }, TranslationField::Title)
            | (TranslationPayload::Widget { title }, TranslationField::Title)
            | (TranslationPayload::Term { name: title, .. }, TranslationField::Title) => {
                *title = value;
                true
            }
            (TranslationPayload::Post { content, .. }, TranslationField::Content)
            | (TranslationPayload::String { content }, TranslationField::Content) => {
                *content = value;
                true
            }
            (TranslationPayload::Post { excerpt, .. }, TranslationField::Excerpt) => {
                *excerpt = value;
                true
            }
            (TranslationPayload::Post { slug, .. }, TranslationField::Slug)
            | (TranslationPayload::Term { slug, .. }, TranslationField::Slug) => {
                *slug = value;
                true
            }
            (TranslationPayload::MenuItem { attr_title, .. }, TranslationField::AttrTitle) => {
                *attr_title = value;
                true
            }
            (TranslationPayload::MenuItem { description, .. }, TranslationField::Description)
            | (TranslationPayload::Term { description, .. }, TranslationField::Description) => {
                *description = value;
                true
            }
            _ => false,
        }
    }

    /// The prose fields this payload's object type declares — everything
    /// except slugs, which are path segments rather than prose.
    pub fn prose_fields(&self) -> &'static [TranslationField] {
        match self {
            TranslationPayload::Post { .. } => &[
                TranslationField::Title,
                TranslationField::Content,
                TranslationField::Excerpt,
            ],
            TranslationPayload::MenuItem { .. } => &[
                TranslationField::Title,
                TranslationField::AttrTitle,
                TranslationField::Description,
            ],
            TranslationPayload::Term { .. } => {
                &[TranslationField::Title, TranslationField::Description]
            }
            TranslationPayload::Widget { .. } => &[TranslationField::Title],
            TranslationPayload::String { .. } => &[TranslationField::Content],
        }
    }

    /// Map this payload onto the shared column set.
    pub fn columns(&self) -> PayloadColumns<'_> {
        match self {
            TranslationPayload::Post {
                title,
                content,
                excerpt,
                slug,
            } => PayloadColumns {
                title: Some(title.as_str()),
                content: Some(content.as_str()),
                excerpt: Some(excerpt.as_str()),
                slug: Some(slug.as_str()),
                ..Default::default()
            },
            TranslationPayload::MenuItem {
                title,
                attr_title,
                description,
            } => PayloadColumns {
                title: Some(title.as_str()),
                attr_title: Some(attr_title.as_str()),
                description: Some(description.as_str()),
                ..Default::default()
            },
            TranslationPayload::Term {
                name,
                description,
                slug,
            } => PayloadColumns {
                title: Some(name.as_str()),
                content: Some(description.as_str()),
                slug: Some(slug.as_str()),
                ..Default::default()
            },
            TranslationPayload::Widget { title } => PayloadColumns {
                title: Some(title.as_str()),
                ..Default::default()
            },
            TranslationPayload::String { content } => PayloadColumns {
                content: Some(content.as_str()),
                ..Default::default()
            },
        }
    }
}

impl<'a> IntoIterator for PayloadColumns<'a> {
    type Item = Option<&'a str>;
    type IntoIter = std::array::IntoIter<Option<&'a str>, 6>;

    fn into_iter(self) -> Self::IntoIter {
        [
            self.title,
            self.content,
            self.excerpt,
            self.slug,
            self.attr_title,
            self.description,
        ]
        .into_iter()
    }
}

/// Raw database row for a translation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TranslationRow {
    pub object_id: i64,
    pub object_type: String,
    pub language_code: String,
    pub original_language: String,
    pub translated_content: Option<String>,
    pub translated_title: Option<String>,
    pub translated_excerpt: Option<String>,
    pub translated_slug: Option<String>,
    pub translated_attr_title: Option<String>,
    pub translated_description: Option<String>,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

/// A persisted translation.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRecord {
    pub object_id: i64,
    pub language_code: String,
    pub original_language: String,
    pub status: TranslationStatus,
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: TranslationPayload,
}

impl TranslationRecord {
    /// The object type, carried by the payload variant.
    pub fn object_type(&self) -> ObjectType {
        self.payload.object_type()
    }
}

impl TryFrom<TranslationRow> for TranslationRecord {
    type Error = anyhow::Error;

    fn try_from(row: TranslationRow) -> Result<Self> {
        let object_type = ObjectType::parse(&row.object_type)?;

        let text = |v: Option<String>| v.unwrap_or_default();

        let payload = match object_type {
            ObjectType::Post => TranslationPayload::Post {
                title: text(row.translated_title),
                content: text(row.translated_content),
                excerpt: text(row.translated_excerpt),
                slug: text(row.translated_slug),
            },
            ObjectType::MenuItem => TranslationPayload::MenuItem {
                title: text(row.translated_title),
                attr_title: text(row.translated_attr_title),
                description: text(row.translated_description),
            },
            ObjectType::Term => TranslationPayload::Term {
                name: text(row.translated_title),
                description: text(row.translated_content),
                slug: text(row.translated_slug),
            },
            ObjectType::Widget => TranslationPayload::Widget {
                title: text(row.translated_title),
            },
            ObjectType::String => TranslationPayload::String {
                content: text(row.translated_content),
            },
        };

        Ok(TranslationRecord {
            object_id: row.object_id,
            language_code: row.language_code,
            original_language: row.original_language,
            status: TranslationStatus::parse_lossy(&row.status),
            last_updated: row.last_updated,
            payload,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn object_type_round_trip() {
        for t in [
            ObjectType::Post,
            ObjectType::MenuItem,
            ObjectType::Term,
            ObjectType::Widget,
            ObjectType::String,
        ] {
            assert_eq!(ObjectType::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn object_type_rejects_unknown() {
        assert!(ObjectType::parse("page").is_err());
        assert!(ObjectType::parse("").is_err());
        assert!(ObjectType::parse("POST").is_err());
    }

    #[test]
    fn status_parse_lossy_defaults_to_draft() {
        assert_eq!(
            TranslationStatus::parse_lossy("published"),
            TranslationStatus::Published
        );
        assert_eq!(
            TranslationStatus::parse_lossy("draft"),
            TranslationStatus::Draft
        );
        assert_eq!(
            TranslationStatus::parse_lossy("pending"),
            TranslationStatus::Draft
        );
    }

    #[test]
    fn blank_detection() {
        assert!(TranslationPayload::empty(ObjectType::Post).is_blank());
        assert!(
            TranslationPayload::MenuItem {
                title: "   ".to_string(),
                attr_title: String::new(),
                description: "\n".to_string(),
            }
            .is_blank()
        );
        assert!(
            !TranslationPayload::Post {
                title: "Bonjour".to_string(),
                content: String::new(),
                excerpt: String::new(),
                slug: String::new(),
            }
            .is_blank()
        );
    }

    #[test]
    fn field_lookup_respects_variant() {
        let post = TranslationPayload::Post {
            title: "Bonjour".to_string(),
            content: String::new(),
            excerpt: "Extrait".to_string(),
            slug: "bonjour".to_string(),
        };
        assert_eq!(post.field(TranslationField::Title), Some("Bonjour"));
        assert_eq!(post.field(TranslationField::Content), Some(""));
        assert_eq!(post.field(TranslationField::AttrTitle), None);
        assert_eq!(post.non_blank(TranslationField::Content), None);
        assert_eq!(post.non_blank(TranslationField::Excerpt), Some("Extrait"));
    }

    #[test]
    fn term_fields_map_to_shared_columns() {
        let term = TranslationPayload::Term {
            name: "Catégorie".to_string(),
            description: "Une description".to_string(),
            slug: "categorie".to_string(),
        };
        let cols = term.columns();
        assert_eq!(cols.title, Some("Catégorie"));
        assert_eq!(cols.content, Some("Une description"));
        assert_eq!(cols.slug, Some("categorie"));
        assert_eq!(cols.attr_title, None);
    }

    #[test]
    fn record_from_row_builds_typed_payload() {
        let row = TranslationRow {
            object_id: 42,
            object_type: "menu_item".to_string(),
            language_code: "fr_FR".to_string(),
            original_language: "en_US".to_string(),
            translated_content: None,
            translated_title: Some("Accueil".to_string()),
            translated_excerpt: None,
            translated_slug: None,
            translated_attr_title: Some("Page d'accueil".to_string()),
            translated_description: None,
            status: "published".to_string(),
            last_updated: Utc::now(),
        };

        let record = TranslationRecord::try_from(row).unwrap();
        assert_eq!(record.object_type(), ObjectType::MenuItem);
        assert_eq!(record.status, TranslationStatus::Published);
        assert_eq!(
            record.payload.field(TranslationField::Title),
            Some("Accueil")
        );
        assert_eq!(
            record.payload.field(TranslationField::AttrTitle),
            Some("Page d'accueil")
        );
        assert_eq!(record.payload.field(TranslationField::Slug), None);
    }

    #[test]
    fn record_from_row_rejects_unknown_object_type() {
        let row = TranslationRow {
            object_id: 1,
            object_type: "comment".to_string(),
            language_code: "fr_FR".to_string(),
            original_language: "en_US".to_string(),
            translated_content: None,
            translated_title: None,
            translated_excerpt: None,
            translated_slug: None,
            translated_attr_title: None,
            translated_description: None,
            status: "draft".to_string(),
            last_updated: Utc::now(),
        };
        assert!(TranslationRecord::try_from(row).is_err());
    }

    #[test]
    fn payload_serde_tagging() {
        let widget = TranslationPayload::Widget {
            title: "Articles récents".to_string(),
        };
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["object_type"], "widget");
        assert_eq!(json["title"], "Articles récents");

        let parsed: TranslationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, widget);
    }
}
