use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// An editable content field of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Slug,
    Excerpt,
    Content,
    SeoTitle,
    SeoDescription,
}

impl Field {
    /// All fields, in canonical order
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Slug,
        Field::Excerpt,
        Field::Content,
        Field::SeoTitle,
        Field::SeoDescription,
    ];

    /// The snake_case field name used by the editing surface
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Slug => "slug",
            Field::Excerpt => "excerpt",
            Field::Content => "content",
            Field::SeoTitle => "seo_title",
            Field::SeoDescription => "seo_description",
        }
    }

    /// Parse a field name into a field
    pub fn parse(s: &str) -> Option<Field> {
        match s {
            "title" => Some(Field::Title),
            "slug" => Some(Field::Slug),
            "excerpt" => Some(Field::Excerpt),
            "content" => Some(Field::Content),
            "seo_title" => Some(Field::SeoTitle),
            "seo_description" => Some(Field::SeoDescription),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete field set of one article.
///
/// Every field is a plain string defaulting to empty, so a value of this
/// type is always structurally complete: there is no "missing" field, only
/// an empty one. This is what the editing surface reads and writes, and
/// what gets handed to the save backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
}

impl ArticleFields {
    /// Read one field by name
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Slug => &self.slug,
            Field::Excerpt => &self.excerpt,
            Field::Content => &self.content,
            Field::SeoTitle => &self.seo_title,
            Field::SeoDescription => &self.seo_description,
        }
    }

    /// Write one field by name
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Slug => self.slug = value,
            Field::Excerpt => self.excerpt = value,
            Field::Content => self.content = value,
            Field::SeoTitle => self.seo_title = value,
            Field::SeoDescription => self.seo_description = value,
        }
    }

    /// Field-by-field shallow comparison against another record, returning
    /// the fields whose values differ, in canonical order.
    pub fn diff(&self, other: &ArticleFields) -> IndexSet<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f) != other.get(*f))
            .collect()
    }
}

/// A persisted article, as returned by the save backend after a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Storage identity of the article
    pub id: String,
    /// The field values the backend persisted
    pub fields: ArticleFields,
    /// Server-side modification time
    pub updated_at: DateTime<Utc>,
}
