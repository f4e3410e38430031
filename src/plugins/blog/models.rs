use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::plugins::shared::{parse_bool, sanitize, strip_tags};
use crate::storage::FormPayload;

/// One blog submission, regardless of whether it arrived as multipart form
/// data or a JSON body. Field-level `Option`s let update requests omit what
/// they do not change.
#[derive(Deserialize, Debug, Default)]
pub struct BlogInput {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<i32>,
    pub tags: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_featured: Option<bool>,
    pub status: Option<String>,
    pub related_books: Option<Vec<RelatedBookInput>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RelatedBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub purchase_link: Option<String>,
    pub cover_image: Option<String>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl BlogInput {
    pub fn from_form(form: &FormPayload) -> Self {
        // related_books travels as a JSON array inside one form field;
        // unparseable payloads are logged and dropped, never fatal
        let related_books = form.field("related_books").and_then(|raw| {
            match serde_json::from_str::<Vec<RelatedBookInput>>(raw) {
                Ok(books) => Some(books),
                Err(e) => {
                    tracing::warn!("invalid related_books JSON data: {}", e);
                    None
                }
            }
        });

        Self {
            id: form.field("id").and_then(|v| v.parse().ok()),
            title: form.field("title").map(str::to_string),
            content: form.field("content").map(str::to_string),
            excerpt: form.field("excerpt").map(str::to_string),
            category_id: form.field("category_id").and_then(|v| v.parse().ok()),
            tags: form.field("tags").map(str::to_string),
            meta_title: form.field("meta_title").map(str::to_string),
            meta_description: form.field("meta_description").map(str::to_string),
            is_featured: form.field("is_featured").map(parse_bool),
            status: form.field("status").map(str::to_string),
            related_books,
        }
    }

    /// Trims and escapes free-text fields. Content is left untouched: it is
    /// rich text and rendered through the frontend sanitizer.
    pub fn sanitized(mut self) -> Self {
        self.title = self.title.map(|v| sanitize(&v));
        self.excerpt = self.excerpt.map(|v| sanitize(&v));
        self.tags = self.tags.map(|v| sanitize(&v));
        self.meta_title = self.meta_title.map(|v| sanitize(&v));
        self.meta_description = self.meta_description.map(|v| sanitize(&v));
        self.status = self.status.map(|v| sanitize(&v));
        self
    }
}

#[derive(Serialize, Deserialize, Debug, FromRow)]
pub struct BlogRow {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub featured_image_2: Option<String>,
    pub category_id: i32,
    pub tags: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_featured: bool,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Lowercase, hyphen-separated identifier derived from a title. Uniqueness
/// against existing rows is the caller's job.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// First 200 characters of the stripped content, used when no excerpt was
/// supplied.
pub fn make_excerpt(content: &str) -> String {
    let text = strip_tags(content);
    let head: String = text.chars().take(200).collect();
    format!("{}...", head)
}
