use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::plugins::shared::sanitize;
use crate::storage::FormPayload;

#[derive(Deserialize, Debug, Default)]
pub struct BookInput {
    pub id: Option<i32>,
    pub blog_id: Option<i32>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub purchase_link: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl BookInput {
    pub fn from_form(form: &FormPayload) -> Self {
        Self {
            id: form.field("id").and_then(|v| v.parse().ok()),
            blog_id: form.field("blog_id").and_then(|v| v.parse().ok()),
            title: form.field("title").map(str::to_string),
            author: form.field("author").map(str::to_string),
            purchase_link: form.field("purchase_link").map(str::to_string),
            description: form.field("description").map(str::to_string),
            price: form.field("price").map(str::to_string),
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.title = self.title.map(|v| sanitize(&v));
        self.author = self.author.map(|v| sanitize(&v));
        self.purchase_link = self.purchase_link.map(|v| sanitize(&v));
        self.description = self.description.map(|v| sanitize(&v));
        self.price = self.price.map(|v| sanitize(&v));
        self
    }
}

/// Related-book row joined with its owning blog's title and slug. The join
/// columns are null for orphaned rows.
#[derive(Serialize, Deserialize, Debug, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub blog_id: i32,
    pub blog_title: Option<String>,
    pub blog_slug: Option<String>,
    pub title: String,
    pub author: String,
    pub purchase_link: String,
    pub cover_image: Option<String>,
    pub description: String,
    pub price: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
