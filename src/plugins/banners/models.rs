use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::plugins::shared::{parse_bool, sanitize};
use crate::storage::FormPayload;

#[derive(Deserialize, Debug, Default)]
pub struct BannerInput {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub blog_id: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl BannerInput {
    pub fn from_form(form: &FormPayload) -> Self {
        Self {
            id: form.field("id").and_then(|v| v.parse().ok()),
            title: form.field("title").map(str::to_string),
            subtitle: form.field("subtitle").map(str::to_string),
            blog_id: form.field("blog_id").and_then(|v| v.parse().ok()),
            sort_order: form.field("sort_order").and_then(|v| v.parse().ok()),
            is_active: form.field("is_active").map(parse_bool),
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.title = self.title.map(|v| sanitize(&v));
        self.subtitle = self.subtitle.map(|v| sanitize(&v));
        self
    }
}

/// Banner row joined with the linked blog's title and slug.
#[derive(Serialize, Deserialize, Debug, FromRow)]
pub struct BannerRow {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub link_url: String,
    pub blog_id: Option<i32>,
    pub blog_title: Option<String>,
    pub blog_slug: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
