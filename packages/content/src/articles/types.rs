// ABOUTME: Article type definitions
// ABOUTME: Structures for articles and their create/update inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub period_id: Option<String>,
    pub is_published: bool,
    /// Set on each transition to published; kept on unpublish as a
    /// historical marker.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleCreateInput {
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub period_id: Option<String>,
    pub is_published: Option<bool>,
}

/// Partial update; `None` fields are left untouched. The category is fixed
/// at creation so existing rules can never end up on a non-core article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleUpdateInput {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub subcategory_id: Option<String>,
    pub period_id: Option<String>,
    pub is_published: Option<bool>,
}
