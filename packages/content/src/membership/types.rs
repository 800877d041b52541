// ABOUTME: Membership type definitions
// ABOUTME: The user-article row plus the feed projection served to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub article_id: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An article as it appears in a user's feed: membership joined with the
/// published article it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibleArticle {
    pub article_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub period_id: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}
