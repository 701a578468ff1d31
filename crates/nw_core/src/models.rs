use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub article_id: i64,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub votes: i64,
}

/// An article row plus its comment count. The count is computed by the store
/// at read time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleWithCommentCount {
    pub article_id: i64,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub votes: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub article_id: i64,
    pub author: String,
    pub body: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
}
