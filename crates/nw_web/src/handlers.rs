use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use nw_core::Error;
use nw_storage::ArticleQuery;

use crate::error::ApiError;
use crate::request::{parse_id, NewComment, VotesPatch};
use crate::response::{
    ArticleEnvelope, ArticlesEnvelope, CommentEnvelope, CommentsEnvelope, PatchedArticleEnvelope,
    TopicList, TopicsEnvelope, UsersEnvelope,
};
use crate::AppState;

pub async fn describe_api() -> impl IntoResponse {
    Json(api_description())
}

pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let topics = state.store.topics().await?;
    Ok(Json(TopicsEnvelope {
        topics: TopicList { topics },
    }))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state.store.articles(&query).await?;
    Ok(Json(ArticlesEnvelope { articles }))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let article_id = parse_id(&article_id)?;
    let article = state.store.article_by_id(article_id).await?;
    Ok(Json(ArticleEnvelope {
        article: vec![article],
    }))
}

pub async fn patch_article_votes(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let article_id = parse_id(&article_id)?;
    let patch = VotesPatch::from_body(&body)?;
    let article = state.store.increment_votes(article_id, patch.inc_votes).await?;
    Ok(Json(PatchedArticleEnvelope { article }))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let article_id = parse_id(&article_id)?;
    let comments = state.store.comments_for_article(article_id).await?;
    Ok(Json(CommentsEnvelope { comments }))
}

pub async fn post_comment(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let article_id = parse_id(&article_id)?;
    let new_comment = NewComment::from_body(&body)?;
    let comment = state
        .store
        .insert_comment(article_id, &new_comment.username, &new_comment.body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentEnvelope {
            comment: vec![comment],
        }),
    ))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let comment_id = parse_id(&comment_id)?;
    state.store.delete_comment(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.store.users().await?;
    Ok(Json(UsersEnvelope { users }))
}

/// Router fallback for paths nothing else matched.
pub async fn unknown_route() -> ApiError {
    ApiError(Error::PathNotFound)
}

fn api_description() -> Value {
    json!({
        "endpoints": {
            "GET /api": {
                "description": "This document"
            },
            "GET /api/topics": {
                "description": "All topics"
            },
            "GET /api/articles": {
                "description": "All articles, each with its comment count",
                "queries": {
                    "sort": ["article_id", "title", "topic", "author", "body", "created_at", "votes"],
                    "order": ["asc", "desc"],
                    "topic": "an existing topic slug"
                }
            },
            "GET /api/articles/:article_id": {
                "description": "A single article with its comment count"
            },
            "PATCH /api/articles/:article_id": {
                "description": "Applies a signed increment to an article's votes",
                "example_body": { "inc_votes": 1 }
            },
            "GET /api/articles/:article_id/comments": {
                "description": "Comments on an article, newest first"
            },
            "POST /api/articles/:article_id/comments": {
                "description": "Adds a comment by an existing user",
                "example_body": { "username": "inkwell", "body": "Well said." }
            },
            "DELETE /api/comments/:comment_id": {
                "description": "Removes a comment"
            },
            "GET /api/users": {
                "description": "All users"
            }
        }
    })
}
