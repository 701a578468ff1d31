use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api", get(handlers::describe_api))
        .route("/api/topics", get(handlers::list_topics))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:article_id", get(handlers::get_article))
        .route("/api/articles/:article_id", patch(handlers::patch_article_votes))
        .route("/api/articles/:article_id/comments", get(handlers::list_comments))
        .route("/api/articles/:article_id/comments", post(handlers::post_comment))
        .route("/api/comments/:comment_id", delete(handlers::delete_comment))
        .route("/api/users", get(handlers::list_users))
        .fallback(handlers::unknown_route)
        .layer(cors)
        .with_state(Arc::new(state))
}
