use thiserror::Error;

/// One variant per condition the API can reject with. The `Display` strings
/// are the exact `msg` bodies the HTTP boundary sends; the status code for
/// each variant is decided in `nw_web`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Path not found!")]
    PathNotFound,

    #[error("Bad request")]
    BadRequest,

    #[error("Article not found")]
    ArticleNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Topic not found")]
    TopicNotFound,

    #[error("Votes not found")]
    VotesNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid sort query")]
    InvalidSortQuery,

    #[error("Invalid order query")]
    InvalidOrderQuery,

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;
