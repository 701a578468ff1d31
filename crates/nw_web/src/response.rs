//! Response envelopes. Shapes are part of the wire contract and asymmetric
//! on purpose: longtime clients destructure them exactly like this.

use serde::Serialize;

use nw_core::{Article, ArticleWithCommentCount, Comment, Topic, User};

/// Topics are double-wrapped; clients reach the list at `body.topics.topics`.
#[derive(Debug, Serialize)]
pub struct TopicsEnvelope {
    pub topics: TopicList,
}

#[derive(Debug, Serialize)]
pub struct TopicList {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Serialize)]
pub struct ArticlesEnvelope {
    pub articles: Vec<ArticleWithCommentCount>,
}

/// A single fetched article rides in a one-element array.
#[derive(Debug, Serialize)]
pub struct ArticleEnvelope {
    pub article: Vec<ArticleWithCommentCount>,
}

/// Vote patches answer with the bare updated row, no comment count.
#[derive(Debug, Serialize)]
pub struct PatchedArticleEnvelope {
    pub article: Article,
}

#[derive(Debug, Serialize)]
pub struct CommentsEnvelope {
    pub comments: Vec<Comment>,
}

/// A freshly created comment rides in a one-element array.
#[derive(Debug, Serialize)]
pub struct CommentEnvelope {
    pub comment: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub users: Vec<User>,
}
