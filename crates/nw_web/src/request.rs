//! Request-side validation: route identifiers and JSON bodies.
//!
//! Bodies arrive as raw bytes and parse leniently: an absent, empty or
//! syntactically broken body behaves exactly like `{}`, so the missing-field
//! rules apply uniformly.

use serde_json::Value;

use nw_core::{Error, Result};

/// Route identifiers are positive integers. Everything else is the client's
/// fault.
pub fn parse_id(raw: &str) -> Result<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::BadRequest),
    }
}

fn lenient_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Payload of `PATCH /api/articles/:article_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotesPatch {
    pub inc_votes: i64,
}

impl VotesPatch {
    /// A payload without `inc_votes` has no votes to apply; a payload whose
    /// `inc_votes` is not an integer is malformed.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value = lenient_json(body);
        match value.get("inc_votes") {
            None => Err(Error::VotesNotFound),
            Some(votes) => votes
                .as_i64()
                .map(|inc_votes| Self { inc_votes })
                .ok_or(Error::BadRequest),
        }
    }
}

/// Payload of `POST /api/articles/:article_id/comments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub username: String,
    pub body: String,
}

impl NewComment {
    /// Both fields must be present as strings. A payload without a usable
    /// username cannot be matched to any user.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value = lenient_json(body);
        let username = value.get("username").and_then(Value::as_str);
        let text = value.get("body").and_then(Value::as_str);

        match (username, text) {
            (Some(username), Some(text)) => Ok(Self {
                username: username.to_string(),
                body: text.to_string(),
            }),
            _ => Err(Error::UserNotFound),
        }
    }
}
