//! Deterministic demo dataset and the reseed operation.
//!
//! Reseeding drops and recreates every table, so the dataset is identical
//! after each run. Timestamps are fixed for the same reason.

use chrono::{DateTime, TimeZone, Utc};

use nw_core::Result;

use crate::sqlite::{map_db_err, SqliteStore};

pub struct SeedTopic {
    pub slug: &'static str,
    pub description: &'static str,
}

pub struct SeedUser {
    pub username: &'static str,
    pub name: &'static str,
    pub avatar_url: &'static str,
}

pub struct SeedArticle {
    pub article_id: i64,
    pub title: &'static str,
    pub topic: &'static str,
    pub author: &'static str,
    pub body: &'static str,
    pub created_at: DateTime<Utc>,
    pub votes: i64,
}

pub struct SeedComment {
    pub comment_id: i64,
    pub article_id: i64,
    pub author: &'static str,
    pub body: &'static str,
    pub created_at: DateTime<Utc>,
}

pub struct SeedData {
    pub topics: Vec<SeedTopic>,
    pub users: Vec<SeedUser>,
    pub articles: Vec<SeedArticle>,
    pub comments: Vec<SeedComment>,
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

impl SeedData {
    /// The dataset served out of the box: three topics (one of them without
    /// any articles), four users, six articles, eight comments.
    pub fn demo() -> Self {
        Self {
            topics: vec![
                SeedTopic {
                    slug: "mitch",
                    description: "The man, the Mitch, the legend",
                },
                SeedTopic {
                    slug: "cats",
                    description: "Not dogs",
                },
                SeedTopic {
                    slug: "paper",
                    description: "what books are made of",
                },
            ],
            users: vec![
                SeedUser {
                    username: "pressgang",
                    name: "Priya Iyer",
                    avatar_url: "https://avatars.example.net/pressgang.png",
                },
                SeedUser {
                    username: "coldtype",
                    name: "Marco Jensen",
                    avatar_url: "https://avatars.example.net/coldtype.png",
                },
                SeedUser {
                    username: "offstone",
                    name: "Lena Ortiz",
                    avatar_url: "https://avatars.example.net/offstone.png",
                },
                SeedUser {
                    username: "inkwell",
                    name: "Sam Whitfield",
                    avatar_url: "https://avatars.example.net/inkwell.png",
                },
            ],
            articles: vec![
                SeedArticle {
                    article_id: 1,
                    title: "The Mitch doctrine, revisited",
                    topic: "mitch",
                    author: "pressgang",
                    body: "Two years on, the doctrine reads less like satire and more \
                           like a style guide. We went back through the archive to check.",
                    created_at: at(2020, 7, 9, 20, 11),
                    votes: 100,
                },
                SeedArticle {
                    article_id: 2,
                    title: "Sunday brunch with Mitch",
                    topic: "mitch",
                    author: "coldtype",
                    body: "He ordered the eggs. He always orders the eggs.",
                    created_at: at(2020, 10, 16, 5, 3),
                    votes: 0,
                },
                SeedArticle {
                    article_id: 3,
                    title: "Eight ways Mitch changed local news",
                    topic: "mitch",
                    author: "coldtype",
                    body: "Number four is the one the broadsheets still refuse to admit.",
                    created_at: at(2020, 11, 3, 9, 12),
                    votes: 0,
                },
                SeedArticle {
                    article_id: 4,
                    title: "Mitch sued over missing commas",
                    topic: "mitch",
                    author: "offstone",
                    body: "The plaintiffs say the pauses were theirs. Court filings \
                           suggest the case may hinge on a single semicolon.",
                    created_at: at(2020, 5, 6, 1, 14),
                    votes: 0,
                },
                SeedArticle {
                    article_id: 5,
                    title: "Catspiracy: felines and the ballot box",
                    topic: "cats",
                    author: "offstone",
                    body: "No cat has ever been elected. Our investigation asks why not.",
                    created_at: at(2020, 8, 3, 13, 14),
                    votes: 0,
                },
                SeedArticle {
                    article_id: 6,
                    title: "A moustache guide for the undecided",
                    topic: "mitch",
                    author: "pressgang",
                    body: "From handlebar to walrus, ranked by editorial authority.",
                    created_at: at(2020, 10, 11, 11, 24),
                    votes: 0,
                },
            ],
            comments: vec![
                SeedComment {
                    comment_id: 1,
                    article_id: 1,
                    author: "coldtype",
                    body: "Substance! We need substance in column inches.",
                    created_at: at(2020, 10, 31, 3, 3),
                },
                SeedComment {
                    comment_id: 2,
                    article_id: 1,
                    author: "offstone",
                    body: "The doctrine holds up better than the moustache.",
                    created_at: at(2020, 9, 19, 23, 10),
                },
                SeedComment {
                    comment_id: 3,
                    article_id: 1,
                    author: "inkwell",
                    body: "One hundred votes and not one of them mine.",
                    created_at: at(2020, 11, 22, 12, 36),
                },
                SeedComment {
                    comment_id: 4,
                    article_id: 3,
                    author: "pressgang",
                    body: "Local news changed Mitch right back.",
                    created_at: at(2020, 11, 10, 7, 24),
                },
                SeedComment {
                    comment_id: 5,
                    article_id: 3,
                    author: "inkwell",
                    body: "Number six is a stretch.",
                    created_at: at(2020, 12, 1, 19, 22),
                },
                SeedComment {
                    comment_id: 6,
                    article_id: 4,
                    author: "coldtype",
                    body: "The commas were never missing. They were stolen.",
                    created_at: at(2020, 5, 15, 20, 19),
                },
                SeedComment {
                    comment_id: 7,
                    article_id: 5,
                    author: "pressgang",
                    body: "My cat read this and left the room.",
                    created_at: at(2020, 9, 23, 0, 18),
                },
                SeedComment {
                    comment_id: 8,
                    article_id: 5,
                    author: "offstone",
                    body: "Finally some accountability journalism.",
                    created_at: at(2020, 10, 10, 2, 22),
                },
            ],
        }
    }
}

// Children before parents, so the drops never trip a foreign key.
const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS comments",
    "DROP TABLE IF EXISTS articles",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS topics",
];

impl SqliteStore {
    /// Replaces whatever is in the database with `data`.
    pub async fn seed(&self, data: &SeedData) -> Result<()> {
        for statement in DROP_TABLES {
            sqlx::query(statement)
                .execute(self.pool())
                .await
                .map_err(map_db_err)?;
        }
        self.migrate().await?;

        for topic in &data.topics {
            sqlx::query("INSERT INTO topics (slug, description) VALUES (?, ?)")
                .bind(topic.slug)
                .bind(topic.description)
                .execute(self.pool())
                .await
                .map_err(map_db_err)?;
        }

        for user in &data.users {
            sqlx::query("INSERT INTO users (username, name, avatar_url) VALUES (?, ?, ?)")
                .bind(user.username)
                .bind(user.name)
                .bind(user.avatar_url)
                .execute(self.pool())
                .await
                .map_err(map_db_err)?;
        }

        for article in &data.articles {
            sqlx::query(
                "INSERT INTO articles (article_id, title, topic, author, body, created_at, votes) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(article.article_id)
            .bind(article.title)
            .bind(article.topic)
            .bind(article.author)
            .bind(article.body)
            .bind(article.created_at)
            .bind(article.votes)
            .execute(self.pool())
            .await
            .map_err(map_db_err)?;
        }

        for comment in &data.comments {
            sqlx::query(
                "INSERT INTO comments (comment_id, article_id, author, body, votes, created_at) \
                 VALUES (?, ?, ?, ?, 0, ?)",
            )
            .bind(comment.comment_id)
            .bind(comment.article_id)
            .bind(comment.author)
            .bind(comment.body)
            .bind(comment.created_at)
            .execute(self.pool())
            .await
            .map_err(map_db_err)?;
        }

        tracing::info!(
            "Seeded {} topics, {} users, {} articles, {} comments",
            data.topics.len(),
            data.users.len(),
            data.articles.len(),
            data.comments.len()
        );
        Ok(())
    }
}
