use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use nw_core::{Article, ArticleWithCommentCount, Comment, Error, Result, Topic, User};

use crate::query::{build_listing_sql, ArticleQuery};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS topics (
        slug TEXT PRIMARY KEY,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        avatar_url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        article_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        topic TEXT NOT NULL REFERENCES topics(slug),
        author TEXT NOT NULL REFERENCES users(username),
        body TEXT NOT NULL,
        created_at TEXT NOT NULL,
        votes INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        article_id INTEGER NOT NULL REFERENCES articles(article_id),
        author TEXT NOT NULL REFERENCES users(username),
        body TEXT NOT NULL,
        votes INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
];

/// The process-wide handle to the relational store. Cloning shares the
/// underlying pool; the pool is created once at startup and closed once at
/// shutdown.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database at `path`, creating the file and the schema when
    /// they do not exist yet.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Database(format!("Failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened database at {}", path.display());

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub(crate) async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_db_err)?;
        }
        Ok(())
    }

    /// Closes the pool. The store is unusable afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn topics(&self) -> Result<Vec<Topic>> {
        sqlx::query_as::<_, Topic>("SELECT slug, description FROM topics")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT username, name, avatar_url FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)
    }

    /// Lists articles with their comment counts, filtered and ordered per
    /// `query`. A known topic with no articles yields an empty list; a topic
    /// absent from the topics table is `Error::TopicNotFound`.
    pub async fn articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleWithCommentCount>> {
        let sql = build_listing_sql(query)?;

        let mut statement = sqlx::query_as::<_, ArticleWithCommentCount>(&sql);
        if let Some(topic) = &query.topic {
            statement = statement.bind(topic);
        }
        let articles = statement.fetch_all(&self.pool).await.map_err(map_db_err)?;

        // An empty page only distinguishes "no articles yet" from "no such
        // topic" by probing the topics table.
        if articles.is_empty() {
            if let Some(topic) = &query.topic {
                if !self.topic_exists(topic).await? {
                    return Err(Error::TopicNotFound);
                }
            }
        }

        Ok(articles)
    }

    pub async fn article_by_id(&self, article_id: i64) -> Result<ArticleWithCommentCount> {
        sqlx::query_as::<_, ArticleWithCommentCount>(
            "SELECT articles.*, \
             (SELECT COUNT(*) FROM comments WHERE comments.article_id = articles.article_id) \
             AS comment_count \
             FROM articles WHERE articles.article_id = ?",
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or(Error::ArticleNotFound)
    }

    /// Applies a signed increment to an article's votes and returns the
    /// updated row. Votes only ever change relatively, never absolutely.
    pub async fn increment_votes(&self, article_id: i64, inc_votes: i64) -> Result<Article> {
        sqlx::query_as::<_, Article>(
            "UPDATE articles SET votes = votes + ? WHERE article_id = ? \
             RETURNING article_id, title, topic, author, body, created_at, votes",
        )
        .bind(inc_votes)
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?
        .ok_or(Error::ArticleNotFound)
    }

    /// Comments on an article, newest first. Asking for the comments of a
    /// missing article is an error; an article without comments is not.
    pub async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        if !self.article_exists(article_id).await? {
            return Err(Error::ArticleNotFound);
        }

        sqlx::query_as::<_, Comment>(
            "SELECT comment_id, article_id, author, body, votes, created_at \
             FROM comments WHERE article_id = ? ORDER BY created_at DESC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }

    /// Inserts a comment. Article and author existence are checked first so
    /// the caller sees the domain error, not a foreign key violation.
    pub async fn insert_comment(
        &self,
        article_id: i64,
        username: &str,
        body: &str,
    ) -> Result<Comment> {
        if !self.article_exists(article_id).await? {
            return Err(Error::ArticleNotFound);
        }
        if !self.user_exists(username).await? {
            return Err(Error::UserNotFound);
        }

        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (article_id, author, body, votes, created_at) \
             VALUES (?, ?, ?, 0, ?) \
             RETURNING comment_id, article_id, author, body, votes, created_at",
        )
        .bind(article_id)
        .bind(username)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::CommentNotFound);
        }
        Ok(())
    }

    async fn topic_exists(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT slug FROM topics WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.is_some())
    }

    async fn article_exists(&self, article_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT article_id FROM articles WHERE article_id = ?")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.is_some())
    }

    async fn user_exists(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT username FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.is_some())
    }
}

/// SQLite result codes that signal a malformed value rather than a server
/// fault: SQLITE_CONSTRAINT (19), SQLITE_MISMATCH (20),
/// SQLITE_CONSTRAINT_FOREIGNKEY (787), SQLITE_CONSTRAINT_NOTNULL (1299).
const BAD_REQUEST_CODES: &[&str] = &["19", "20", "787", "1299"];

pub(crate) fn map_db_err(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            if BAD_REQUEST_CODES.contains(&code.as_ref()) {
                return Error::BadRequest;
            }
        }
    }
    Error::Database(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;
    use tempfile::{tempdir, TempDir};

    async fn seeded_store() -> (SqliteStore, TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).await.unwrap();
        store.seed(&SeedData::demo()).await.unwrap();
        (store, dir)
    }

    fn listing(sort: Option<&str>, order: Option<&str>, topic: Option<&str>) -> ArticleQuery {
        ArticleQuery {
            sort: sort.map(str::to_string),
            order: order.map(str::to_string),
            topic: topic.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn lists_every_article_newest_first_by_default() {
        let (store, _dir) = seeded_store().await;

        let articles = store.articles(&ArticleQuery::default()).await.unwrap();
        assert_eq!(articles.len(), 6);
        assert!(articles
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn sorts_by_votes_in_both_directions() {
        let (store, _dir) = seeded_store().await;

        let descending = store
            .articles(&listing(Some("votes"), None, None))
            .await
            .unwrap();
        assert!(descending
            .windows(2)
            .all(|pair| pair[0].votes >= pair[1].votes));
        assert_eq!(descending[0].votes, 100);

        let ascending = store
            .articles(&listing(Some("votes"), Some("asc"), None))
            .await
            .unwrap();
        assert!(ascending
            .windows(2)
            .all(|pair| pair[0].votes <= pair[1].votes));
    }

    #[tokio::test]
    async fn sorts_by_title_alphabetically() {
        let (store, _dir) = seeded_store().await;

        let articles = store
            .articles(&listing(Some("title"), Some("asc"), None))
            .await
            .unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.clone()).collect();
        let mut expected = titles.clone();
        expected.sort();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn every_sortable_column_orders_rows() {
        let (store, _dir) = seeded_store().await;

        for column in ["article_id", "title", "topic", "author", "body", "created_at", "votes"] {
            let rows = store
                .articles(&listing(Some(column), Some("asc"), None))
                .await
                .unwrap();
            let keys: Vec<String> = rows
                .iter()
                .map(|a| match column {
                    "article_id" => format!("{:010}", a.article_id),
                    "title" => a.title.clone(),
                    "topic" => a.topic.clone(),
                    "author" => a.author.clone(),
                    "body" => a.body.clone(),
                    "created_at" => a.created_at.to_rfc3339(),
                    _ => format!("{:010}", a.votes),
                })
                .collect();
            let mut expected = keys.clone();
            expected.sort();
            assert_eq!(keys, expected, "column {}", column);
        }
    }

    #[tokio::test]
    async fn rejects_sort_column_outside_the_allow_list() {
        let (store, _dir) = seeded_store().await;

        let result = store.articles(&listing(Some("word_count"), None, None)).await;
        assert!(matches!(result, Err(Error::InvalidSortQuery)));
    }

    #[tokio::test]
    async fn rejects_order_outside_asc_desc() {
        let (store, _dir) = seeded_store().await;

        let result = store.articles(&listing(None, Some("sideways"), None)).await;
        assert!(matches!(result, Err(Error::InvalidOrderQuery)));
    }

    #[tokio::test]
    async fn filters_by_topic() {
        let (store, _dir) = seeded_store().await;

        let articles = store
            .articles(&listing(None, None, Some("cats")))
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert!(articles.iter().all(|a| a.topic == "cats"));
    }

    #[tokio::test]
    async fn known_topic_without_articles_is_empty_not_an_error() {
        let (store, _dir) = seeded_store().await;

        let articles = store
            .articles(&listing(None, None, Some("paper")))
            .await
            .unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn unknown_topic_is_an_error() {
        let (store, _dir) = seeded_store().await;

        let result = store.articles(&listing(None, None, Some("dogs"))).await;
        assert!(matches!(result, Err(Error::TopicNotFound)));
    }

    #[tokio::test]
    async fn comment_count_matches_the_comment_rows() {
        let (store, _dir) = seeded_store().await;

        let articles = store.articles(&ArticleQuery::default()).await.unwrap();
        for article in &articles {
            let comments = store.comments_for_article(article.article_id).await.unwrap();
            assert_eq!(article.comment_count, comments.len() as i64);
        }
    }

    #[tokio::test]
    async fn fetches_an_article_with_its_comment_count() {
        let (store, _dir) = seeded_store().await;

        let article = store.article_by_id(1).await.unwrap();
        assert_eq!(article.article_id, 1);
        assert_eq!(article.votes, 100);
        assert_eq!(article.comment_count, 3);
    }

    #[tokio::test]
    async fn missing_article_is_not_found() {
        let (store, _dir) = seeded_store().await;

        let result = store.article_by_id(9999).await;
        assert!(matches!(result, Err(Error::ArticleNotFound)));
    }

    #[tokio::test]
    async fn votes_change_by_relative_increments() {
        let (store, _dir) = seeded_store().await;

        let article = store.increment_votes(1, 1).await.unwrap();
        assert_eq!(article.votes, 101);

        let article = store.increment_votes(1, -100).await.unwrap();
        assert_eq!(article.votes, 1);
    }

    #[tokio::test]
    async fn voting_on_a_missing_article_is_not_found() {
        let (store, _dir) = seeded_store().await;

        let result = store.increment_votes(9999, 1).await;
        assert!(matches!(result, Err(Error::ArticleNotFound)));
    }

    #[tokio::test]
    async fn commentless_article_yields_an_empty_list() {
        let (store, _dir) = seeded_store().await;

        let comments = store.comments_for_article(2).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn comments_for_a_missing_article_is_not_found() {
        let (store, _dir) = seeded_store().await;

        let result = store.comments_for_article(9999).await;
        assert!(matches!(result, Err(Error::ArticleNotFound)));
    }

    #[tokio::test]
    async fn comments_come_back_newest_first() {
        let (store, _dir) = seeded_store().await;

        let comments = store.comments_for_article(1).await.unwrap();
        assert_eq!(comments.len(), 3);
        assert!(comments
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn inserts_a_comment_and_counts_it() {
        let (store, _dir) = seeded_store().await;

        let comment = store
            .insert_comment(2, "inkwell", "First to comment here.")
            .await
            .unwrap();
        assert_eq!(comment.article_id, 2);
        assert_eq!(comment.author, "inkwell");
        assert_eq!(comment.votes, 0);

        let comments = store.comments_for_article(2).await.unwrap();
        assert_eq!(comments.len(), 1);

        let article = store.article_by_id(2).await.unwrap();
        assert_eq!(article.comment_count, 1);
    }

    #[tokio::test]
    async fn refuses_comments_from_unknown_users() {
        let (store, _dir) = seeded_store().await;

        let result = store.insert_comment(2, "nobody", "hello").await;
        assert!(matches!(result, Err(Error::UserNotFound)));
    }

    #[tokio::test]
    async fn refuses_comments_on_unknown_articles() {
        let (store, _dir) = seeded_store().await;

        let result = store.insert_comment(9999, "inkwell", "hello").await;
        assert!(matches!(result, Err(Error::ArticleNotFound)));
    }

    #[tokio::test]
    async fn deletes_a_comment_exactly_once() {
        let (store, _dir) = seeded_store().await;

        let before = store.comments_for_article(1).await.unwrap().len();
        store.delete_comment(1).await.unwrap();
        let after = store.comments_for_article(1).await.unwrap().len();
        assert_eq!(after, before - 1);

        let result = store.delete_comment(1).await;
        assert!(matches!(result, Err(Error::CommentNotFound)));
    }

    #[tokio::test]
    async fn reseeding_resets_the_dataset() {
        let (store, _dir) = seeded_store().await;

        store.delete_comment(1).await.unwrap();
        store.seed(&SeedData::demo()).await.unwrap();

        assert_eq!(store.topics().await.unwrap().len(), 3);
        assert_eq!(store.users().await.unwrap().len(), 4);
        assert_eq!(store.articles(&ArticleQuery::default()).await.unwrap().len(), 6);
        assert_eq!(store.comments_for_article(1).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn lists_topics_and_users() {
        let (store, _dir) = seeded_store().await;

        let topics = store.topics().await.unwrap();
        assert_eq!(topics.len(), 3);
        assert!(topics.iter().any(|t| t.slug == "mitch"));
        assert!(topics.iter().any(|t| t.slug == "paper"));

        let users = store.users().await.unwrap();
        assert_eq!(users.len(), 4);
        assert!(users.iter().any(|u| u.username == "inkwell"));
    }
}
