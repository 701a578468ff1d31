//! The article-listing query builder.
//!
//! `sort` and `order` end up as SQL identifiers, which cannot be bound as
//! parameters, so both are checked against fixed sets before they are
//! interpolated. The `topic` filter is user-supplied text and is always
//! bound, never interpolated.

use nw_core::{Error, Result};
use serde::Deserialize;

/// Columns the listing may be ordered by.
const SORTABLE_COLUMNS: &[&str] = &[
    "article_id",
    "title",
    "topic",
    "author",
    "body",
    "created_at",
    "votes",
];

/// Query parameters accepted by `GET /api/articles`. All optional; unknown
/// parameters are ignored at the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub topic: Option<String>,
}

/// Validated ORDER BY column, defaulting to `created_at`.
fn sort_column(sort: Option<&str>) -> Result<&'static str> {
    let requested = sort.unwrap_or("created_at");
    SORTABLE_COLUMNS
        .iter()
        .copied()
        .find(|column| *column == requested)
        .ok_or(Error::InvalidSortQuery)
}

/// Validated ORDER BY direction, defaulting to descending.
fn sort_direction(order: Option<&str>) -> Result<&'static str> {
    match order {
        None => Ok("DESC"),
        Some(order) if order.eq_ignore_ascii_case("asc") => Ok("ASC"),
        Some(order) if order.eq_ignore_ascii_case("desc") => Ok("DESC"),
        Some(_) => Err(Error::InvalidOrderQuery),
    }
}

/// Builds the listing statement for `query`. Only the pre-validated column
/// name and direction keyword are interpolated; when a topic filter is
/// present the statement carries a single `?` placeholder for it.
pub(crate) fn build_listing_sql(query: &ArticleQuery) -> Result<String> {
    let column = sort_column(query.sort.as_deref())?;
    let direction = sort_direction(query.order.as_deref())?;

    let mut sql = String::from(
        "SELECT articles.*, \
         (SELECT COUNT(*) FROM comments WHERE comments.article_id = articles.article_id) \
         AS comment_count \
         FROM articles",
    );
    if query.topic.is_some() {
        sql.push_str(" WHERE articles.topic = ?");
    }
    sql.push_str(&format!(" ORDER BY articles.{} {}", column, direction));

    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_by(sort: &str) -> ArticleQuery {
        ArticleQuery {
            sort: Some(sort.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_created_at_descending() {
        let sql = build_listing_sql(&ArticleQuery::default()).unwrap();
        assert!(sql.ends_with("ORDER BY articles.created_at DESC"));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn accepts_every_allow_listed_column() {
        for column in SORTABLE_COLUMNS {
            let sql = build_listing_sql(&sorted_by(column)).unwrap();
            assert!(sql.contains(&format!("ORDER BY articles.{} DESC", column)));
        }
    }

    #[test]
    fn rejects_unknown_sort_column() {
        assert_eq!(
            build_listing_sql(&sorted_by("word_count")),
            Err(Error::InvalidSortQuery)
        );
    }

    #[test]
    fn rejects_sort_before_any_interpolation() {
        let hostile = sorted_by("votes; DROP TABLE articles");
        assert_eq!(build_listing_sql(&hostile), Err(Error::InvalidSortQuery));
    }

    #[test]
    fn order_is_case_insensitive() {
        for order in ["asc", "ASC", "aSc"] {
            let query = ArticleQuery {
                order: Some(order.to_string()),
                ..Default::default()
            };
            assert!(build_listing_sql(&query).unwrap().ends_with("ASC"));
        }
        for order in ["desc", "DESC"] {
            let query = ArticleQuery {
                order: Some(order.to_string()),
                ..Default::default()
            };
            assert!(build_listing_sql(&query).unwrap().ends_with("DESC"));
        }
    }

    #[test]
    fn rejects_unknown_order_direction() {
        let query = ArticleQuery {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert_eq!(build_listing_sql(&query), Err(Error::InvalidOrderQuery));
    }

    #[test]
    fn topic_filter_is_a_bind_parameter() {
        let query = ArticleQuery {
            topic: Some("cats".to_string()),
            ..Default::default()
        };
        let sql = build_listing_sql(&query).unwrap();
        assert!(sql.contains("WHERE articles.topic = ?"));
        assert!(!sql.contains("cats"));
    }
}
