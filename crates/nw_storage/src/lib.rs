pub mod query;
pub mod seed;
pub mod sqlite;

pub use query::ArticleQuery;
pub use seed::SeedData;
pub use sqlite::SqliteStore;
