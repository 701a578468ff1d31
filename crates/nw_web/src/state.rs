use nw_storage::SqliteStore;

/// Shared handler state. The store clones cheaply, so the whole struct goes
/// behind a single `Arc` at router construction.
pub struct AppState {
    pub store: SqliteStore,
}
