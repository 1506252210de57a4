//! SQLite schema definition.

/// Database schema for the catalog's persisted state.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key/value store (formula cache, view history)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Key holding the cached formula collection.
pub const FORMULAS_KEY: &str = "formulas";
/// Key holding the recently viewed herb ids.
pub const VIEW_HISTORY_KEY: &str = "view_history";

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
    }
}
