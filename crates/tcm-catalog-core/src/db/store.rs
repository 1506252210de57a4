//! Key/value operations and the typed entries built on them.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::warn;

use super::{Database, DbError, DbResult, FORMULAS_KEY, VIEW_HISTORY_KEY};
use crate::models::Formula;

impl Database {
    /// Insert or replace the JSON document under `key`.
    pub fn put_value(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Remove `key`. Returns whether it existed.
    pub fn delete_value(&self, key: &str) -> DbResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(rows > 0)
    }

    /// When `key` was last written.
    pub fn updated_at(&self, key: &str) -> DbResult<DateTime<Utc>> {
        let raw: String = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(key.to_string()))?;

        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| DbError::InvalidTimestamp {
                key: key.to_string(),
                source,
            })
    }

    /// Cache the formula collection for the network view.
    pub fn store_formulas(&self, formulas: &[Formula]) -> DbResult<()> {
        let json = serde_json::to_string(formulas)?;
        self.put_value(FORMULAS_KEY, &json)
    }

    /// Cached formulas, or `None` when absent or unreadable.
    pub fn cached_formulas(&self) -> Option<Vec<Formula>> {
        let json = match self.get_value(FORMULAS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                warn!("No cached formula data");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read formula cache");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(formulas) => Some(formulas),
            Err(e) => {
                warn!(error = %e, "Cached formula data is unparseable");
                None
            }
        }
    }

    pub fn store_history(&self, ids: &[String]) -> DbResult<()> {
        let json = serde_json::to_string(ids)?;
        self.put_value(VIEW_HISTORY_KEY, &json)
    }

    /// Persisted view history; empty when none was stored.
    pub fn load_history(&self) -> DbResult<Vec<String>> {
        match self.get_value(VIEW_HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value("k").unwrap(), None);

        db.put_value("k", "1").unwrap();
        db.put_value("k", "2").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("2"));

        assert!(db.delete_value("k").unwrap());
        assert!(!db.delete_value("k").unwrap());
        assert_eq!(db.get_value("k").unwrap(), None);
    }

    #[test]
    fn test_updated_at() {
        let db = Database::open_in_memory().unwrap();
        let before = Utc::now();
        db.put_value("k", "1").unwrap();
        assert!(db.updated_at("k").unwrap() >= before - chrono::Duration::seconds(1));
        assert!(matches!(db.updated_at("missing"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_updated_at_rejects_corrupt_timestamp() {
        let db = Database::open_in_memory().unwrap();
        db.put_value("k", "1").unwrap();
        db.conn()
            .execute("UPDATE kv_store SET updated_at = 'yesterday' WHERE key = 'k'", [])
            .unwrap();
        assert!(matches!(
            db.updated_at("k"),
            Err(DbError::InvalidTimestamp { ref key, .. }) if key == "k"
        ));
    }

    #[test]
    fn test_formula_cache() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.cached_formulas().is_none());

        db.store_formulas(&[Formula::new("f1", "四君子汤")]).unwrap();
        let cached = db.cached_formulas().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].name, "四君子汤");
    }

    #[test]
    fn test_corrupt_formula_cache_is_none() {
        let db = Database::open_in_memory().unwrap();
        db.put_value(FORMULAS_KEY, "not json").unwrap();
        assert!(db.cached_formulas().is_none());
    }

    #[test]
    fn test_history_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_history().unwrap().is_empty());

        db.store_history(&["h2".to_string(), "h1".to_string()]).unwrap();
        assert_eq!(db.load_history().unwrap(), vec!["h2", "h1"]);
    }
}
