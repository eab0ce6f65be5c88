//! Processed-build queries.

use std::collections::BTreeMap;

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};
use serde::Serialize;

use crate::error::{CollectorError, DatabaseResultExt, Result};

const SELECT_PROCESSED_SQL: &str =
    "SELECT processed FROM processed_builds WHERE build_id = ?1";
const UPSERT_PROCESSED_SQL: &str = "INSERT INTO processed_builds (build_id, processed, processed_at) VALUES (?1, ?2, ?3) \
     ON CONFLICT(build_id) DO UPDATE SET processed = excluded.processed, processed_at = excluded.processed_at";
const LIST_PROCESSED_SQL: &str = "SELECT build_id, processed_at FROM processed_builds WHERE processed = 1 ORDER BY build_id";
const DELETE_PROCESSED_SQL: &str = "DELETE FROM processed_builds WHERE build_id = ?1";
const CLEAR_PROCESSED_SQL: &str = "DELETE FROM processed_builds";

/// SQLite integers are signed; ids beyond `i64::MAX` cannot be stored.
fn sql_build_id(build_id: u64) -> Result<i64> {
    i64::try_from(build_id).map_err(|_| {
        CollectorError::invalid_input("build_id")
            .with_reason(format!("{build_id} does not fit in a signed 64-bit integer"))
    })
}

/// A cache entry for an emitted build.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessedBuild {
    pub build_id: u64,
    pub processed_at: Timestamp,
}

impl super::Database {
    /// Whether the build has been recorded as processed.
    pub fn is_processed(&self, build_id: u64) -> Result<bool> {
        let build_id = sql_build_id(build_id)?;
        let processed: Option<bool> = self
            .connection
            .query_row(SELECT_PROCESSED_SQL, params![build_id], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query processed build")?;

        Ok(processed.unwrap_or(false))
    }

    /// Records the build as processed.
    pub fn mark_processed(&self, build_id: u64) -> Result<()> {
        let build_id = sql_build_id(build_id)?;
        self.connection
            .execute(
                UPSERT_PROCESSED_SQL,
                params![build_id, true, Timestamp::now().to_string()],
            )
            .db_context("Failed to record processed build")?;
        Ok(())
    }

    /// Lists every processed build, oldest id first.
    pub fn list_processed(&self) -> Result<Vec<ProcessedBuild>> {
        let mut stmt = self
            .connection
            .prepare(LIST_PROCESSED_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ProcessedBuild {
                    build_id: u64::try_from(row.get::<_, i64>(0)?).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e))
                    })?,
                    processed_at: row.get::<_, String>(1)?.parse::<Timestamp>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                    })?,
                })
            })
            .db_context("Failed to query processed builds")?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read processed build")
    }

    /// Removes one build from the cache. Returns whether it was present.
    pub fn forget(&self, build_id: u64) -> Result<bool> {
        let build_id = sql_build_id(build_id)?;
        let removed = self
            .connection
            .execute(DELETE_PROCESSED_SQL, params![build_id])
            .db_context("Failed to delete processed build")?;
        Ok(removed > 0)
    }

    /// Removes every build from the cache. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        self.connection
            .execute(CLEAR_PROCESSED_SQL, [])
            .db_context("Failed to clear processed builds")
    }

    /// Imports a `build id -> processed` map, such as a JSON cache file
    /// written by an earlier collector. Returns how many entries were stored.
    pub fn import_processed(&mut self, entries: &BTreeMap<u64, bool>) -> Result<usize> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        for (build_id, processed) in entries {
            tx.execute(
                UPSERT_PROCESSED_SQL,
                params![sql_build_id(*build_id)?, *processed, &now],
            )
            .db_context("Failed to import processed build")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(entries.len())
    }
}
