//! Memvault Storage Layer
//!
//! Implements the [`FactStore`] trait on SQLite via rusqlite.
//!
//! # Architecture
//!
//! - One table, `fact_records`, holding the immutable record plus the
//!   revocation overlay columns
//! - Duplicate detection is the `UNIQUE (content, source_id, recorded_by)`
//!   constraint: the insert itself is the check, so two racing writers of
//!   the same triple get exactly one success and one `Duplicate`
//! - Revocation is a single conditional UPDATE, making first-wins the
//!   resolution policy under concurrent revokes
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe. Callers share a store by
//! serializing access at the call boundary (the ledger keeps it behind a
//! mutex).

#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use memvault_domain::traits::{FactPage, FactQuery, FactStore, RevokeOutcome, StoreError};
use memvault_domain::{FactId, FactRecord, Revocation, SourceType};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-based implementation of [`FactStore`]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_err)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema).map_err(map_err)
    }

    fn insert_with(conn: &Connection, record: &FactRecord) -> Result<(), StoreError> {
        conn.execute(
            "INSERT INTO fact_records
                 (fact_id, content, source_type, source_id, recorded_by, created_at, signature, revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
            params![
                record.id.to_string(),
                &record.content,
                record.source_type.as_str(),
                &record.source_id,
                &record.recorded_by,
                record.created_at.timestamp(),
                &record.signature,
            ],
        )
        .map_err(map_err)?;
        Ok(())
    }
}

fn map_err(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Duplicate
        }
        _ => StoreError::Backend(e.to_string()),
    }
}

fn timestamp_to_datetime(column: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Integer,
            Box::new(StoreError::InvalidData(format!(
                "timestamp out of range: {}",
                secs
            ))),
        )
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FactRecord> {
    let id_text: String = row.get(0)?;
    let id = FactId::parse(&id_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(e.to_string())),
        )
    })?;

    let source_type_text: String = row.get(2)?;
    let source_type = SourceType::parse(&source_type_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(format!(
                "unknown source_type: {}",
                source_type_text
            ))),
        )
    })?;

    let created_secs: i64 = row.get(5)?;
    let created_at = timestamp_to_datetime(5, created_secs)?;

    let revoked: bool = row.get(7)?;
    let revocation = if revoked {
        let reason: Option<String> = row.get(8)?;
        let revoked_secs: Option<i64> = row.get(9)?;
        let revoked_at = match revoked_secs {
            Some(secs) => timestamp_to_datetime(9, secs)?,
            None => created_at,
        };
        Some(Revocation {
            reason: reason.unwrap_or_default(),
            revoked_at,
        })
    } else {
        None
    };

    Ok(FactRecord {
        id,
        content: row.get(1)?,
        source_type,
        source_id: row.get(3)?,
        recorded_by: row.get(4)?,
        created_at,
        signature: row.get(6)?,
        revocation,
    })
}

const SELECT_COLUMNS: &str = "fact_id, content, source_type, source_id, recorded_by, \
                              created_at, signature, revoked, revocation_reason, revoked_at";

impl FactStore for SqliteStore {
    fn insert(&mut self, record: &FactRecord) -> Result<(), StoreError> {
        Self::insert_with(&self.conn, record)
    }

    fn insert_batch(&mut self, records: &[FactRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(map_err)?;
        for record in records {
            // Any failure drops the transaction, rolling back earlier rows
            Self::insert_with(&tx, record)?;
        }
        tx.commit().map_err(map_err)
    }

    fn get(&self, id: FactId) -> Result<Option<FactRecord>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM fact_records WHERE fact_id = ?1"),
                params![id.to_string()],
                row_to_record,
            )
            .optional()
            .map_err(map_err)
    }

    fn search(&self, query: &FactQuery) -> Result<FactPage, StoreError> {
        let mut clauses = String::from(" WHERE 1=1");
        let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(source_id) = &query.source_id {
            clauses.push_str(" AND source_id = ?");
            bound.push(Box::new(source_id.clone()));
        }
        if let Some(recorded_by) = &query.recorded_by {
            clauses.push_str(" AND recorded_by = ?");
            bound.push(Box::new(recorded_by.clone()));
        }
        if let Some(source_type) = query.source_type {
            clauses.push_str(" AND source_type = ?");
            bound.push(Box::new(source_type.as_str().to_string()));
        }
        // Date bounds are inclusive on both ends
        if let Some(from) = query.from_date {
            clauses.push_str(" AND created_at >= ?");
            bound.push(Box::new(from.timestamp()));
        }
        if let Some(to) = query.to_date {
            clauses.push_str(" AND created_at <= ?");
            bound.push(Box::new(to.timestamp()));
        }

        let param_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|p| p.as_ref()).collect();

        let total: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM fact_records{clauses}"),
                &param_refs[..],
                |row| row.get(0),
            )
            .map_err(map_err)?;

        // Bounds saturate instead of overflowing: an absurd page number is
        // an empty page past the end, never a panic or a wrapped-around
        // page, and a huge size must not cast to a negative (unbounded)
        // LIMIT
        let limit = (query.size as u64).min(i64::MAX as u64);
        let offset = (query.page as u64)
            .saturating_mul(query.size as u64)
            .min(i64::MAX as u64);

        // Ordered by fact id: stable for a fixed predicate set, deliberately
        // unrelated to insertion order
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM fact_records{clauses} \
             ORDER BY fact_id LIMIT {limit} OFFSET {offset}"
        );

        let mut stmt = self.conn.prepare(&sql).map_err(map_err)?;
        let items = stmt
            .query_map(&param_refs[..], row_to_record)
            .map_err(map_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_err)?;

        Ok(FactPage {
            items,
            page: query.page,
            size: query.size,
            total: total as usize,
        })
    }

    fn revoke(
        &mut self,
        id: FactId,
        reason: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, StoreError> {
        // Conditional update: first writer wins, later revokes are no-ops
        let updated = self
            .conn
            .execute(
                "UPDATE fact_records
                 SET revoked = 1, revocation_reason = ?2, revoked_at = ?3
                 WHERE fact_id = ?1 AND revoked = 0",
                params![id.to_string(), reason, revoked_at.timestamp()],
            )
            .map_err(map_err)?;

        if updated == 1 {
            return Ok(RevokeOutcome::Revoked);
        }

        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM fact_records WHERE fact_id = ?1",
                params![id.to_string()],
                |_| Ok(true),
            )
            .optional()
            .map_err(map_err)?
            .unwrap_or(false);

        if exists {
            Ok(RevokeOutcome::AlreadyRevoked)
        } else {
            Ok(RevokeOutcome::NotFound)
        }
    }
}
