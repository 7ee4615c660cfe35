//! Trait definitions for external interactions
//!
//! These traits define the boundary between the domain and the durable
//! store. The infrastructure implementation lives in memvault-store.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::fact::{FactId, FactRecord};
use crate::source_type::SourceType;

/// Errors that can occur at the store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    /// The uniqueness triple (content, source_id, recorded_by) already exists.
    ///
    /// Reported only by the atomic insert itself; the store never pre-checks
    /// with a separate read that could race.
    #[error("Duplicate fact detected")]
    Duplicate,

    /// Stored data could not be decoded into a domain value
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Backend(String),
}

/// Outcome of a revoke attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// This call performed the transition to revoked
    Revoked,
    /// The record was already revoked; the original reason stands
    AlreadyRevoked,
    /// No record with that id exists
    NotFound,
}

/// Query criteria for searching facts.
///
/// All provided predicates are combined conjunctively; unset predicates are
/// simply omitted. Date bounds are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct FactQuery {
    /// Filter by exact source_id
    pub source_id: Option<String>,

    /// Filter by exact recorded_by
    pub recorded_by: Option<String>,

    /// Filter by source tag
    pub source_type: Option<SourceType>,

    /// Lower created_at bound, inclusive
    pub from_date: Option<DateTime<Utc>>,

    /// Upper created_at bound, inclusive
    pub to_date: Option<DateTime<Utc>>,

    /// Zero-based page index
    pub page: usize,

    /// Page size
    pub size: usize,
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct FactPage {
    /// Records on this page
    pub items: Vec<FactRecord>,

    /// Zero-based page index
    pub page: usize,

    /// Requested page size
    pub size: usize,

    /// Total records matching the predicate set
    pub total: usize,
}

/// Trait for storing and retrieving fact records
///
/// Implemented by the infrastructure layer (memvault-store). The store must
/// expose check-and-insert as a single linearizable operation keyed on the
/// uniqueness triple; two racing inserts of the same triple produce exactly
/// one success and one [`StoreError::Duplicate`].
pub trait FactStore {
    /// Insert a new record; fails with [`StoreError::Duplicate`] if the
    /// uniqueness triple already exists.
    fn insert(&mut self, record: &FactRecord) -> Result<(), StoreError>;

    /// Insert an ordered batch within one all-or-nothing scope. Any failure
    /// leaves no partial writes.
    fn insert_batch(&mut self, records: &[FactRecord]) -> Result<(), StoreError>;

    /// Point lookup by internal id
    fn get(&self, id: FactId) -> Result<Option<FactRecord>, StoreError>;

    /// Flat attribute/date search with pagination
    fn search(&self, query: &FactQuery) -> Result<FactPage, StoreError>;

    /// Mark a record revoked. Must be atomic: under concurrent revokes the
    /// record always ends up revoked and the first writer's reason and
    /// timestamp are retained.
    fn revoke(
        &mut self,
        id: FactId,
        reason: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, StoreError>;
}
