//! Fact module - the fundamental unit of the ledger

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::source_type::SourceType;

/// Unique identifier for a fact, minted once at creation and never reused.
///
/// Backed by a random (v4) UUID; the public-facing form is the external id
/// (`mv-<uuid>`) produced by [`crate::render_external_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactId(Uuid);

impl FactId {
    /// Mint a new random FactId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (storage layer deserialization)
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a FactId from its canonical hyphenated string form
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revocation overlay, set together exactly once when a fact is revoked.
///
/// A record with no overlay is active. The transition is one-way: nothing
/// ever leaves the revoked state, and under concurrent revokes the first
/// writer's reason and timestamp are the ones retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    /// Why the fact was revoked
    pub reason: String,

    /// When the fact was revoked (UTC)
    pub revoked_at: DateTime<Utc>,
}

/// A fact record - an immutable, signed claim with provenance metadata.
///
/// Every field except the revocation overlay is fixed at creation. The
/// signature is an HMAC-SHA256 digest over the canonical payload built from
/// the stored field values, so any holder of the record can re-derive the
/// payload and verify it was not altered after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRecord {
    /// Server-generated identifier
    pub id: FactId,

    /// The claim text
    pub content: String,

    /// Provenance source tag
    pub source_type: SourceType,

    /// Provenance source identifier
    pub source_id: String,

    /// The recording agent
    pub recorded_by: String,

    /// Creation time, UTC, truncated to whole seconds
    pub created_at: DateTime<Utc>,

    /// Raw HMAC-SHA256 digest over the canonical payload
    pub signature: Vec<u8>,

    /// Revocation overlay; `None` while the fact is active
    pub revocation: Option<Revocation>,
}

impl FactRecord {
    /// Whether this fact has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revocation.is_some()
    }
}

/// Current UTC time truncated to whole seconds.
///
/// Creation timestamps carry no sub-second precision so that the canonical
/// payload a verifier reconstructs from a returned record matches the one
/// that was signed.
pub fn now_truncated() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
