//! Wire-facing request and response shapes.
//!
//! `source_type` arrives as a raw string so that an unrecognized tag is
//! reported as a validation failure on that field rather than a body-level
//! deserialization reject.

use chrono::{DateTime, Utc};
use memvault_domain::{render_external_id, FactRecord, SourceType};
use serde::{Deserialize, Serialize};

/// Request body for recording a single fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFactRequest {
    /// The claim text
    pub content: String,
    /// Raw provenance tag, validated against the closed set
    pub source_type: String,
    /// Provenance source identifier
    pub source_id: String,
    /// The recording agent
    pub recorded_by: String,
}

/// A fact record as returned to callers.
///
/// Carries everything an independent verifier needs to rebuild the
/// canonical payload and check the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecordDto {
    /// Public external id (`mv-<uuid>`)
    pub fact_id: String,
    /// The claim text
    pub content: String,
    /// Provenance source tag
    pub source_type: SourceType,
    /// Provenance source identifier
    pub source_id: String,
    /// The recording agent
    pub recorded_by: String,
    /// Creation time (UTC, second precision)
    pub created_at: DateTime<Utc>,
    /// Base64 of the raw HMAC-SHA256 digest
    pub signature: String,
    /// Whether the fact has been revoked
    pub revoked: bool,
    /// Revocation reason, present once revoked
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revocation_reason: Option<String>,
    /// Revocation time, present once revoked
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl FactRecordDto {
    /// Project a domain record onto the wire shape
    pub fn from_record(record: &FactRecord) -> Self {
        Self {
            fact_id: render_external_id(record.id),
            content: record.content.clone(),
            source_type: record.source_type,
            source_id: record.source_id.clone(),
            recorded_by: record.recorded_by.clone(),
            created_at: record.created_at,
            signature: memvault_crypto::to_base64(&record.signature),
            revoked: record.is_revoked(),
            revocation_reason: record.revocation.as_ref().map(|r| r.reason.clone()),
            revoked_at: record.revocation.as_ref().map(|r| r.revoked_at),
        }
    }
}

/// One page of search results on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactPageDto {
    /// Records on this page
    pub items: Vec<FactRecordDto>,
    /// Zero-based page index
    pub page: usize,
    /// Requested page size
    pub size: usize,
    /// Total records matching the predicate set
    pub total: usize,
}
