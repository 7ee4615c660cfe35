//! Memvault Domain Layer
//!
//! This crate contains the core domain model for the fact ledger: the
//! immutable [`FactRecord`], its identifiers, the closed set of provenance
//! source tags, the validation policy applied at the write boundary, and the
//! trait interface the durable store implements.
//!
//! ## Key Concepts
//!
//! - **FactRecord**: an immutable, signed claim with provenance metadata
//! - **External ID**: the public `mv-<uuid>` form of a fact identifier
//! - **SourceType**: closed tag set validated at the boundary
//! - **Revocation**: one-way overlay marking a fact as no longer trusted
//!
//! Infrastructure implementations (SQLite store, HMAC signer, HTTP surface)
//! live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod external_id;
pub mod fact;
pub mod source_type;
pub mod traits;
pub mod validate;

// Re-exports for convenience
pub use external_id::{parse_external_id, render_external_id, ExternalIdError};
pub use fact::{now_truncated, FactId, FactRecord, Revocation};
pub use source_type::SourceType;
pub use traits::{FactPage, FactQuery, FactStore, RevokeOutcome, StoreError};
pub use validate::{FactDraft, ValidationError, ValidationLimits};
