//! Best-effort downstream notification seam.
//!
//! After a record is durably inserted, the ledger hands it to a sink (e.g.
//! an external inference service). The ledger's durability guarantee is
//! independent of the sink: failures are logged and swallowed, never rolled
//! back into the write.

use memvault_domain::FactRecord;
use thiserror::Error;

/// Sink delivery failure; carries only a description, the write has already
/// committed by the time this can occur
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Post-commit consumer of newly recorded facts
pub trait FactSink: Send + Sync {
    /// Called once per durably inserted record, after commit
    fn fact_recorded(&self, record: &FactRecord) -> Result<(), SinkError>;
}
