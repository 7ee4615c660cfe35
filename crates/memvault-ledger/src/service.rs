//! The fact ledger service.

use std::sync::{Mutex, MutexGuard};

use memvault_crypto::{canonical_payload, from_base64, HmacSigner};
use memvault_domain::traits::{FactQuery, FactStore, RevokeOutcome};
use memvault_domain::{
    now_truncated, parse_external_id, render_external_id, FactDraft, FactId, FactRecord,
    SourceType, ValidationLimits,
};
use tracing::{error, warn};

use crate::dto::{CreateFactRequest, FactPageDto, FactRecordDto};
use crate::error::LedgerError;
use crate::sink::FactSink;

/// Hard cap on batch create size, applied before any item is processed
pub const MAX_BATCH_SIZE: usize = 50;

/// Page size used when the caller does not supply one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// The fact ledger: owns the FactRecord lifecycle.
///
/// The store sits behind a mutex; every operation suspends only at that
/// store boundary. Records themselves are immutable once the creating write
/// is visible, so no further synchronization is needed to read them.
pub struct FactLedger<S: FactStore> {
    store: Mutex<S>,
    signer: HmacSigner,
    limits: ValidationLimits,
    sink: Option<Box<dyn FactSink>>,
}

impl<S: FactStore> FactLedger<S> {
    /// Create a ledger over a store with the given signer and limits
    pub fn new(store: S, signer: HmacSigner, limits: ValidationLimits) -> Self {
        Self {
            store: Mutex::new(store),
            signer,
            limits,
            sink: None,
        }
    }

    /// Attach a best-effort post-commit sink
    pub fn with_sink(mut self, sink: Box<dyn FactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn store(&self) -> Result<MutexGuard<'_, S>, LedgerError> {
        self.store
            .lock()
            .map_err(|_| LedgerError::Internal("store mutex poisoned".to_string()))
    }

    /// Validate a request and build the signed record for it.
    ///
    /// No side effects: the record is not yet inserted.
    fn prepare(&self, request: &CreateFactRequest) -> Result<FactRecord, LedgerError> {
        let draft = FactDraft::validate(
            &request.content,
            &request.source_type,
            &request.source_id,
            &request.recorded_by,
            &self.limits,
        )?;

        if draft.source_type == SourceType::AgentInference {
            warn!(
                source_id = %draft.source_id,
                "High-risk source_type detected: agent_inference"
            );
        }

        let id = FactId::new();
        let external_id = render_external_id(id);
        let created_at = now_truncated();

        let payload = canonical_payload(
            &external_id,
            &draft.content,
            draft.source_type.as_str(),
            &draft.source_id,
            &draft.recorded_by,
            created_at,
        );
        let signature = self.signer.sign(&payload);

        Ok(FactRecord {
            id,
            content: draft.content,
            source_type: draft.source_type,
            source_id: draft.source_id,
            recorded_by: draft.recorded_by,
            created_at,
            signature: signature.to_vec(),
            revocation: None,
        })
    }

    fn notify_sink(&self, record: &FactRecord) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.fact_recorded(record) {
                // Best-effort only; the write has already committed
                error!(fact_id = %record.id, "Failed to push fact to sink: {e}");
            }
        }
    }

    /// Record a single fact: validate, sign, and insert atomically.
    ///
    /// Duplicate detection happens inside the insert itself; there is no
    /// separate existence check that could race with another writer.
    pub fn record(&self, request: &CreateFactRequest) -> Result<FactRecordDto, LedgerError> {
        let record = self.prepare(request)?;
        self.store()?.insert(&record)?;
        self.notify_sink(&record);
        Ok(FactRecordDto::from_record(&record))
    }

    /// Record an ordered batch of facts within one all-or-nothing scope.
    ///
    /// Every request is validated and signed before the first write; any
    /// failure aborts the whole batch with no partial writes.
    pub fn record_batch(
        &self,
        requests: &[CreateFactRequest],
    ) -> Result<Vec<FactRecordDto>, LedgerError> {
        if requests.len() > MAX_BATCH_SIZE {
            return Err(LedgerError::BadRequest(format!(
                "Batch size limit exceeded (max {MAX_BATCH_SIZE})"
            )));
        }

        let records = requests
            .iter()
            .map(|request| self.prepare(request))
            .collect::<Result<Vec<_>, _>>()?;

        self.store()?.insert_batch(&records)?;

        for record in &records {
            self.notify_sink(record);
        }
        Ok(records.iter().map(FactRecordDto::from_record).collect())
    }

    /// Fetch a fact by its external id.
    ///
    /// A malformed id is a bad request, not a miss; a well-formed but
    /// unknown id is not found.
    pub fn get(&self, external_id: &str) -> Result<FactRecordDto, LedgerError> {
        let id = parse_external_id(external_id)?;
        let record = self
            .store()?
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound("Fact not found".to_string()))?;
        Ok(FactRecordDto::from_record(&record))
    }

    /// Search facts by conjunctive attribute/date predicates.
    ///
    /// Page size is defaulted and clamped here so the store always sees a
    /// concrete bound.
    pub fn search(&self, mut query: FactQuery) -> Result<FactPageDto, LedgerError> {
        if query.size == 0 {
            query.size = DEFAULT_PAGE_SIZE;
        }
        query.size = query.size.min(MAX_PAGE_SIZE);

        let page = self.store()?.search(&query)?;
        Ok(FactPageDto {
            items: page.items.iter().map(FactRecordDto::from_record).collect(),
            page: page.page,
            size: page.size,
            total: page.total,
        })
    }

    /// Revoke a fact. Idempotent: revoking an already-revoked record is a
    /// successful no-op and the original reason stands (first-wins).
    pub fn revoke(&self, external_id: &str, reason: &str) -> Result<(), LedgerError> {
        let id = parse_external_id(external_id)?;
        match self.store()?.revoke(id, reason, now_truncated())? {
            RevokeOutcome::Revoked | RevokeOutcome::AlreadyRevoked => Ok(()),
            RevokeOutcome::NotFound => Err(LedgerError::NotFound("Fact not found".to_string())),
        }
    }

    /// Independently verify a returned record: rebuild the canonical payload
    /// from its fields and check the signature against it.
    pub fn verify(&self, dto: &FactRecordDto) -> bool {
        let Ok(signature) = from_base64(&dto.signature) else {
            return false;
        };
        let payload = canonical_payload(
            &dto.fact_id,
            &dto.content,
            dto.source_type.as_str(),
            &dto.source_id,
            &dto.recorded_by,
            dto.created_at,
        );
        self.signer.verify(&payload, &signature)
    }
}
