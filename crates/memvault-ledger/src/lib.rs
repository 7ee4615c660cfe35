//! Memvault Fact Ledger
//!
//! Owns the fact lifecycle: record (validate, sign, atomic insert with
//! duplicate detection), retrieve, search, and revoke. The ledger is the
//! only writer to the store and the only component that touches the signer;
//! everything above it (the HTTP surface) translates its results and errors
//! onto the wire.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dto;
pub mod error;
pub mod service;
pub mod sink;

pub use dto::{CreateFactRequest, FactPageDto, FactRecordDto};
pub use error::LedgerError;
pub use service::{FactLedger, DEFAULT_PAGE_SIZE, MAX_BATCH_SIZE, MAX_PAGE_SIZE};
pub use sink::{FactSink, SinkError};
