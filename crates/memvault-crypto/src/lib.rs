//! Memvault Crypto Layer
//!
//! Deterministic canonical payload construction and HMAC-SHA256 signing for
//! fact records. The payload codec and signer are what make every stored
//! record independently verifiable: any holder can rebuild the payload from
//! the returned fields and check the signature without a central authority.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod payload;
pub mod signer;

pub use payload::{canonical_payload, render_timestamp};
pub use signer::{from_base64, to_base64, CryptoError, HmacSigner, SIGNATURE_LEN};
