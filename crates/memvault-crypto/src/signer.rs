//! HMAC-SHA256 signing and verification.
//!
//! One signer is built at startup from the process-wide secret and shared
//! for the process lifetime. Key material problems are startup failures,
//! never per-request errors, and the secret is never logged.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a raw HMAC-SHA256 digest
pub const SIGNATURE_LEN: usize = 32;

/// Signer initialization failure
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The provisioned secret is unusable as HMAC key material
    #[error("invalid HMAC key material")]
    InvalidKey,
}

/// HMAC-SHA256 signer keyed by the process-wide secret
pub struct HmacSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material, even in debug output
        f.debug_struct("HmacSigner").finish_non_exhaustive()
    }
}

impl HmacSigner {
    /// Build a signer from the provisioned secret.
    ///
    /// An empty secret is rejected here so that misconfiguration fails the
    /// process at startup rather than signing every record with a
    /// worthless key.
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::InvalidKey);
        }
        // Validate once so sign() can rely on the key being usable
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self {
            key: secret.as_bytes().to_vec(),
        })
    }

    /// Compute the raw HMAC-SHA256 digest over a payload
    pub fn sign(&self, payload: &str) -> [u8; SIGNATURE_LEN] {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC key size is always valid");
        mac.update(payload.as_bytes());
        let bytes = mac.finalize().into_bytes();
        let mut sig = [0u8; SIGNATURE_LEN];
        sig.copy_from_slice(&bytes);
        sig
    }

    /// Recompute and compare in constant time.
    ///
    /// The comparison must not leak how many leading bytes matched.
    pub fn verify(&self, payload: &str, signature: &[u8]) -> bool {
        let expected = self.sign(payload);
        expected.as_slice().ct_eq(signature).into()
    }
}

/// Render a raw digest as standard base64 with padding (32 bytes in,
/// 44 characters out)
pub fn to_base64(signature: &[u8]) -> String {
    BASE64_STANDARD.encode(signature)
}

/// Decode a base64-rendered signature back to raw bytes
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_STANDARD.decode(encoded)
}
