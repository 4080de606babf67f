//! Error types for signet-pq operations.

use thiserror::Error;

/// Errors that can occur during hashing, signing, verification, guest-link
/// encryption, or session-lifecycle operations.
///
/// `DecryptionFailed` carries a single uniform message for every guest-link
/// rejection; the cause (truncation, tag mismatch, decapsulation failure) is
/// never surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignetError {
    /// The entropy source or key-generation backend was exhausted.
    #[error("key generation failed")]
    KeyGenerationFailed,

    /// The symmetric layer could not seal a session descriptor.
    #[error("encryption failure")]
    EncryptionFailed,

    /// A key or digest carries the wrong algorithm tag for this operation.
    #[error("algorithm mismatch: expected {expected}, got {got}")]
    AlgorithmMismatch { expected: &'static str, got: String },

    /// A private key blob could not be parsed into the signing scheme.
    #[error("invalid key encoding")]
    InvalidKeyEncoding,

    /// A field is structurally invalid: wrong length or bad encoding.
    /// Distinct from a well-formed but cryptographically invalid signature.
    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    /// Guest-link rejection. Uniform for all causes.
    #[error("link invalid or tampered")]
    DecryptionFailed,

    /// The signing session's validity window has elapsed.
    #[error("signing session has expired")]
    SessionExpired,

    /// The signing session was already redeemed.
    #[error("signing session already used")]
    SessionAlreadyConsumed,

    /// No session is registered under the presented id.
    #[error("signing session not found")]
    SessionNotFound,

    /// The key store holds no public key for the identity.
    #[error("no public key stored for {0}")]
    UnknownIdentity(String),

    /// CBOR serialization or deserialization error.
    #[error("serialization error: {0}")]
    Ser(String),
}
