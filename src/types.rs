//! Core entities, wire types, and serialization utilities.

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::SignetError;

/// Versioned algorithm suite identifier for the current wire format.
///
/// - ML-KEM-512 (Kyber-512) for guest-link key encapsulation
/// - XChaCha20-Poly1305 for descriptor encryption
/// - Dilithium2 for document signatures
/// - SHA3-256 for content digests
pub const SUITE_V1: &str = "Kyber512+XChaCha20P1305+Dilithium2";

/// Algorithm tag carried by every content digest.
pub const HASH_ALG: &str = "SHA3-256";
/// Algorithm tag carried by signing keys and signatures.
pub const SIG_ALG: &str = "Dilithium2";
/// Algorithm tag of the guest-link key encapsulation mechanism.
pub const KEM_ALG: &str = "ML-KEM-512";

/// SHA3-256 digest length in bytes.
pub const DIGEST_SIZE: usize = 32;
/// Dilithium2 public key length (1312 bytes).
pub const SIG_PUBLIC_KEY_SIZE: usize = pqcrypto_dilithium::dilithium2::public_key_bytes();
/// Dilithium2 secret key length (2528 bytes).
pub const SIG_SECRET_KEY_SIZE: usize = pqcrypto_dilithium::dilithium2::secret_key_bytes();
/// Dilithium2 detached signature length (2420 bytes).
pub const SIGNATURE_SIZE: usize = pqcrypto_dilithium::dilithium2::signature_bytes();
/// ML-KEM-512 encapsulation key length in bytes.
pub const KEM_ENCAPSULATION_KEY_SIZE: usize = 800;
/// ML-KEM-512 ciphertext (encapsulated key) length in bytes.
pub const KEM_CIPHERTEXT_SIZE: usize = 768;
/// XChaCha20-Poly1305 nonce length prefixed to every link ciphertext.
pub const LINK_NONCE_SIZE: usize = 24;

/// Fixed-size content digest over an exact document byte sequence.
///
/// Computed fresh for every document state that will be signed; a digest is
/// never carried across mutations of the document it was derived from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentDigest {
    /// Hash algorithm tag (`HASH_ALG`).
    pub algorithm: String,
    /// Digest bytes (`DIGEST_SIZE` long).
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

/// Public half of a signing keypair. Safe to store and transmit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningPublicKey {
    /// Signature algorithm tag (`SIG_ALG`).
    pub algorithm: String,
    /// Raw public key bytes (`SIG_PUBLIC_KEY_SIZE` long).
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl SigningPublicKey {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SignetError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| SignetError::MalformedInput("public key encoding"))?;
        Ok(Self {
            algorithm: SIG_ALG.to_string(),
            bytes,
        })
    }
}

/// Private half of a signing keypair.
///
/// Handed out exactly once by the call that generated it and zeroized on drop.
/// Deliberately not serde-serializable: export is the explicit `to_base64`
/// call, never a side effect of serializing a containing struct.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningPrivateKey {
    /// Signature algorithm tag (`SIG_ALG`).
    pub algorithm: String,
    /// Raw secret key bytes (`SIG_SECRET_KEY_SIZE` long).
    pub bytes: Vec<u8>,
}

impl SigningPrivateKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            algorithm: SIG_ALG.to_string(),
            bytes,
        }
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SignetError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| SignetError::MalformedInput("private key encoding"))?;
        Ok(Self::new(bytes))
    }
}

impl std::fmt::Debug for SigningPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningPrivateKey")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// A freshly generated signing keypair.
#[derive(Debug)]
pub struct SigningKeypair {
    pub public: SigningPublicKey,
    pub private: SigningPrivateKey,
}

/// A detached signature over a content digest, with the signer's public key
/// snapshot and the signing timestamp. Immutable after creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSignature {
    /// Signature algorithm tag (`SIG_ALG`).
    pub algorithm: String,
    /// Detached signature bytes (`SIGNATURE_SIZE` long).
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
    /// Public key paired with the private key that produced the signature.
    pub signer_public_key: SigningPublicKey,
    /// Unix timestamp of the signing operation.
    pub signed_at_unix: i64,
}

impl DocumentSignature {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Signature metadata attached to a signed artifact, consumed by downstream
/// display and delivery.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureMetadata {
    /// Identity of the signer, or the guest's display name.
    pub signer: String,
    /// Guest email, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_email: Option<String>,
    /// RFC 3339 timestamp of the signing operation.
    pub timestamp: String,
    /// Base64-encoded signer public key.
    pub public_key: String,
    /// Base64-encoded detached signature.
    pub signature: String,
    /// Content digest algorithm tag.
    pub hash_algorithm: String,
    /// Present only for guest signatures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub is_guest: bool,
}

/// Plaintext payload of a guest link: everything the service needs to
/// reconstruct the session when the link comes back.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// Unique session identifier (UUID v4).
    pub session_id: String,
    /// Document the session authorizes one signature over.
    pub document_id: String,
    /// Identity that minted the link.
    pub created_by: String,
    /// Unix timestamp of link creation.
    pub created_at_unix: i64,
    /// Unix timestamp after which the session is no longer redeemable.
    /// Fixed at creation and never extended.
    pub expires_at_unix: i64,
}

/// Encrypted guest link: AEAD-sealed descriptor plus the KEM ciphertext the
/// shared secret was encapsulated under. The two parts always travel together;
/// the encapsulated key is bound into the ciphertext as associated data, so
/// neither half can be re-paired with another link's.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedSessionLink {
    /// Nonce-prefixed AEAD ciphertext of the CBOR descriptor.
    #[serde(with = "serde_bytes")]
    pub ciphertext: Vec<u8>,
    /// ML-KEM ciphertext from the encapsulation (`KEM_CIPHERTEXT_SIZE` long).
    #[serde(with = "serde_bytes")]
    pub encapsulated_key: Vec<u8>,
}

impl EncryptedSessionLink {
    /// Encode as the URL-safe `<ciphertext>:<encapsulated-key>` link string.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}",
            BASE64_URL.encode(&self.ciphertext),
            BASE64_URL.encode(&self.encapsulated_key)
        )
    }

    /// Parse a link string produced by [`encode`](Self::encode).
    pub fn decode(link: &str) -> Result<Self, SignetError> {
        let mut parts = link.split(':');
        let (Some(ct), Some(ek), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(SignetError::MalformedInput("guest link"));
        };
        if ct.is_empty() || ek.is_empty() {
            return Err(SignetError::MalformedInput("guest link"));
        }
        let ciphertext = BASE64_URL
            .decode(ct)
            .map_err(|_| SignetError::MalformedInput("guest link"))?;
        let encapsulated_key = BASE64_URL
            .decode(ek)
            .map_err(|_| SignetError::MalformedInput("guest link"))?;
        Ok(Self {
            ciphertext,
            encapsulated_key,
        })
    }
}

/// Lifecycle state of a guest session. Transitions are monotonic:
/// `Active -> Consumed` or `Active -> Expired`, never out of a terminal state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Consumed,
    Expired,
}

/// A registered guest session, retained after termination for audit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestSession {
    pub session_id: String,
    pub document_id: String,
    pub created_by: String,
    pub created_at_unix: i64,
    pub expires_at_unix: i64,
    pub status: SessionStatus,
}

/// Serialize a value to canonical CBOR with a self-describe tag.
pub fn to_cbor_canonical<T: serde::Serialize>(v: &T) -> Result<Vec<u8>, SignetError> {
    let mut buf = Vec::new();
    let mut ser = serde_cbor::ser::Serializer::new(&mut buf);
    let _ = ser.self_describe();
    v.serialize(&mut ser)
        .map_err(|e| SignetError::Ser(e.to_string()))?;
    Ok(buf)
}

/// Deserialize a value from CBOR.
pub fn from_cbor<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, SignetError> {
    serde_cbor::from_slice::<T>(data).map_err(|e| SignetError::Ser(e.to_string()))
}
