//! Content hashing and post-quantum document signatures.
//!
//! Every operation here is stateless and CPU-bound. A parsed native key is a
//! local scoped to the call that parsed it and is dropped on every exit path;
//! nothing in this module retains or logs key material.

use pqcrypto_dilithium::dilithium2 as dilithium;
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as SigPublicKey, SecretKey as SigSecretKey,
};
use sha3::{Digest, Sha3_256};

use crate::errors::SignetError;
use crate::types::*;

/// Compute the SHA3-256 content digest of an exact byte sequence.
///
/// Pure and deterministic; empty input is permitted and produces the defined
/// digest of the empty string.
pub fn hash_document(content: &[u8]) -> ContentDigest {
    ContentDigest {
        algorithm: HASH_ALG.to_string(),
        bytes: Sha3_256::digest(content).to_vec(),
    }
}

/// Generate a fresh Dilithium2 signing keypair from the OS random source.
///
/// The private half is returned to the caller exactly once and is not retained
/// here; `KeyGenerationFailed` is reserved for entropy or resource exhaustion
/// in the backend.
pub fn generate_signing_keypair() -> Result<SigningKeypair, SignetError> {
    let (pk, sk) = dilithium::keypair();
    Ok(SigningKeypair {
        public: SigningPublicKey {
            algorithm: SIG_ALG.to_string(),
            bytes: pk.as_bytes().to_vec(),
        },
        private: SigningPrivateKey::new(sk.as_bytes().to_vec()),
    })
}

/// Sign a content digest with a Dilithium2 private key, returning the detached
/// signature bytes.
pub fn sign_digest(
    digest: &ContentDigest,
    private_key: &SigningPrivateKey,
) -> Result<Vec<u8>, SignetError> {
    if private_key.algorithm != SIG_ALG {
        return Err(SignetError::AlgorithmMismatch {
            expected: SIG_ALG,
            got: private_key.algorithm.clone(),
        });
    }
    if digest.algorithm != HASH_ALG {
        return Err(SignetError::AlgorithmMismatch {
            expected: HASH_ALG,
            got: digest.algorithm.clone(),
        });
    }
    let sk = dilithium::SecretKey::from_bytes(&private_key.bytes)
        .map_err(|_| SignetError::InvalidKeyEncoding)?;
    let sig = dilithium::detached_sign(&digest.bytes, &sk);
    Ok(sig.as_bytes().to_vec())
}

/// Verify a detached signature against a content digest and public key.
///
/// Returns `Ok(false)` for a well-formed but cryptographically invalid
/// signature; errors only for structurally invalid blobs or tag mismatches.
pub fn verify_digest(
    digest: &ContentDigest,
    signature: &[u8],
    public_key: &SigningPublicKey,
) -> Result<bool, SignetError> {
    if public_key.algorithm != SIG_ALG {
        return Err(SignetError::AlgorithmMismatch {
            expected: SIG_ALG,
            got: public_key.algorithm.clone(),
        });
    }
    if digest.algorithm != HASH_ALG {
        return Err(SignetError::AlgorithmMismatch {
            expected: HASH_ALG,
            got: digest.algorithm.clone(),
        });
    }
    let pk = dilithium::PublicKey::from_bytes(&public_key.bytes)
        .map_err(|_| SignetError::MalformedInput("dilithium pk"))?;
    // Dilithium2 signatures are fixed-length; anything else is a transport
    // defect, not a verification failure.
    if signature.len() != SIGNATURE_SIZE {
        return Err(SignetError::MalformedInput("signature"));
    }
    let sig = dilithium::DetachedSignature::from_bytes(signature)
        .map_err(|_| SignetError::MalformedInput("signature"))?;
    Ok(dilithium::verify_detached_signature(&sig, &digest.bytes, &pk).is_ok())
}
