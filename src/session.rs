//! Key-encapsulation layer for guest links.
//!
//! An owner mints a guest-accessible capability without the guest holding any
//! prior credentials: the session descriptor is sealed under an ML-KEM-512
//! shared secret with XChaCha20-Poly1305. The KEM ciphertext doubles as HKDF
//! info and AEAD associated data, so a link's two halves cannot be re-paired.
//!
//! Each shared secret protects exactly one descriptor; derived keys are
//! zeroized as soon as the single seal or open completes.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, EncodedSizeUser, KemCore, MlKem512};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::SignetError;
use crate::types::*;

const LINK_HKDF_CONTEXT: &[u8] = b"signet-pq/guest-link/v1";

/// Guest-link encryption service handle.
///
/// Holds the service-lifetime ML-KEM keypair. Construct once at process start
/// and pass by reference to request handlers; there is no process-wide client
/// state behind it.
pub struct SessionCrypto {
    decapsulation_key: <MlKem512 as KemCore>::DecapsulationKey,
    encapsulation_key: <MlKem512 as KemCore>::EncapsulationKey,
}

impl SessionCrypto {
    /// Generate the service keypair from the OS random source.
    pub fn new() -> Result<Self, SignetError> {
        let mut rng = OsRng;
        let (dk, ek) = MlKem512::generate(&mut rng);
        Ok(Self {
            decapsulation_key: dk,
            encapsulation_key: ek,
        })
    }

    /// Raw encapsulation key bytes, for callers minting links toward this
    /// service from elsewhere.
    pub fn encapsulation_key_bytes(&self) -> Vec<u8> {
        self.encapsulation_key.as_bytes().to_vec()
    }

    /// Seal a descriptor against this service's own encapsulation key.
    pub fn encapsulate_session(
        &self,
        descriptor: &SessionDescriptor,
    ) -> Result<EncryptedSessionLink, SignetError> {
        seal(&self.encapsulation_key, descriptor)
    }

    /// Seal a descriptor against a recipient-supplied encapsulation key.
    pub fn encapsulate_session_for(
        descriptor: &SessionDescriptor,
        recipient_ek: &[u8],
    ) -> Result<EncryptedSessionLink, SignetError> {
        let ek = <MlKem512 as KemCore>::EncapsulationKey::from_bytes(
            &recipient_ek
                .try_into()
                .map_err(|_| SignetError::MalformedInput("ml-kem encapsulation key"))?,
        );
        seal(&ek, descriptor)
    }

    /// Open a guest link and recover its descriptor.
    ///
    /// Fails closed: truncated input, a foreign or corrupted encapsulated key,
    /// and an authentication-tag mismatch all reject with the same
    /// `DecryptionFailed` before the descriptor is parsed.
    pub fn decapsulate_session(
        &self,
        link: &EncryptedSessionLink,
    ) -> Result<SessionDescriptor, SignetError> {
        if link.ciphertext.len() < LINK_NONCE_SIZE
            || link.encapsulated_key.len() != KEM_CIPHERTEXT_SIZE
        {
            return Err(SignetError::DecryptionFailed);
        }
        let kem_ct: Ciphertext<MlKem512> = link
            .encapsulated_key
            .as_slice()
            .try_into()
            .map_err(|_| SignetError::DecryptionFailed)?;
        // Implicit rejection: a foreign ciphertext still decapsulates, to a
        // garbage secret, and is caught by the AEAD tag below.
        let shared = self
            .decapsulation_key
            .decapsulate(&kem_ct)
            .map_err(|_| SignetError::DecryptionFailed)?;
        let mut key = derive_link_key(shared.as_slice(), &link.encapsulated_key);

        let (nonce, sealed) = link.ciphertext.split_at(LINK_NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new((&key).into());
        let opened = cipher.decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: sealed,
                aad: &link.encapsulated_key,
            },
        );
        key.zeroize();
        let plaintext = opened.map_err(|_| SignetError::DecryptionFailed)?;
        from_cbor(&plaintext).map_err(|_| SignetError::DecryptionFailed)
    }
}

fn seal(
    ek: &<MlKem512 as KemCore>::EncapsulationKey,
    descriptor: &SessionDescriptor,
) -> Result<EncryptedSessionLink, SignetError> {
    let descriptor_cbor = to_cbor_canonical(descriptor)?;

    let mut rng = OsRng;
    let (kem_ct, shared) = ek
        .encapsulate(&mut rng)
        .map_err(|_| SignetError::EncryptionFailed)?;
    let kem_ct_bytes = kem_ct.as_slice().to_vec();
    let mut key = derive_link_key(shared.as_slice(), &kem_ct_bytes);

    let mut nonce = [0u8; LINK_NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce)
        .map_err(|_| SignetError::KeyGenerationFailed)?;

    let cipher = XChaCha20Poly1305::new((&key).into());
    let sealed = cipher.encrypt(
        XNonce::from_slice(&nonce),
        Payload {
            msg: &descriptor_cbor,
            aad: &kem_ct_bytes,
        },
    );
    key.zeroize();
    let sealed = sealed.map_err(|_| SignetError::EncryptionFailed)?;

    let mut ciphertext = Vec::with_capacity(LINK_NONCE_SIZE + sealed.len());
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&sealed);
    Ok(EncryptedSessionLink {
        ciphertext,
        encapsulated_key: kem_ct_bytes,
    })
}

/// Derive the one-descriptor link key. The KEM ciphertext as info ties the key
/// to this exact encapsulation.
fn derive_link_key(shared: &[u8], kem_ct: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(LINK_HKDF_CONTEXT), shared);
    let mut okm = [0u8; 32];
    hk.expand(kem_ct, &mut okm).expect("HKDF expand");
    okm
}
