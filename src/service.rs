//! Signing flows over injected collaborators.
//!
//! [`SigningService`] wires the hasher, signature engine, session crypto, and
//! session store into the owner and guest paths. Storage of public keys and
//! rendering of final document bytes are collaborator traits supplied by the
//! caller; network I/O never happens inside the crypto calls themselves.

use std::collections::HashMap;
use std::sync::Mutex;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::crypto::{generate_signing_keypair, hash_document, sign_digest, verify_digest};
use crate::errors::SignetError;
use crate::session::SessionCrypto;
use crate::store::GuestSessionStore;
use crate::types::*;

/// Persistence contract for public keys. Private keys never cross this
/// interface.
pub trait KeyStore: Send + Sync {
    fn store_public_key(
        &self,
        identity: &str,
        public_key: &SigningPublicKey,
    ) -> Result<(), SignetError>;

    /// Look up the stored public key; `UnknownIdentity` when absent.
    fn get_public_key(&self, identity: &str) -> Result<SigningPublicKey, SignetError>;
}

/// Rendering contract: produce the final byte sequence a signature will bind
/// to. Opaque to the hasher.
pub trait DocumentRenderer: Send + Sync {
    fn render_final_bytes(
        &self,
        document: &[u8],
        overlay: &OverlayInstruction,
    ) -> Result<Vec<u8>, SignetError>;
}

/// Placement of a visual signature on the rendered document.
#[derive(Clone, Debug)]
pub struct OverlayInstruction {
    pub page_number: u32,
    pub position_x: f32,
    pub position_y: f32,
    /// Signature artwork bytes (PNG/SVG), opaque to this crate.
    pub artwork: Vec<u8>,
}

/// In-process [`KeyStore`] for demos and tests.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: Mutex<HashMap<String, SigningPublicKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn store_public_key(
        &self,
        identity: &str,
        public_key: &SigningPublicKey,
    ) -> Result<(), SignetError> {
        self.keys
            .lock()
            .expect("key store poisoned")
            .insert(identity.to_string(), public_key.clone());
        Ok(())
    }

    fn get_public_key(&self, identity: &str) -> Result<SigningPublicKey, SignetError> {
        self.keys
            .lock()
            .expect("key store poisoned")
            .get(identity)
            .cloned()
            .ok_or_else(|| SignetError::UnknownIdentity(identity.to_string()))
    }
}

/// Service configuration, injected at construction.
#[derive(Clone, Debug)]
pub struct SigningServiceConfig {
    /// Guest-link validity window in seconds.
    pub guest_link_ttl_secs: i64,
}

impl Default for SigningServiceConfig {
    fn default() -> Self {
        Self {
            guest_link_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// A guest redeeming a link.
#[derive(Clone, Debug)]
pub struct GuestSigner {
    pub name: String,
    pub email: Option<String>,
}

/// Result of minting a guest link.
#[derive(Clone, Debug)]
pub struct IssuedGuestLink {
    /// URL-safe `<ciphertext>:<encapsulated-key>` link string.
    pub link: String,
    pub session_id: String,
    pub document_id: String,
    pub expires_at_unix: i64,
}

/// A signed artifact: final bytes, the signature, and display metadata.
#[derive(Clone, Debug)]
pub struct SignedDocument {
    pub bytes: Vec<u8>,
    pub signature: DocumentSignature,
    pub metadata: SignatureMetadata,
}

/// Guest-path result. Carries the ephemeral keypair out to the caller; the
/// service retains neither half.
#[derive(Debug)]
pub struct GuestSignedDocument {
    pub document: SignedDocument,
    pub session: GuestSession,
    pub keypair: SigningKeypair,
}

/// The signing facade. Construct once at process start; all methods take
/// `&self` and are safe to call from concurrent request handlers.
pub struct SigningService<K: KeyStore, R: DocumentRenderer> {
    keys: K,
    renderer: R,
    session_crypto: SessionCrypto,
    sessions: GuestSessionStore,
    config: SigningServiceConfig,
}

impl<K: KeyStore, R: DocumentRenderer> SigningService<K, R> {
    pub fn new(keys: K, renderer: R, config: SigningServiceConfig) -> Result<Self, SignetError> {
        Ok(Self {
            keys,
            renderer,
            session_crypto: SessionCrypto::new()?,
            sessions: GuestSessionStore::new(),
            config,
        })
    }

    /// Enroll an identity: generate a signing keypair, durably store the
    /// public half, and hand the whole keypair back.
    ///
    /// Key custody is explicit and client-held: this return is the only time
    /// the private key exists on the server side, and nothing here escrows,
    /// logs, or caches it. Losing it is unrecoverable by design.
    pub fn enroll_identity(&self, identity: &str) -> Result<SigningKeypair, SignetError> {
        let keypair = generate_signing_keypair()?;
        self.keys.store_public_key(identity, &keypair.public)?;
        info!(identity, "identity enrolled, public key stored");
        Ok(keypair)
    }

    /// Owner signing path: render, hash, sign with the caller-supplied private
    /// key, and assemble metadata against the stored public key.
    pub fn sign_document(
        &self,
        identity: &str,
        private_key: &SigningPrivateKey,
        document: &[u8],
        overlay: &OverlayInstruction,
    ) -> Result<SignedDocument, SignetError> {
        let public_key = self.keys.get_public_key(identity)?;
        let bytes = self.renderer.render_final_bytes(document, overlay)?;
        let digest = hash_document(&bytes);
        let signature_bytes = sign_digest(&digest, private_key)?;
        let signed_at = OffsetDateTime::now_utc();
        let signature = DocumentSignature {
            algorithm: SIG_ALG.to_string(),
            bytes: signature_bytes,
            signer_public_key: public_key,
            signed_at_unix: signed_at.unix_timestamp(),
        };
        let metadata = signature_metadata(identity, None, &signature, signed_at, None, false)?;
        info!(identity, "document signed");
        Ok(SignedDocument {
            bytes,
            signature,
            metadata,
        })
    }

    /// Mint an encrypted guest link for one signature over one document.
    /// The expiry is fixed here and never extended.
    pub fn create_guest_link(
        &self,
        document_id: &str,
        created_by: &str,
    ) -> Result<IssuedGuestLink, SignetError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let descriptor = SessionDescriptor {
            session_id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            created_by: created_by.to_string(),
            created_at_unix: now,
            expires_at_unix: now + self.config.guest_link_ttl_secs,
        };
        let link = self.session_crypto.encapsulate_session(&descriptor)?;
        info!(session_id = %descriptor.session_id, document_id, "guest link minted");
        Ok(IssuedGuestLink {
            link: link.encode(),
            session_id: descriptor.session_id,
            document_id: descriptor.document_id,
            expires_at_unix: descriptor.expires_at_unix,
        })
    }

    /// Guest signing path: open the link, consume the session, and sign with
    /// a fresh ephemeral keypair. Identical to the owner path from the hashing
    /// step on.
    pub fn redeem_guest_link(
        &self,
        link: &str,
        guest: &GuestSigner,
        document: &[u8],
        overlay: &OverlayInstruction,
    ) -> Result<GuestSignedDocument, SignetError> {
        let link = EncryptedSessionLink::decode(link)?;
        let descriptor = self.session_crypto.decapsulate_session(&link)?;
        self.sessions.register(&descriptor);
        let session = self.sessions.validate_and_consume(&descriptor.session_id)?;

        let keypair = generate_signing_keypair()?;
        let bytes = self.renderer.render_final_bytes(document, overlay)?;
        let digest = hash_document(&bytes);
        let signature_bytes = sign_digest(&digest, &keypair.private)?;
        let signed_at = OffsetDateTime::now_utc();
        let signature = DocumentSignature {
            algorithm: SIG_ALG.to_string(),
            bytes: signature_bytes,
            signer_public_key: keypair.public.clone(),
            signed_at_unix: signed_at.unix_timestamp(),
        };
        let metadata = signature_metadata(
            &guest.name,
            guest.email.as_deref(),
            &signature,
            signed_at,
            Some(&session.session_id),
            true,
        )?;
        info!(session_id = %session.session_id, "guest signing completed");
        Ok(GuestSignedDocument {
            document: SignedDocument {
                bytes,
                signature,
                metadata,
            },
            session,
            keypair,
        })
    }

    /// Read path: re-derive the digest from the presented bytes and verify the
    /// signature against its embedded public-key snapshot.
    pub fn verify_signed_document(
        &self,
        bytes: &[u8],
        signature: &DocumentSignature,
    ) -> Result<bool, SignetError> {
        let digest = hash_document(bytes);
        verify_digest(&digest, &signature.bytes, &signature.signer_public_key)
    }

    /// The session store, for audit queries.
    pub fn sessions(&self) -> &GuestSessionStore {
        &self.sessions
    }

    /// The session-crypto handle, for callers that need the service's
    /// encapsulation key.
    pub fn session_crypto(&self) -> &SessionCrypto {
        &self.session_crypto
    }
}

fn signature_metadata(
    signer: &str,
    signer_email: Option<&str>,
    signature: &DocumentSignature,
    signed_at: OffsetDateTime,
    session_id: Option<&str>,
    is_guest: bool,
) -> Result<SignatureMetadata, SignetError> {
    let timestamp = signed_at
        .format(&Rfc3339)
        .map_err(|e| SignetError::Ser(e.to_string()))?;
    Ok(SignatureMetadata {
        signer: signer.to_string(),
        signer_email: signer_email.map(str::to_string),
        timestamp,
        public_key: signature.signer_public_key.to_base64(),
        signature: signature.to_base64(),
        hash_algorithm: HASH_ALG.to_string(),
        session_id: session_id.map(str::to_string),
        is_guest,
    })
}
