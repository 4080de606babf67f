//! # signet-pq
//!
//! Post-quantum document signing and guest-session crypto core.
//!
//! ## Algorithm Suite
//!
//! - **Content Digests:** SHA3-256 over the exact final document bytes
//! - **Digital Signatures:** Dilithium2 for owner and guest signatures
//! - **Key Encapsulation:** ML-KEM-512 (Kyber-512) for guest links
//! - **Symmetric Encryption:** XChaCha20-Poly1305 for session descriptors
//!
//! ## Features
//!
//! - Content binding: a signature is meaningful only for the exact bytes whose
//!   digest was signed
//! - Guest links: time-bounded, single-use signing sessions minted without a
//!   pre-shared secret, sealed under a KEM-derived authenticated cipher
//! - Client-held keys: private key material is handed out exactly once at
//!   enrollment and zeroized wherever this crate touches it
//! - Atomic session consumption: concurrent redemptions of one link resolve to
//!   exactly one success
//!
//! ## Example
//!
//! ```rust
//! use signet_pq::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! struct Passthrough;
//! impl DocumentRenderer for Passthrough {
//!     fn render_final_bytes(
//!         &self,
//!         document: &[u8],
//!         overlay: &OverlayInstruction,
//!     ) -> Result<Vec<u8>, SignetError> {
//!         let mut out = document.to_vec();
//!         out.extend_from_slice(&overlay.artwork);
//!         Ok(out)
//!     }
//! }
//!
//! let service = SigningService::new(
//!     MemoryKeyStore::new(),
//!     Passthrough,
//!     SigningServiceConfig::default(),
//! )?;
//!
//! // Enrollment: the public half is stored, the private half is the
//! // caller's to keep.
//! let keypair = service.enroll_identity("alice@example.com")?;
//!
//! let overlay = OverlayInstruction {
//!     page_number: 1,
//!     position_x: 40.0,
//!     position_y: 660.0,
//!     artwork: b"~alice~".to_vec(),
//! };
//! let signed = service.sign_document(
//!     "alice@example.com",
//!     &keypair.private,
//!     b"%PDF-1.7 agreement",
//!     &overlay,
//! )?;
//! assert!(service.verify_signed_document(&signed.bytes, &signed.signature)?);
//!
//! // A guest link is a self-contained, single-use capability.
//! let issued = service.create_guest_link("doc-42", "alice@example.com")?;
//! let guest = GuestSigner { name: "Bob".into(), email: None };
//! let result = service.redeem_guest_link(&issued.link, &guest, b"%PDF-1.7 agreement", &overlay)?;
//! assert!(result.document.metadata.is_guest);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Considerations
//!
//! - Guest-link rejection is uniform: callers learn only "link invalid or
//!   tampered," never which check failed
//! - The KEM ciphertext is bound into the descriptor AEAD as associated data,
//!   so a link's halves cannot be mixed and matched
//! - No operation here blocks on network I/O; storage and rendering are
//!   injected collaborators invoked around the crypto calls

mod crypto;
mod errors;
mod service;
mod session;
mod store;
mod types;

pub use crypto::*;
pub use errors::SignetError;
pub use service::*;
pub use session::*;
pub use store::*;
pub use types::*;
