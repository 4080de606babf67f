//! signet-pq demo main.rs
//! Walks the full signing core end to end:
//! - SHA3-256 content binding and Dilithium2 signatures
//! - ML-KEM-512 + XChaCha20-Poly1305 guest links
//! - single-use guest session lifecycle

use signet_pq::*;
use tracing_subscriber::EnvFilter;

/// Stand-in renderer: stamps the overlay artwork after the document bytes.
struct StampRenderer;

impl DocumentRenderer for StampRenderer {
    fn render_final_bytes(
        &self,
        document: &[u8],
        overlay: &OverlayInstruction,
    ) -> Result<Vec<u8>, SignetError> {
        let mut out = document.to_vec();
        out.extend_from_slice(&overlay.artwork);
        Ok(out)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let service = SigningService::new(
        MemoryKeyStore::new(),
        StampRenderer,
        SigningServiceConfig::default(),
    )?;
    println!("Algorithm suite: {SUITE_V1} ({KEM_ALG} guest links)\n");

    // --- 1️⃣ Enroll an identity ---
    let keypair = service.enroll_identity("alice@example.com")?;
    println!("Enrolled alice:");
    println!("  public key:  {} bytes", keypair.public.bytes.len());
    println!("  private key: {} bytes (returned once, client-held)\n", keypair.private.bytes.len());

    // --- 2️⃣ Owner signs a document ---
    let document = b"%PDF-1.7 master services agreement";
    let overlay = OverlayInstruction {
        page_number: 1,
        position_x: 72.0,
        position_y: 640.0,
        artwork: b"~alice~".to_vec(),
    };
    let signed = service.sign_document("alice@example.com", &keypair.private, document, &overlay)?;
    println!("Owner signature: {} bytes ({})", signed.signature.bytes.len(), signed.metadata.hash_algorithm);
    println!("  signed at {}\n", signed.metadata.timestamp);

    // --- 3️⃣ Anyone holding the bytes can verify ---
    assert!(service.verify_signed_document(&signed.bytes, &signed.signature)?);
    let mut tampered = signed.bytes.clone();
    tampered[0] ^= 0xFF;
    assert!(!service.verify_signed_document(&tampered, &signed.signature)?);
    println!("Verification: genuine bytes accepted, tampered bytes rejected\n");

    // --- 4️⃣ Mint a guest link ---
    let issued = service.create_guest_link("doc-42", "alice@example.com")?;
    println!("Guest link minted (session {}):", issued.session_id);
    println!("  {} chars, expires at unix {}\n", issued.link.len(), issued.expires_at_unix);

    // --- 5️⃣ Guest redeems the link ---
    let guest = GuestSigner {
        name: "Bob Contractor".to_string(),
        email: Some("bob@example.net".to_string()),
    };
    let result = service.redeem_guest_link(&issued.link, &guest, document, &overlay)?;
    println!("Guest signed as {:?} (session {})", result.document.metadata.signer, result.session.session_id);
    assert!(service.verify_signed_document(&result.document.bytes, &result.document.signature)?);

    // --- 6️⃣ The session is single-use ---
    let replay = service.redeem_guest_link(&issued.link, &guest, document, &overlay);
    assert!(matches!(&replay, Err(SignetError::SessionAlreadyConsumed)));
    println!("Replay rejected as expected: {}", replay.err().unwrap());

    println!("\n✅ All flows completed.");
    Ok(())
}
