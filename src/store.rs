//! Guest-session lifecycle tracking.
//!
//! The one piece of shared mutable state in the core. Status transitions are
//! monotonic (`Active -> Consumed`, `Active -> Expired`) and the whole
//! check-and-transition in [`GuestSessionStore::validate_and_consume`] happens
//! under a single lock, so concurrent redemptions of one session resolve to
//! exactly one success. Terminal sessions are retained for audit.

use std::collections::HashMap;
use std::sync::Mutex;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::errors::SignetError;
use crate::types::{GuestSession, SessionDescriptor, SessionStatus};

#[derive(Default)]
pub struct GuestSessionStore {
    sessions: Mutex<HashMap<String, GuestSession>>,
}

impl GuestSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decrypted descriptor as an `Active` session.
    ///
    /// Insert-if-absent: re-presenting a link never resets a session that has
    /// already been consumed or expired. Returns a snapshot of the stored
    /// session either way.
    pub fn register(&self, descriptor: &SessionDescriptor) -> GuestSession {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        sessions
            .entry(descriptor.session_id.clone())
            .or_insert_with(|| {
                debug!(
                    session_id = %descriptor.session_id,
                    document_id = %descriptor.document_id,
                    "guest session registered"
                );
                GuestSession {
                    session_id: descriptor.session_id.clone(),
                    document_id: descriptor.document_id.clone(),
                    created_by: descriptor.created_by.clone(),
                    created_at_unix: descriptor.created_at_unix,
                    expires_at_unix: descriptor.expires_at_unix,
                    status: SessionStatus::Active,
                }
            })
            .clone()
    }

    /// Atomically validate a session and transition it to `Consumed`.
    ///
    /// Expiry is applied lazily here: an `Active` session past its window
    /// transitions to `Expired` and the call rejects. Expiry wins over
    /// consumption state for sessions that are both overdue and unredeemed.
    pub fn validate_and_consume(&self, session_id: &str) -> Result<GuestSession, SignetError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let session = sessions
            .get_mut(session_id)
            .ok_or(SignetError::SessionNotFound)?;
        match session.status {
            SessionStatus::Consumed => {
                warn!(session_id, "redemption of consumed session");
                Err(SignetError::SessionAlreadyConsumed)
            }
            SessionStatus::Expired => {
                warn!(session_id, "redemption of expired session");
                Err(SignetError::SessionExpired)
            }
            SessionStatus::Active => {
                let now = OffsetDateTime::now_utc().unix_timestamp();
                if now > session.expires_at_unix {
                    session.status = SessionStatus::Expired;
                    warn!(session_id, "redemption of expired session");
                    Err(SignetError::SessionExpired)
                } else {
                    session.status = SessionStatus::Consumed;
                    debug!(session_id, "guest session consumed");
                    Ok(session.clone())
                }
            }
        }
    }

    /// Audit lookup. Does not transition state.
    pub fn get(&self, session_id: &str) -> Option<GuestSession> {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .get(session_id)
            .cloned()
    }
}
