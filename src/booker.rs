//! Booker identity and the registry of currently connected clients.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{Error, Result};

/// An opaque, cheaply-clonable handle for one connected client.
///
/// Uniqueness for [`BookerRegistry`] membership is the identity token allocated in
/// [`BookerId::new`], not the printable UID — the UID is only known once the
/// registry hands back a sequence number, so it is filled in afterwards via
/// [`BookerId::set_uid`]. Two `BookerId`s are equal only if they share the same
/// token, which happens only by cloning — distinct connections, even from the
/// same peer address, always get distinct tokens.
#[derive(Clone)]
pub struct BookerId(Arc<Inner>);

struct Inner {
    token: u64,
    uid: OnceLock<String>,
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

impl BookerId {
    pub fn new() -> Self {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        BookerId(Arc::new(Inner { token, uid: OnceLock::new() }))
    }

    /// Assigns the printable UID. May only be called once per identity; called by
    /// the session right after a successful [`BookerRegistry::join`], since the
    /// UID embeds the sequence number the join call returns.
    pub fn set_uid(&self, uid: String) {
        self.0.uid.set(uid).expect("booker UID assigned twice");
    }

    /// The printable UID, e.g. `127.0.0.1:51422@3`.
    ///
    /// Panics if called before [`BookerId::set_uid`] — a programmer error, since
    /// every caller of the engine goes through a session that assigns the UID
    /// immediately after a successful join.
    pub fn uid(&self) -> &str {
        self.0.uid.get().expect("booker UID accessed before assignment")
    }
}

impl PartialEq for BookerId {
    fn eq(&self, other: &Self) -> bool {
        self.0.token == other.0.token
    }
}
impl Eq for BookerId {}

impl std::hash::Hash for BookerId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.token.hash(state);
    }
}

impl Default for BookerId {
    fn default() -> Self {
        Self::new()
    }
}

/// The set of currently connected clients, plus a monotonically increasing
/// connection-sequence counter that is never reused or decremented.
pub struct BookerRegistry {
    active: Mutex<HashSet<BookerId>>,
    next_seq: AtomicU64,
}

impl BookerRegistry {
    pub fn new() -> Self {
        BookerRegistry { active: Mutex::new(HashSet::new()), next_seq: AtomicU64::new(0) }
    }

    /// Registers a new booker identity, returning the sequence number to use when
    /// composing its UID.
    ///
    /// Rejects a duplicate identity (same token already active) with
    /// [`Error::Conflict`]. A "null booker" can't be expressed in this rendition —
    /// `BookerId` is always a valid, owned value — so that branch of the reference
    /// contract has no counterpart here.
    pub fn join(&self, id: BookerId) -> Result<u64> {
        let mut guard = self.active.lock().expect("booker registry mutex poisoned");
        if !guard.insert(id) {
            return Err(Error::Conflict("booker already joined".into()));
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        Ok(seq + 1)
    }

    /// Removes an identity if present. Idempotent.
    pub fn leave(&self, id: &BookerId) {
        let mut guard = self.active.lock().expect("booker registry mutex poisoned");
        guard.remove(id);
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().expect("booker registry mutex poisoned").len()
    }
}

impl Default for BookerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
