//! Identifiers for transport sessions.
//!
//! Each connection attempt gets a fresh [`SessionId`].  Events carry the id of
//! the session that produced them, so a late event from a session that has
//! already been replaced (for example, the close notification of the old
//! socket arriving after a reconnect) can be recognised and ignored.
//!
//! # Thread safety
//!
//! The generator uses `AtomicU64`, so one generator can be shared between the
//! engine and a transport running on another task without a lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of one transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw value.  Intended for tests and logging round-trips.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing [`SessionId`]s, starting at 1.
pub struct SessionIdGenerator {
    inner: AtomicU64,
}

impl SessionIdGenerator {
    /// Creates a generator whose first id is `#1`.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(1),
        }
    }

    /// Returns a fresh id.
    ///
    /// `Relaxed` is enough: ids only need to be unique, not to order other
    /// memory accesses.
    pub fn next_id(&self) -> SessionId {
        SessionId(self.inner.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the id the next call to [`next_id`](Self::next_id) will produce.
    pub fn peek(&self) -> SessionId {
        SessionId(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdGenerator")
            .field("next", &self.peek().get())
            .finish()
    }
}
