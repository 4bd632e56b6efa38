//! Connection Pool / Manager: keyed keep-alive cache of idle connections.
//!
//! Grounded on `boomnet::http::ConnectionPool`/`SingleTlsConnectionPool`, but
//! generalized from a single-slot, single-threaded pool (`Rc<RefCell<_>>`,
//! one key) to a multi-key, thread-safe pool (`Mutex<HashMap<_, _>>`), since
//! multiple requests run concurrently against the same `Manager`, with
//! at-most-one idle connection held per `(host, port, secure)`.

use crate::stream::Conn;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

/// `(host, port, secure)`. Keys compare byte-exact on host: no case folding,
/// no DNS-based unification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnKey {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

impl ConnKey {
    pub fn new(host: impl Into<String>, port: u16, secure: bool) -> Self {
        Self {
            host: host.into(),
            port,
            secure,
        }
    }
}

/// Owns idle connections keyed by [`ConnKey`]. At most one idle connection is
/// held per key; inserting a second evicts (closes) the first.
///
/// All mutation of the idle map is a single `Mutex`-guarded critical section,
/// which stands in for an atomic compare-and-set of the whole map — there is
/// no separate read lock, since
/// `borrow` is a destructive take.
#[derive(Default)]
pub struct Manager {
    idle: Mutex<HashMap<ConnKey, Conn>>,
}

impl Manager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the idle connection for `key`, if any.
    pub(crate) fn take(&self, key: &ConnKey) -> Option<Conn> {
        let conn = self.idle.lock().unwrap().remove(key);
        if conn.is_none() {
            log::debug!("pool miss for {}:{} (secure={}), opening a fresh connection", key.host, key.port, key.secure);
        }
        conn
    }

    /// Inserts `conn` as the idle connection for `key`. If another connection
    /// was already present for that key, it is closed (the newer one wins).
    pub(crate) fn put(&self, key: ConnKey, conn: Conn) {
        let (host, port) = (key.host.clone(), key.port);
        let displaced = self.idle.lock().unwrap().insert(key, conn);
        if let Some(mut displaced) = displaced {
            log::debug!("evicting idle connection for {host}:{port} in favour of a newer one");
            let _ = displaced.close();
        }
    }

    /// Closes every idle connection and empties the map. The manager remains
    /// usable afterwards, equivalent to freshly constructed.
    pub fn close(&self) {
        let idle = std::mem::take(&mut *self.idle.lock().unwrap());
        for (_, mut conn) in idle {
            let _ = conn.close();
        }
    }

    /// Scoped acquisition: runs `f` with a fresh `Manager`, guaranteeing
    /// `close()` on every exit path including panics/early returns via `?`.
    pub fn with_manager<T, E>(f: impl FnOnce(&Manager) -> Result<T, E>) -> Result<T, E>
    where
        E: From<io::Error>,
    {
        let manager = Manager::new();
        let result = f(&manager);
        manager.close();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_empty() {
        let manager = Manager::new();
        assert!(manager.take(&ConnKey::new("example.com", 80, false)).is_none());
    }

    #[test]
    fn key_equality_is_byte_exact_on_host() {
        let a = ConnKey::new("Example.com", 80, false);
        let b = ConnKey::new("example.com", 80, false);
        assert_ne!(a, b);
    }
}
