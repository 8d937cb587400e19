//! Presence registry: identity -> live connection ids.
//!
//! One instance per process, shared via `Arc`. Every operation takes the same
//! lock for its whole read-modify-write (or read-copy) span, so calls for the
//! same identity are totally ordered and no caller ever sees a half-applied
//! update. Nothing under the lock does I/O.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, WsPresenceError};

/// Per-identity presence, derived from the size of its connection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Offline,
    Online,
}

impl PresenceState {
    pub fn from_connection_count(n: usize) -> Self {
        if n == 0 {
            PresenceState::Offline
        } else {
            PresenceState::Online
        }
    }
}

/// Edge reported by `connect` / `disconnect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First connection for the identity (offline -> online).
    WentOnline,
    /// Last connection for the identity closed (online -> offline).
    WentOffline,
    /// Connection count changed (or not) without crossing zero.
    Unchanged,
}

impl Transition {
    fn between(before: PresenceState, after: PresenceState) -> Self {
        match (before, after) {
            (PresenceState::Offline, PresenceState::Online) => Transition::WentOnline,
            (PresenceState::Online, PresenceState::Offline) => Transition::WentOffline,
            _ => Transition::Unchanged,
        }
    }

    pub fn went_online(self) -> bool {
        self == Transition::WentOnline
    }

    pub fn went_offline(self) -> bool {
        self == Transition::WentOffline
    }
}

#[derive(Default)]
struct PresenceMap {
    /// identity -> connection ids. Sorted by identity; never holds empty sets.
    by_identity: BTreeMap<String, Vec<String>>,
    /// connection id -> owning identity.
    owner: HashMap<String, String>,
}

impl PresenceMap {
    fn count(&self, identity: &str) -> usize {
        self.by_identity.get(identity).map(Vec::len).unwrap_or(0)
    }

    fn state(&self, identity: &str) -> PresenceState {
        PresenceState::from_connection_count(self.count(identity))
    }
}

/// Process-wide presence bookkeeping.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: Mutex<PresenceMap>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Operations never leave the map half-updated, so a poisoned lock still
    // guards consistent data.
    fn lock(&self) -> MutexGuard<'_, PresenceMap> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new connection for `identity`.
    ///
    /// Returns `WentOnline` iff the identity had no connections before this
    /// call. Connection ids must be unique across the process: registering one
    /// that is already present fails with `DuplicateConnection` and leaves
    /// the registry untouched.
    pub fn connect(&self, identity: &str, connection_id: &str) -> Result<Transition> {
        check_args(identity, connection_id)?;

        let mut map = self.lock();
        if map.owner.contains_key(connection_id) {
            return Err(WsPresenceError::DuplicateConnection(connection_id.to_string()));
        }

        let before = map.state(identity);
        map.by_identity
            .entry(identity.to_string())
            .or_default()
            .push(connection_id.to_string());
        map.owner
            .insert(connection_id.to_string(), identity.to_string());
        let transition = Transition::between(before, map.state(identity));
        drop(map);

        tracing::debug!(identity, conn = connection_id, ?transition, "presence connect");
        Ok(transition)
    }

    /// Forget `connection_id` for `identity`.
    ///
    /// Unknown identities, unknown connection ids, and connection ids owned
    /// by another identity are no-ops reporting `Unchanged`. When the last
    /// connection goes, the identity entry is removed and `WentOffline` is
    /// returned.
    pub fn disconnect(&self, identity: &str, connection_id: &str) -> Result<Transition> {
        check_args(identity, connection_id)?;

        let mut map = self.lock();
        if map.owner.get(connection_id).map(String::as_str) != Some(identity) {
            return Ok(Transition::Unchanged);
        }

        let before = map.state(identity);
        map.owner.remove(connection_id);
        let emptied = match map.by_identity.get_mut(identity) {
            Some(conns) => {
                conns.retain(|c| c != connection_id);
                conns.is_empty()
            }
            None => false,
        };
        if emptied {
            map.by_identity.remove(identity);
        }
        let transition = Transition::between(before, map.state(identity));
        drop(map);

        tracing::debug!(identity, conn = connection_id, ?transition, "presence disconnect");
        Ok(transition)
    }

    /// Every identity holding at least one connection, ascending.
    pub fn online_identities(&self) -> Vec<String> {
        self.lock().by_identity.keys().cloned().collect()
    }

    /// Copy of the connection set of `identity`; `None` when it is offline.
    pub fn connections_for(&self, identity: &str) -> Option<Vec<String>> {
        self.lock().by_identity.get(identity).cloned()
    }

    pub fn state_of(&self, identity: &str) -> PresenceState {
        self.lock().state(identity)
    }

    pub fn is_online(&self, identity: &str) -> bool {
        self.state_of(identity) == PresenceState::Online
    }

    pub fn connection_count(&self, identity: &str) -> usize {
        self.lock().count(identity)
    }

    pub fn online_count(&self) -> usize {
        self.lock().by_identity.len()
    }
}

fn check_args(identity: &str, connection_id: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(WsPresenceError::InvalidArgument("identity must not be empty"));
    }
    if connection_id.is_empty() {
        return Err(WsPresenceError::InvalidArgument("connection id must not be empty"));
    }
    Ok(())
}
