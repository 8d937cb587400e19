use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// One live transport session: who it belongs to and its outbound queue.
#[derive(Clone)]
pub struct Connection {
    pub identity: Arc<str>,
    pub tx: mpsc::Sender<Message>,
}

/// Connection table: `connection_id -> Connection`.
///
/// Holds the senders the registry does not know about. It carries no
/// cross-key invariants, so the sharded map is enough here.
pub struct ConnectionTable {
    conns: DashMap<String, Connection>,
    seq: AtomicU64,
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Process-unique connection id.
    pub fn next_id(&self) -> String {
        format!("conn-{}", self.seq.fetch_add(1, Ordering::Relaxed))
    }

    pub fn insert(&self, connection_id: String, conn: Connection) {
        self.conns.insert(connection_id, conn);
    }

    pub fn remove(&self, connection_id: &str) -> Option<Connection> {
        self.conns.remove(connection_id).map(|(_, conn)| conn)
    }

    pub fn get(&self, connection_id: &str) -> Option<Connection> {
        self.conns.get(connection_id).map(|r| r.value().clone())
    }

    /// Every connection except `skip`, cloned out so no shard lock is held
    /// while sending.
    pub fn all_except(&self, skip: &str) -> Vec<Connection> {
        self.conns
            .iter()
            .filter(|e| e.key() != skip)
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
