use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use wspresence_core::error::{Result, WsPresenceError};
use wspresence_core::{PresenceRegistry, Transition};

use crate::realtime::core::{Connection, ConnectionTable};
use crate::realtime::types::{Outgoing, PreparedMsg};

/// Outcome of routing a payload to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No live connection for the identity; the caller picks the fallback.
    Offline,
    /// Number of connections the payload was queued on.
    Delivered(usize),
}

/// PresenceHub: turns connection lifecycle into presence events and routes
/// payloads to every connection of an identity.
///
/// All egress is lossy: `try_send` only, dropped if a queue is full.
pub struct PresenceHub {
    registry: Arc<PresenceRegistry>,
    connections: ConnectionTable,
    /// Held across a registry transition and its broadcast so online/offline
    /// events for an identity leave in the order the registry decided them.
    edges: Mutex<()>,
}

impl PresenceHub {
    pub fn new(registry: Arc<PresenceRegistry>) -> Self {
        Self {
            registry,
            connections: ConnectionTable::new(),
            edges: Mutex::new(()),
        }
    }

    /// Register a new transport session for `identity`.
    ///
    /// Greets the caller with `sys.authed` and the current online list, and
    /// tells everyone else `presence.user_online` if this is the identity's
    /// first connection. Returns the allocated connection id.
    pub fn attach(&self, identity: &str, tx: mpsc::Sender<Message>) -> Result<String> {
        let connection_id = self.connections.next_id();
        self.connections.insert(
            connection_id.clone(),
            Connection {
                identity: Arc::from(identity),
                tx,
            },
        );

        // The greeting snapshot is taken under the same guard as the
        // transition, so no other edge can land between the two.
        let edge = self.edges.lock().unwrap_or_else(PoisonError::into_inner);
        let transition = match self.registry.connect(identity, &connection_id) {
            Ok(t) => t,
            Err(e) => {
                self.connections.remove(&connection_id);
                return Err(e);
            }
        };
        self.settle_attach(identity, &connection_id, transition)?;
        drop(edge);

        if transition.went_online() {
            tracing::info!(identity, conn = %connection_id, "user online");
        }
        Ok(connection_id)
    }

    /// Announce and greet a freshly registered connection. On failure the
    /// connection is rolled back so it cannot stay online with no session.
    /// Caller holds `edges`.
    fn settle_attach(&self, identity: &str, connection_id: &str, transition: Transition) -> Result<()> {
        let res = self.announce_and_greet(identity, connection_id, transition);
        if let Err(e) = &res {
            tracing::warn!(identity, conn = connection_id, "attach rolled back: {e}");
            self.connections.remove(connection_id);
            match self.registry.disconnect(identity, connection_id) {
                Ok(t) if t.went_offline() => {
                    let _ = self.broadcast_except(connection_id, &Outgoing::user_offline(identity));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(identity, conn = connection_id, "rollback disconnect failed: {e}"),
            }
        }
        res
    }

    fn announce_and_greet(&self, identity: &str, connection_id: &str, transition: Transition) -> Result<()> {
        if transition.went_online() {
            self.broadcast_except(connection_id, &Outgoing::user_online(identity))?;
        }
        self.send_to_connection(connection_id, &Outgoing::authed(identity, connection_id))?;
        self.send_to_connection(
            connection_id,
            &Outgoing::online_users(self.registry.online_identities()),
        )?;
        Ok(())
    }

    /// Tear down a transport session. Safe to call more than once.
    pub fn detach(&self, connection_id: &str) -> Result<Transition> {
        let Some(conn) = self.connections.remove(connection_id) else {
            return Ok(Transition::Unchanged);
        };

        let _edge = self.edges.lock().unwrap_or_else(PoisonError::into_inner);
        let transition = self.registry.disconnect(&conn.identity, connection_id)?;
        if transition.went_offline() {
            tracing::info!(identity = %conn.identity, conn = connection_id, "user offline");
            self.broadcast_except(connection_id, &Outgoing::user_offline(&conn.identity))?;
        }
        Ok(transition)
    }

    /// Queue `out` on every live connection of `identity`.
    pub fn send_to_identity(&self, identity: &str, out: &Outgoing) -> Result<Delivery> {
        let Some(connection_ids) = self.registry.connections_for(identity) else {
            return Ok(Delivery::Offline);
        };

        let prepared = PreparedMsg::prepare(out)?;
        let mut delivered = 0;
        for cid in &connection_ids {
            if let Some(conn) = self.connections.get(cid) {
                if try_send(&conn, &prepared) {
                    delivered += 1;
                }
            }
        }
        Ok(Delivery::Delivered(delivered))
    }

    /// Queue `out` on a single connection. Returns whether it was queued.
    pub fn send_to_connection(&self, connection_id: &str, out: &Outgoing) -> Result<bool> {
        let conn = self
            .connections
            .get(connection_id)
            .ok_or_else(|| WsPresenceError::BadRequest(format!("unknown connection: {connection_id}")))?;
        let prepared = PreparedMsg::prepare(out)?;
        Ok(try_send(&conn, &prepared))
    }

    /// Queue `out` on every connection except `skip`. Returns how many took it.
    pub fn broadcast_except(&self, skip: &str, out: &Outgoing) -> Result<usize> {
        let prepared = PreparedMsg::prepare(out)?;
        let sent = self
            .connections
            .all_except(skip)
            .iter()
            .filter(|conn| try_send(conn, &prepared))
            .count();
        Ok(sent)
    }

    pub fn online_identities(&self) -> Vec<String> {
        self.registry.online_identities()
    }

    pub fn connections_for(&self, identity: &str) -> Option<Vec<String>> {
        self.registry.connections_for(identity)
    }
}

fn try_send(conn: &Connection, prepared: &PreparedMsg) -> bool {
    match conn.tx.try_send(prepared.to_ws_message()) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(identity = %conn.identity, error = %e, "egress dropped");
            false
        }
    }
}

/// Per-message context passed to services (borrow tools instead of owning).
#[derive(Clone)]
pub struct RealtimeCtx {
    identity: Arc<str>,
    connection_id: Arc<str>,
    hub: Arc<PresenceHub>,
}

impl RealtimeCtx {
    pub fn new(identity: impl Into<Arc<str>>, connection_id: impl Into<Arc<str>>, hub: Arc<PresenceHub>) -> Self {
        Self {
            identity: identity.into(),
            connection_id: connection_id.into(),
            hub,
        }
    }

    pub fn identity(&self) -> &str { &self.identity }
    pub fn connection_id(&self) -> &str { &self.connection_id }
    pub fn hub(&self) -> &PresenceHub { &self.hub }

    /// Answer the session that sent the current message.
    pub fn reply(&self, out: Outgoing) -> Result<()> {
        self.hub.send_to_connection(self.connection_id(), &out)?;
        Ok(())
    }

    pub fn send_to_identity(&self, identity: &str, out: Outgoing) -> Result<Delivery> {
        self.hub.send_to_identity(identity, &out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_greeting_rolls_back_the_connect() {
        let hub = PresenceHub::new(Arc::new(PresenceRegistry::new()));
        let (bob_tx, mut bob_rx) = mpsc::channel(16);
        let bob = hub.attach("bob", bob_tx).expect("attach bob");
        while bob_rx.try_recv().is_ok() {}

        // Registered in the registry but missing from the table: the greeting
        // cannot be delivered.
        let t = hub.registry.connect("alice", "conn-orphan").expect("connect");
        let err = hub
            .settle_attach("alice", "conn-orphan", t)
            .expect_err("greeting must fail");
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

        assert!(!hub.registry.is_online("alice"));
        assert_eq!(hub.online_identities(), vec!["bob"]);

        // bob saw alice come and go, in that order.
        let mut seen = Vec::new();
        while let Ok(Message::Text(s)) = bob_rx.try_recv() {
            seen.push(s);
        }
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("user_online"));
        assert!(seen[1].contains("user_offline"));
        assert!(hub.connections.get(&bob).is_some());
    }
}
