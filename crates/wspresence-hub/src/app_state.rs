//! Shared application state for the wsPresence hub.
//!
//! The presence registry is created once by the host and injected here; every
//! connection handler reaches it through the same `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use wspresence_core::error::{Result, WsPresenceError};
use wspresence_core::PresenceRegistry;

use crate::config::HubConfig;
use crate::dispatch::Dispatcher;
use crate::realtime::PresenceHub;
use crate::services::{MessageService, PresenceService};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    hub: Arc<PresenceHub>,
    dispatcher: Arc<Dispatcher>,
}

struct AppStateInner {
    cfg: HubConfig,
    /// ticket -> identity
    tickets: HashMap<String, String>,
}

impl AppState {
    /// Build application state around an already constructed registry.
    pub fn new(cfg: HubConfig, registry: Arc<PresenceRegistry>) -> Result<Self> {
        cfg.validate()?;

        let tickets = cfg
            .auth
            .tickets
            .iter()
            .map(|t| (t.ticket.clone(), t.identity.clone()))
            .collect();

        let hub = Arc::new(PresenceHub::new(registry));
        let dispatcher = Dispatcher::new();
        dispatcher.register_text(Arc::new(PresenceService::new()));
        dispatcher.register_text(Arc::new(MessageService::new()));
        tracing::debug!(svcs = ?dispatcher.registered_text_svcs(), "text services registered");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, tickets }),
            hub,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &HubConfig {
        &self.inner.cfg
    }

    pub fn resolve_ticket(&self, ticket: &str) -> Result<String> {
        self.inner
            .tickets
            .get(ticket)
            .cloned()
            .ok_or(WsPresenceError::AuthFailed)
    }

    pub fn hub(&self) -> Arc<PresenceHub> {
        Arc::clone(&self.hub)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
