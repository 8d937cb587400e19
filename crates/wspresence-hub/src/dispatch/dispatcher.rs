use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use wspresence_core::error::{Result, WsPresenceError};
use wspresence_core::protocol::Envelope;

use crate::realtime::RealtimeCtx;

/// Text services, keyed by the envelope's `svc`.
#[async_trait]
pub trait TextService: Send + Sync {
    fn svc(&self) -> &'static str;
    async fn handle(&self, ctx: RealtimeCtx, env: Envelope) -> Result<()>;
}

/// Registry and dispatcher for text services.
#[derive(Default)]
pub struct Dispatcher {
    text: DashMap<&'static str, Arc<dyn TextService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            text: DashMap::new(),
        }
    }

    pub fn register_text(&self, svc: Arc<dyn TextService>) {
        self.text.insert(svc.svc(), svc);
    }

    pub fn registered_text_svcs(&self) -> Vec<&'static str> {
        let mut svcs: Vec<&'static str> = self.text.iter().map(|e| *e.key()).collect();
        svcs.sort_unstable();
        svcs
    }

    pub async fn dispatch_text(&self, ctx: RealtimeCtx, env: Envelope) -> Result<()> {
        let svc = env.svc.as_str();
        let handler = self
            .text
            .get(svc)
            .ok_or_else(|| WsPresenceError::BadRequest(format!("unknown svc: {svc}")))?
            .value()
            .clone();
        handler.handle(ctx, env).await
    }
}
