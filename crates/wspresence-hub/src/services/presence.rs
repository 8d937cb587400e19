use async_trait::async_trait;

use wspresence_core::error::{Result, WsPresenceError};
use wspresence_core::protocol::Envelope;

use crate::dispatch::TextService;
use crate::realtime::{Outgoing, RealtimeCtx};

/// `presence:list` -> `presence.online_users` to the caller.
#[derive(Default)]
pub struct PresenceService;

impl PresenceService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextService for PresenceService {
    fn svc(&self) -> &'static str {
        "presence"
    }

    async fn handle(&self, ctx: RealtimeCtx, env: Envelope) -> Result<()> {
        match env.msg_type.as_str() {
            "list" => ctx.reply(Outgoing::online_users(ctx.hub().online_identities())),
            _ => Err(WsPresenceError::BadRequest("unknown presence type".into())),
        }
    }
}
