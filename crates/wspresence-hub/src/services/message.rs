use async_trait::async_trait;
use serde::Deserialize;

use wspresence_core::error::{Result, WsPresenceError};
use wspresence_core::protocol::Envelope;

use crate::dispatch::TextService;
use crate::realtime::{Delivery, Outgoing, RealtimeCtx};

/// Point-to-point messages: fan out to every connection of the recipient.
#[derive(Default)]
pub struct MessageService;

impl MessageService {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SendReq {
    to: String,
    body: String,
}

#[async_trait]
impl TextService for MessageService {
    fn svc(&self) -> &'static str {
        "msg"
    }

    async fn handle(&self, ctx: RealtimeCtx, env: Envelope) -> Result<()> {
        match env.msg_type.as_str() {
            "send" => {
                let req: SendReq = env.data_as()?;
                if req.to.is_empty() {
                    return Err(WsPresenceError::BadRequest("msg.send requires a recipient".into()));
                }
                if req.body.is_empty() {
                    return Err(WsPresenceError::BadRequest("msg.send requires a body".into()));
                }

                let delivery =
                    ctx.send_to_identity(&req.to, Outgoing::msg_received(ctx.identity(), &req.body))?;
                match delivery {
                    Delivery::Delivered(n) => ctx.reply(Outgoing::msg_sent(&req.to, n)),
                    // Recipient offline: nothing is stored, the sender decides.
                    Delivery::Offline => {
                        tracing::debug!(from = ctx.identity(), to = %req.to, "recipient offline");
                        ctx.reply(Outgoing::msg_undelivered(&req.to))
                    }
                }
            }
            _ => Err(WsPresenceError::BadRequest("unknown msg type".into())),
        }
    }
}
