//! # Handler chain
//!
//! Runs a sequence of handlers for each inbound message. Every handler has optional
//! before/handle/after: all `before` run in order (any `false` stops the chain), then `handle`
//! runs until one returns Stop or Reply, then all `after` run in reverse order.
//!
//! A failing `handle` still lets the `after` phase observe the turn (as `Stop`) before the
//! error is returned to the caller.

use dbot_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Chain of handlers: before (all) → handle (until Stop/Reply) → after (reverse).
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        debug!(message_id = %message.id, "step: handler_chain started");

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            if !h.before(message).await? {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        let mut failure = None;

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            match h.handle(message).await {
                Ok(response) => {
                    debug!(handler = %name, response = ?response, "Handler processed");
                    match response {
                        HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                            final_response = response;
                            break;
                        }
                        HandlerResponse::Continue | HandlerResponse::Ignore => {}
                    }
                }
                Err(e) => {
                    warn!(handler = %name, error = %e, "step: handler failed");
                    final_response = HandlerResponse::Stop;
                    failure = Some(e);
                    break;
                }
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(message, &final_response).await?;
        }

        debug!(message_id = %message.id, response = ?final_response, "step: handler_chain finished");

        match failure {
            Some(e) => Err(e),
            None => Ok(final_response),
        }
    }
}
