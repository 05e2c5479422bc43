use std::sync::Arc;

use log::{ error, info };

use crate::attachments::AttachmentStager;
use crate::gateway::{ ChatGateway, ChatRequest, GatewayError };
use crate::identity::IdentityProvider;
use crate::models::chat::{ Delivery, Message };

/// Shown in place of a reply whenever the chat call fails.
pub const FALLBACK_REPLY: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Por favor, tente novamente.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingResponse,
}

/// An exchange whose user message is already in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub query: String,
    pub attachment_paths: Vec<String>,
    pub segment_index: u32,
    message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input or a request already in flight.
    Ignored,
    Replied,
    Failed,
}

pub struct Conversation {
    chat: Arc<dyn ChatGateway>,
    identity: Arc<dyn IdentityProvider>,
    system_prompt: String,
    messages: Vec<Message>,
    input: String,
    state: ConversationState,
}

impl Conversation {
    pub fn new(
        chat: Arc<dyn ChatGateway>,
        identity: Arc<dyn IdentityProvider>,
        system_prompt: impl Into<String>
    ) -> Self {
        Self {
            chat,
            identity,
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            input: String::new(),
            state: ConversationState::Idle,
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ConversationState::AwaitingResponse
    }

    pub fn last_reply(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.from_assistant)
    }

    fn next_segment(&self) -> u32 {
        (self.messages.len() as u32) + 1
    }

    /// Appends the user message and enters `AwaitingResponse`.
    pub fn begin(&mut self, attachment_paths: Vec<String>) -> Option<PendingExchange> {
        if self.is_loading() {
            return None;
        }
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }

        let message = Message::user(self.next_segment(), query.clone(), attachment_paths.clone());
        let exchange = PendingExchange {
            query,
            attachment_paths,
            segment_index: message.segment_index,
            message_id: message.id.clone(),
        };
        self.messages.push(message);
        self.input.clear();
        self.state = ConversationState::AwaitingResponse;
        Some(exchange)
    }

    /// Settles the exchange with the reply or the fallback text and returns to `Idle`.
    pub fn complete(
        &mut self,
        exchange: &PendingExchange,
        result: Result<String, GatewayError>
    ) -> SendOutcome {
        let (delivery, content, outcome) = match result {
            Ok(reply) => (Delivery::Delivered, reply, SendOutcome::Replied),
            Err(e) => {
                error!("Chat request for segment {} failed: {}", exchange.segment_index, e);
                (Delivery::Failed, FALLBACK_REPLY.to_string(), SendOutcome::Failed)
            }
        };
        if let Some(sent) = self.messages.iter_mut().find(|m| m.id == exchange.message_id) {
            sent.delivery = delivery;
        }
        self.messages.push(Message::assistant(self.next_segment(), content));
        self.state = ConversationState::Idle;
        outcome
    }

    pub fn request_for(&self, exchange: &PendingExchange) -> ChatRequest {
        ChatRequest {
            query: exchange.query.clone(),
            // resent on every call; the backend may only need it once per conversation
            context: self.system_prompt.clone(),
            user_info: self.identity.current(),
            s3_paths: exchange.attachment_paths.clone(),
            segment_index: exchange.segment_index,
        }
    }

    /// Sends the current input with every pending attachment.
    ///
    /// Pending attachments are cleared only when a reply arrives, so a failed
    /// send can be retried with the same files.
    pub async fn send(&mut self, stager: &mut AttachmentStager) -> SendOutcome {
        let exchange = match self.begin(stager.remote_paths()) {
            Some(exchange) => exchange,
            None => {
                return SendOutcome::Ignored;
            }
        };
        let request = self.request_for(&exchange);
        info!(
            "Sending message {} ({} attachment(s))",
            exchange.segment_index,
            exchange.attachment_paths.len()
        );
        let result = self.chat.send(&request).await;
        let outcome = self.complete(&exchange, result);
        if outcome == SendOutcome::Replied {
            stager.clear();
        }
        outcome
    }
}
