//! Counselor chat
//!
//! Keeps the transcript shown in the counselor tab and runs one gateway turn
//! per user message. A turn is split into [`ChatSession::begin`] and
//! [`ChatSession::complete`] so a front end can show a typing indicator and
//! refuse further input while the reply is pending.

use serde::Serialize;

use crate::error::GatewayError;
use crate::gateway::AiGateway;
use crate::types::ChatMessage;

pub const GREETING: &str =
    "你好，我是你的专属辅导员。无论工作中遇到什么烦心事，或者只是想找人说说话，我都在这里。";

/// Reply used when the model answers with an empty string
pub const EMPTY_REPLY: &str = "抱歉，我刚刚在思考别的事情，能请你再说一遍吗？";

/// Reply used when the gateway call fails
pub const ERROR_REPLY: &str = "网络稍微有点波折，请稍后再试哦。";

/// A user message waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub message: String,
    /// Transcript before `message`
    pub prior: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    busy: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::model(GREETING)],
            busy: false,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// A reply is pending
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Append the user's message and mark the session busy.
    ///
    /// Returns `None` for blank input or while another turn is pending.
    pub fn begin(&mut self, input: &str) -> Option<PendingTurn> {
        let message = input.trim();
        if message.is_empty() || self.busy {
            return None;
        }

        let prior = self.transcript.clone();
        self.transcript.push(ChatMessage::user(message));
        self.busy = true;
        Some(PendingTurn {
            message: message.to_string(),
            prior,
        })
    }

    /// Append the reply for the pending turn and clear the busy flag
    pub fn complete(&mut self, reply: Result<String, GatewayError>) -> &ChatMessage {
        let content = match reply {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "counselor reply failed");
                ERROR_REPLY.to_string()
            }
        };

        self.transcript.push(ChatMessage::model(content));
        self.busy = false;
        &self.transcript[self.transcript.len() - 1]
    }

    /// Run a full turn against `gateway`.
    ///
    /// Returns the reply appended to the transcript, or `None` when the input
    /// was ignored.
    pub async fn send(&mut self, input: &str, gateway: &dyn AiGateway) -> Option<&ChatMessage> {
        let turn = self.begin(input)?;
        tracing::debug!(gateway = gateway.name(), turns = turn.prior.len(), "counselor turn");
        let reply = gateway.chat(&turn.message, &turn.prior).await;
        Some(self.complete(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Analysis, OfflineGateway};
    use crate::types::ChatRole;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct EchoGateway {
        reply: String,
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl EchoGateway {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiGateway for EchoGateway {
        async fn analyze(&self, score: u32) -> Result<Analysis, GatewayError> {
            Ok(Analysis::fallback(score))
        }

        async fn chat(&self, message: &str, prior: &[ChatMessage]) -> Result<String, GatewayError> {
            self.seen
                .lock()
                .unwrap()
                .push((message.to_string(), prior.len()));
            Ok(self.reply.clone())
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    #[test]
    fn test_transcript_starts_with_greeting() {
        let chat = ChatSession::new();
        assert_eq!(chat.transcript(), &[ChatMessage::model(GREETING)]);
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn test_reply_appended_after_user_message() {
        let gateway = EchoGateway::new("听起来你最近很辛苦。");
        let mut chat = ChatSession::new();

        let reply = chat.send("  最近夜班太多了 ", &gateway).await.cloned();
        assert_eq!(reply, Some(ChatMessage::model("听起来你最近很辛苦。")));

        let roles: Vec<ChatRole> = chat.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Model, ChatRole::User, ChatRole::Model]);
        assert_eq!(chat.transcript()[1].content, "最近夜班太多了");
        assert_eq!(
            gateway.seen.lock().unwrap().clone(),
            vec![("最近夜班太多了".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let gateway = EchoGateway::new("hi");
        let mut chat = ChatSession::new();
        assert!(chat.send("   ", &gateway).await.is_none());
        assert_eq!(chat.transcript().len(), 1);
        assert!(gateway.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_second_send_while_busy_is_ignored() {
        let mut chat = ChatSession::new();
        let turn = chat.begin("第一条").unwrap();
        assert_eq!(turn.prior.len(), 1);
        assert!(chat.is_busy());

        assert!(chat.begin("第二条").is_none());
        assert_eq!(chat.transcript().len(), 2);

        chat.complete(Ok("收到".to_string()));
        assert!(!chat.is_busy());
        assert!(chat.begin("第二条").is_some());
    }

    #[tokio::test]
    async fn test_empty_reply_substituted() {
        let gateway = EchoGateway::new("  ");
        let mut chat = ChatSession::new();
        let reply = chat.send("你好", &gateway).await.unwrap();
        assert_eq!(reply.content, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_gateway_failure_substituted() {
        let mut chat = ChatSession::new();
        let reply = chat.send("你好", &OfflineGateway).await.unwrap();
        assert_eq!(reply.content, ERROR_REPLY);
        assert!(!chat.is_busy());
        assert_eq!(chat.transcript().len(), 3);
    }
}
