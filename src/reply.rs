use async_trait::async_trait;

use crate::error::SendError;
use crate::platform::Message;

/// How the reply body should be rendered by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFormat {
    #[default]
    Plain,
    /// Telegram's HTML subset (`<b>`, `<i>`, `<a>`, ...)
    Html,
}

/// An outbound message, threaded to the message that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub reply_to: i32,
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    /// Plain-text reply in the originating chat, threaded to `message`.
    pub fn to(message: &Message, text: impl Into<String>) -> Self {
        Self {
            chat_id: message.chat_id(),
            reply_to: message.message_id,
            text: text.into(),
            format: ReplyFormat::Plain,
        }
    }

    pub fn html(mut self) -> Self {
        self.format = ReplyFormat::Html;
        self
    }
}

/// Delivers replies through the chat platform.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<(), SendError>;
}
