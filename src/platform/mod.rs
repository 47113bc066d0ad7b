pub mod telegram;

use serde::Deserialize;

/// Prefix marking a message as a bot command
pub const COMMAND_MARKER: char = '/';

/// One inbound event from the chat platform.
///
/// Decoded from the Bot API JSON schema for webhook delivery, or converted
/// from teloxide's own types in polling mode. Only the fields the bridge
/// uses are modelled; everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Update {
    /// Platform-issued identifier. `0` means the payload carried none.
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// A user-authored chat message
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Message {
    pub message_id: i32,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
}

impl Message {
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Sender's username, falling back to the first name for accounts
    /// without one.
    pub fn username(&self) -> &str {
        match &self.from {
            Some(user) => user
                .username
                .as_deref()
                .unwrap_or(user.first_name.as_str()),
            None => "",
        }
    }

    pub fn is_command(&self) -> bool {
        self.command().is_some()
    }

    /// The command token without the marker or a trailing `@botname`,
    /// e.g. `start` for `/start@MyBot now`.
    pub fn command(&self) -> Option<&str> {
        let rest = self.text().strip_prefix(COMMAND_MARKER)?;
        let word = rest.split_whitespace().next()?;
        if !rest.starts_with(word) {
            return None;
        }
        let token = word.split('@').next().unwrap_or(word);
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
pub(crate) fn text_message(message_id: i32, chat_id: i64, text: &str) -> Message {
    Message {
        message_id,
        from: Some(User {
            username: Some("alice".to_string()),
            first_name: "Alice".to_string(),
        }),
        chat: Chat { id: chat_id },
        text: Some(text.to_string()),
    }
}
