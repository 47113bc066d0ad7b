use tracing::{debug, info};

use crate::commands::CommandRegistry;
use crate::error::DispatchError;
use crate::platform::{Message, Update};
use crate::reply::{Reply, ReplySender};

pub const UNKNOWN_COMMAND_REPLY: &str =
    "Sorry this command doesn't exist, see the list of all available commands using /commands";

/// Routes inbound messages to commands or the dialog fallback.
///
/// Holds only the read-only registry, so one instance is shared by every
/// polling update and webhook request.
pub struct CommandDispatcher {
    registry: CommandRegistry,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Decide what to answer to `update` without sending anything.
    pub fn dispatch(&self, update: &Update) -> Result<Reply, DispatchError> {
        let message = update.message.as_ref().ok_or(DispatchError::InvalidInput)?;

        if !message.is_command() {
            return Ok(dialog_reply(message));
        }
        let token = message.command().unwrap_or_default();
        Ok(self.dispatch_command(token, message))
    }

    fn dispatch_command(&self, token: &str, message: &Message) -> Reply {
        match self.registry.find(token) {
            Some(command) => {
                debug!("Running command /{}", command.name());
                command.execute(message)
            }
            None => {
                debug!("Unknown command /{}", token);
                Reply::to(message, UNKNOWN_COMMAND_REPLY)
            }
        }
    }

    /// Dispatch `update` and deliver the reply. Updates without a message
    /// or without text are skipped.
    pub async fn handle(
        &self,
        update: &Update,
        sender: &dyn ReplySender,
    ) -> Result<(), DispatchError> {
        let Some(message) = update.message.as_ref() else {
            debug!("Update {} has no message, skipping", update.update_id);
            return Ok(());
        };
        if message.text.is_none() {
            debug!("Message {} has no text, skipping", message.message_id);
            return Ok(());
        }

        info!("[{}] {}", message.username(), message.text());

        let reply = self.dispatch(update)?;
        sender.send(&reply).await?;
        Ok(())
    }
}

/// Placeholder dialog: echo the text back
fn dialog_reply(message: &Message) -> Reply {
    Reply::to(message, message.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::text_message;
    use crate::reply::testing::{FailingSender, RecordingSender};
    use crate::reply::ReplyFormat;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(CommandRegistry::enabled())
    }

    fn update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(text_message(42, 7, text)),
        }
    }

    #[test]
    fn test_start_any_casing() {
        let d = dispatcher();
        for text in ["/start", "/START", "/StArT", "/start@SiteBot"] {
            let reply = d.dispatch(&update(text)).unwrap();
            assert_eq!(reply.text, "Hello welcome, alice", "for {}", text);
        }
    }

    #[test]
    fn test_commands_routes_to_help() {
        let reply = dispatcher().dispatch(&update("/Commands")).unwrap();
        assert_eq!(reply.format, ReplyFormat::Html);
        assert!(reply.text.contains("/newpage"));
    }

    #[test]
    fn test_unknown_command_fallback() {
        let reply = dispatcher().dispatch(&update("/newpage")).unwrap();
        assert_eq!(reply.text, UNKNOWN_COMMAND_REPLY);
        assert_eq!(reply.reply_to, 42);
        assert_eq!(reply.chat_id, 7);
    }

    #[test]
    fn test_dialog_echo() {
        let reply = dispatcher().dispatch(&update("how are you?")).unwrap();
        assert_eq!(reply.text, "how are you?");
        assert_eq!(reply.format, ReplyFormat::Plain);
    }

    #[test]
    fn test_dispatch_without_message_is_invalid() {
        let err = dispatcher()
            .dispatch(&Update {
                update_id: 5,
                message: None,
            })
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidInput));
    }

    #[tokio::test]
    async fn test_handle_sends_reply() {
        let sender = RecordingSender::default();
        dispatcher().handle(&update("/start"), &sender).await.unwrap();

        let sent = sender.replies();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "Hello welcome, alice");
    }

    #[tokio::test]
    async fn test_handle_skips_empty_updates() {
        let sender = RecordingSender::default();
        let d = dispatcher();
        d.handle(&Update::default(), &sender).await.unwrap();

        let mut no_text = update("");
        if let Some(msg) = no_text.message.as_mut() {
            msg.text = None;
        }
        d.handle(&no_text, &sender).await.unwrap();

        assert!(sender.replies().is_empty());
    }

    #[tokio::test]
    async fn test_handle_wraps_send_error() {
        let err = dispatcher()
            .handle(&update("hello"), &FailingSender)
            .await
            .unwrap_err();
        match err {
            DispatchError::Send(e) => assert_eq!(e.chat_id, 7),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
