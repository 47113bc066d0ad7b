use super::Command;
use crate::platform::Message;
use crate::reply::Reply;

/// Greets the sender by username
pub struct StartCommand;

impl Command for StartCommand {
    fn name(&self) -> &str {
        "start"
    }

    fn description(&self) -> &str {
        "Initial command"
    }

    fn execute(&self, message: &Message) -> Reply {
        Reply::to(message, format!("Hello welcome, {}", message.username()))
    }
}
