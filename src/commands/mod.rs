pub mod help;
pub mod start;

use crate::platform::Message;
use crate::reply::Reply;

/// A `/word` command the bot answers to
pub trait Command: Send + Sync {
    /// Lower-case name matched against the command token
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Build the reply for `message`
    fn execute(&self, message: &Message) -> Reply;
}

/// Fixed, ordered set of enabled commands. Built once at start-up and
/// read-only afterwards.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Every command the bot ships with, in match order
    pub fn enabled() -> Self {
        Self {
            commands: vec![Box::new(start::StartCommand), Box::new(help::HelpCommand)],
        }
    }

    pub fn list(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    /// First command whose name equals `token`, ignoring case
    pub fn find(&self, token: &str) -> Option<&dyn Command> {
        let token = token.to_lowercase();
        self.list().find(|c| c.name().to_lowercase() == token)
    }
}
