use super::Command;
use crate::platform::Message;
use crate::reply::Reply;

const HELP_TEXT: &str = "I can help you create and manage <b>websites</b> and <b>landing page</b>. \
If you're new here, check out this list of commands you can use to interact with the bot.\n\n\
You can control me by sending these commands: \n\
\n/newpage - create a new page\
\n/mypages - edit your pages [beta]";

/// Lists what the bot can do
pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "commands"
    }

    fn description(&self) -> &str {
        "Lists all available commands"
    }

    fn execute(&self, message: &Message) -> Reply {
        Reply::to(message, HELP_TEXT).html()
    }
}
