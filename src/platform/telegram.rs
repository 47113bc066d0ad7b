use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, MessageId, ParseMode, ReplyParameters};
use tracing::{debug, error, info, warn};

use super::{Chat, Message, Update, User};
use crate::dispatcher::CommandDispatcher;
use crate::error::{ClientInitError, SendError};
use crate::reply::{Reply, ReplyFormat, ReplySender};
use crate::webhook::Connector;

/// Sends replies through the Telegram Bot API
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(token: &str) -> Result<Self, ClientInitError> {
        check_token(token)?;
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Reuse an existing HTTP client instead of building one per bot.
    pub fn with_client(token: &str, client: reqwest::Client) -> Result<Self, ClientInitError> {
        check_token(token)?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Check the token against the platform with `getMe`, returning the
    /// bot's username.
    pub async fn authorize(&self) -> Result<String, ClientInitError> {
        let me = self.bot.get_me().await.map_err(|e| {
            error!("Bot authorization failed: {}", e);
            ClientInitError::Unauthorized
        })?;
        Ok(me.username().to_string())
    }
}

/// Webhook-mode client source. The first request that authorizes
/// successfully fixes the sender for the rest of the process; failures are
/// not cached, so a later request retries.
pub struct TelegramConnector {
    token: String,
    http: reqwest::Client,
    sender: tokio::sync::OnceCell<Arc<TelegramSender>>,
}

impl TelegramConnector {
    pub fn new(token: &str, http: reqwest::Client) -> Self {
        Self {
            token: token.to_string(),
            http,
            sender: tokio::sync::OnceCell::new(),
        }
    }
}

#[async_trait]
impl Connector for TelegramConnector {
    async fn connect(&self) -> Result<Arc<dyn ReplySender>, ClientInitError> {
        let sender = self
            .sender
            .get_or_try_init(|| async {
                let sender = TelegramSender::with_client(&self.token, self.http.clone())?;
                let username = sender.authorize().await?;
                info!("Authorized on account {}", username);
                Ok::<_, ClientInitError>(Arc::new(sender))
            })
            .await?;
        Ok(sender.clone() as Arc<dyn ReplySender>)
    }
}

/// Bot tokens look like `123456:AbC-dEf_123`.
fn check_token(token: &str) -> Result<(), ClientInitError> {
    let (id, secret) = token
        .split_once(':')
        .ok_or(ClientInitError::MalformedToken)?;

    let id_ok = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
    let secret_ok = !secret.is_empty()
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if id_ok && secret_ok {
        Ok(())
    } else {
        Err(ClientInitError::MalformedToken)
    }
}

#[async_trait]
impl ReplySender for TelegramSender {
    async fn send(&self, reply: &Reply) -> Result<(), SendError> {
        let mut request = self
            .bot
            .send_message(ChatId(reply.chat_id), reply.text.as_str())
            .reply_parameters(ReplyParameters::new(MessageId(reply.reply_to)));
        if reply.format == ReplyFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }

        request.await.map_err(|e| {
            error!("Could not complete message send to chat {}: {}", reply.chat_id, e);
            SendError {
                chat_id: reply.chat_id,
            }
        })?;
        Ok(())
    }
}

/// Run the long-polling loop until Ctrl-C.
///
/// Every update goes through the same distribution key, so updates are
/// handled one at a time in arrival order.
pub async fn run(token: &str, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let sender = TelegramSender::new(token).context("Failed to create Telegram client")?;
    let bot = sender.bot().clone();

    let username = sender.authorize().await.context("Failed to authorize bot")?;
    info!("Authorized on account {}", username);

    let commands: Vec<BotCommand> = dispatcher
        .registry()
        .list()
        .map(|c| BotCommand::new(c.name(), c.description()))
        .collect();
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("Failed to publish command list: {}", e);
    }

    info!("Starting Telegram polling...");

    let handler = teloxide::types::Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher, Arc::new(sender)])
        .distribution_function(|_| Some(()))
        .default_handler(|upd| async move {
            debug!("Ignoring update {:?} without a message", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Polling stopped");
    Ok(())
}

async fn handle_message(
    upd: teloxide::types::Update,
    msg: teloxide::types::Message,
    dispatcher: Arc<CommandDispatcher>,
    sender: Arc<TelegramSender>,
) -> ResponseResult<()> {
    let update = from_teloxide(&upd, &msg);
    if let Err(e) = dispatcher.handle(&update, sender.as_ref()).await {
        error!("Failed to handle update {}: {}", update.update_id, e);
    }
    Ok(())
}

/// Convert teloxide's update into the bridge's own model.
fn from_teloxide(upd: &teloxide::types::Update, msg: &teloxide::types::Message) -> Update {
    Update {
        update_id: i64::from(upd.id.0),
        message: Some(Message {
            message_id: msg.id.0,
            from: msg.from.as_ref().map(|user| User {
                username: user.username.clone(),
                first_name: user.first_name.clone(),
            }),
            chat: Chat { id: msg.chat.id.0 },
            text: msg.text().map(str::to_string),
        }),
    }
}
