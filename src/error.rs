use axum::http::Method;
use thiserror::Error;

/// Fatal start-up configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment `TELEGRAM_BOT_TOKEN` variable not found")]
    MissingToken,
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The chat client could not be built from the configured token.
#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("bot token is malformed")]
    MalformedToken,
    #[error("bot token was rejected by the platform")]
    Unauthorized,
}

/// Rejections produced while decoding an inbound webhook request.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported method {0}")]
    MethodNotAllowed(Method),
    #[error(transparent)]
    MalformedPayload(#[from] serde_json::Error),
    #[error("invalid update id of 0 indicates failure to parse incoming update")]
    InvalidUpdateId,
}

/// Delivery failure. Only the target chat id is carried; the transport
/// error itself is logged where it happens.
#[derive(Debug, Error)]
#[error("Could not complete message send to chat id {chat_id}")]
pub struct SendError {
    pub chat_id: i64,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("update carries no message")]
    InvalidInput,
    #[error(transparent)]
    Send(#[from] SendError),
}
