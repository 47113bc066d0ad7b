use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::any,
    Json, Router,
};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::dispatcher::CommandDispatcher;
use crate::error::{ClientInitError, ParseError};
use crate::platform::Update;
use crate::reply::ReplySender;

/// Provides an initialized chat client for a webhook request.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ReplySender>, ClientInitError>;
}

#[derive(Clone)]
pub struct WebhookState {
    pub version: String,
    pub dispatcher: Arc<CommandDispatcher>,
    pub connector: Arc<dyn Connector>,
}

/// Response body, `{"version": .., "data": {"status": .., "message": ..}}`
#[derive(Debug, Serialize, PartialEq)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct WebhookResponse {
    pub version: String,
    pub data: ResponseMessage,
}

#[derive(Debug, Serialize, PartialEq)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ResponseMessage {
    pub status: u16,
    pub message: String,
}

/// Decode one webhook delivery into an [`Update`].
///
/// An update without a message is valid here; the dispatcher skips it.
pub fn parse_inbound(method: &Method, body: &[u8]) -> Result<Update, ParseError> {
    if *method != Method::POST {
        warn!("unsupported method {}", method);
        return Err(ParseError::MethodNotAllowed(method.clone()));
    }

    let update: Update = serde_json::from_slice(body).map_err(|e| {
        warn!("could not decode incoming update {}", e);
        ParseError::MalformedPayload(e)
    })?;

    if update.update_id == 0 {
        warn!("invalid update id, got update id = 0");
        return Err(ParseError::InvalidUpdateId);
    }

    Ok(update)
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", any(handle_update))
        .with_state(state)
}

fn respond(
    version: &str,
    status: StatusCode,
    message: &str,
) -> (StatusCode, Json<WebhookResponse>) {
    (
        status,
        Json(WebhookResponse {
            version: version.to_string(),
            data: ResponseMessage {
                status: status.as_u16(),
                message: message.to_string(),
            },
        }),
    )
}

async fn handle_update(
    State(state): State<WebhookState>,
    method: Method,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    let update = match parse_inbound(&method, &body) {
        Ok(update) => update,
        Err(ParseError::MethodNotAllowed(_)) => {
            return respond(
                &state.version,
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
            );
        }
        Err(_) => {
            return respond(
                &state.version,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not read update request",
            );
        }
    };

    let sender = match state.connector.connect().await {
        Ok(sender) => sender,
        Err(e) => {
            error!("Could not start bot: {}", e);
            return respond(
                &state.version,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not start bot",
            );
        }
    };

    if let Err(e) = state.dispatcher.handle(&update, sender.as_ref()).await {
        warn!("Failed to handle update {}: {}", update.update_id, e);
    }

    respond(&state.version, StatusCode::OK, "Operation performed successfully")
}

/// Serve the webhook endpoint on `listen` until Ctrl-C.
pub async fn serve(listen: &str, state: WebhookState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind to {listen}"))?;

    info!("Webhook listening on {}", listen);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down webhook server");
        })
        .await
        .context("Server error")?;

    Ok(())
}
