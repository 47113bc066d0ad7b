mod commands;
mod config;
mod dispatcher;
mod error;
mod platform;
mod reply;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::CommandRegistry;
use crate::config::{Config, IngressMode};
use crate::dispatcher::CommandDispatcher;
use crate::platform::telegram::TelegramConnector;
use crate::webhook::WebhookState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,telebridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicit path must exist; the default one is optional
    let config_path = match std::env::args().nth(1) {
        Some(arg) => Some(PathBuf::from(arg)),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    if let Some(path) = &config_path {
        info!("Loading configuration from: {}", path.display());
    }
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  Mode: {}", config.server.mode);
    info!("  Version: {}", config.app_version);

    let dispatcher = Arc::new(CommandDispatcher::new(CommandRegistry::enabled()));

    match config.server.mode {
        IngressMode::Polling => {
            platform::telegram::run(&config.telegram.bot_token, dispatcher).await?;
        }
        IngressMode::Webhook => {
            let http = teloxide::net::default_reqwest_settings()
                .build()
                .context("Failed to build HTTP client")?;
            let connector = TelegramConnector::new(&config.telegram.bot_token, http);

            let state = WebhookState {
                version: config.app_version.clone(),
                dispatcher,
                connector: Arc::new(connector),
            };
            webhook::serve(&config.server.listen, state).await?;
        }
    }

    Ok(())
}
