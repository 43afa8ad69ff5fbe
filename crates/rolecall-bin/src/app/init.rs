//! Bot initialization.

use super::health::{self, PROBE_TIMEOUT};
use super::service::BotService;
use admission_gate::{AdmissionGate, RateLimiter};
use command_dispatch::Dispatcher;
use role_directory::{RoleDirectory, RoleStore};
use rolecall_config_and_utils::Config;
use std::sync::Arc;
use telegram_transport::{TelegramClient, TelegramTransport};
use tokio::sync::watch;
use tracing::{error, info};

/// Run the bot until SIGINT or SIGTERM.
///
/// Failing to open the directory or to authorize the bot token aborts
/// startup. Everything after that is logged and survived.
pub async fn run_bot(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        env = %config.env,
        database = %config.database_path.display(),
        admin = %config.admin_username,
        rate_limit_per_min = config.rate_limit_per_min,
        allowed_chats = config.allowed_chats.len(),
        "Starting rolecall"
    );

    let directory = RoleDirectory::open(&config.database_path, config.database_timeout).await?;
    directory.ping(PROBE_TIMEOUT).await?;

    let client = TelegramClient::new(config.telegram_token.clone(), config.max_retries);
    let me = client.get_me().await?;
    info!(
        bot_id = me.id,
        bot_username = me.username.as_deref().unwrap_or_default(),
        "Authorized on Telegram"
    );
    let transport = TelegramTransport::new(client, config.update_timeout);

    let store: Arc<dyn RoleStore> = Arc::new(directory.clone());
    let service = BotService::new(
        AdmissionGate::new(
            RateLimiter::per_minute(config.rate_limit_per_min),
            config.allowed_chats.iter().copied(),
            config.admin_username.clone(),
        ),
        Dispatcher::new(Arc::clone(&store)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let health_server = {
        let port = config.health_port;
        let store = Arc::clone(&store);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(port, store, shutdown).await {
                error!(port, error = %e, "Health server failed");
            }
        })
    };

    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    service.run(&transport, shutdown_rx).await;

    if let Err(e) = health_server.await {
        error!(error = %e, "Health server task panicked");
    }
    directory.close().await?;

    info!("Rolecall stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C");
    }
}
