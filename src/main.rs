use slack_email_bot::config::load_settings;
use slack_email_bot::directory::LookupCache;
use slack_email_bot::error::Result;
use slack_email_bot::logging;
use slack_email_bot::lookup::Responder;
use slack_email_bot::slack::{EventHandler, SlackClient};
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Load configuration; missing secrets abort startup
    let settings = load_settings()?;

    logging::init(settings.log_format);

    tracing::info!("🚀 Starting Slack Email Bot");
    tracing::debug!(
        "Config: listen_addr={}, events_path={}, classifier={:?}",
        settings.server.listen_addr,
        settings.server.events_path,
        settings.lookup.classifier
    );

    // Create Slack client
    let slack_client = Arc::new(SlackClient::new(&settings.slack)?);
    tracing::info!("Slack client created");

    // Create lookup cache
    let cache = Arc::new(LookupCache::with_ttl(settings.lookup.cache_ttl));

    // Wire the email lookup pipeline
    let responder = Arc::new(Responder::from_config(
        &settings.lookup,
        slack_client.clone(),
        cache.clone(),
    ));

    let event_handler = EventHandler::new(
        slack_client.clone(),
        responder,
        settings.slack.clone(),
        settings.server.clone(),
    );

    // Setup shutdown signal handler in background
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<String>(1);
    tokio::spawn(async move {
        match setup_shutdown_handler().await {
            Ok(signal_name) => {
                let _ = shutdown_tx.send(signal_name).await;
            }
            Err(e) => logging::log_error("setup_shutdown_handler", &e),
        }
    });

    let result = tokio::select! {
        result = event_handler.start() => {
            tracing::info!("Event handler completed");
            result
        }
        Some(signal_name) = shutdown_rx.recv() => {
            tracing::info!(
                signal = %signal_name,
                "Received shutdown signal, shutting down"
            );
            Ok(())
        }
    };

    cache.log_stats().await;
    cache.clear();

    tracing::info!("Application shutdown sequence complete");
    result
}

/// Setup signal handlers for shutdown
/// Handles SIGINT (Ctrl+C), SIGTERM, and SIGQUIT on Unix systems
async fn setup_shutdown_handler() -> std::io::Result<String> {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigquit = signal(SignalKind::quit())?;

        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)",
            _ = sigterm.recv() => "SIGTERM",
            _ = sigquit.recv() => "SIGQUIT",
        };
        tracing::debug!(signal = name, "Caught signal");

        Ok(name.to_string())
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        signal::ctrl_c().await?;
        tracing::debug!("Caught Ctrl+C signal");
        Ok("Ctrl+C".to_string())
    }
}
