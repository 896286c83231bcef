//! HEVC transcoding bot binary.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hevcbot_media::{check_ffmpeg, check_ffprobe, FfprobeProber, HevcEncoder};
use hevcbot_telegram::BotClient;
use hevcbot_worker::{BotConfig, MessageHandler, PROGRESS_POLL_INTERVAL};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("hevcbot=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting hevcbot");

    let config = match BotConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = check_ffmpeg().and_then(|_| check_ffprobe()) {
        error!("Missing external tool: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.temp_dir).await {
        error!(
            "Failed to create temp dir {}: {}",
            config.temp_dir.display(),
            e
        );
        std::process::exit(1);
    }

    let client = match BotClient::new(config.token.clone()) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    let handler = Arc::new(MessageHandler::new(
        client.clone(),
        Arc::new(FfprobeProber),
        Arc::new(HevcEncoder),
        config.temp_dir.clone(),
        PROGRESS_POLL_INTERVAL,
    ));

    info!("Polling for updates");
    let mut offset: i64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            result = client.get_updates(offset, config.poll_timeout.as_secs()) => {
                match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let Some(message) = update.message else { continue };
                            // Jobs are independent; each runs on its own task.
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                handler.handle(&message).await;
                            });
                        }
                    }
                    Err(e) => {
                        error!("Update poll failed: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }

    info!("Shutdown complete");
}
