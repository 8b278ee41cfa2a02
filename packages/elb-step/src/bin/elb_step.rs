//! ELB workflow step
//!
//! Subscribes to the configured trigger subject and processes each event
//! until Ctrl-C / SIGTERM, then lets in-flight events finish.

use std::sync::Arc;

use anyhow::{Context, Result};
use elb_step::aws::AwsElbExecutor;
use elb_step::{build_controller, Config};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workflow_step::{NatsPublisher, StepService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,elb_step=debug,workflow_step=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(operation = %config.operation, provider = %config.provider, "Configuration loaded");

    let client = async_nats::connect(config.nats_uri.as_str())
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats_uri))?;

    let controller = build_controller(
        &config,
        Arc::new(AwsElbExecutor::new(config.operation)),
        Arc::new(NatsPublisher::new(client.clone())),
    );

    let payloads = workflow_step::subscribe(&client, controller.subjects()).await?;
    tracing::info!("listening for {}", controller.subjects().trigger());

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    StepService::new(controller)
        .with_shutdown_grace(config.shutdown_grace)
        .run(payloads, shutdown)
        .await;

    // Push out outcomes still buffered in the client
    client.flush().await.context("Failed to flush NATS client")?;

    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown requested");
    shutdown.cancel();
}
