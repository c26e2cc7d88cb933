// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use clusterzone::{
    config::{Cli, LogFormat},
    constants::{BOOTSTRAP_RETRY_INTERVAL_SECS, TOKIO_WORKER_THREADS},
    controller::Controller,
    sync_client::ZoneSyncClient,
    update::HttpUpdateClient,
    watch::{cluster_events, service_reflector},
};
use kube::Client;
use std::time::Duration;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("clusterzone")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message. Respects `RUST_LOG`, defaulting to
/// `info`.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_tracing(cli.log_format);
    info!("Starting clusterzone");

    let config = cli.validate().context("Invalid configuration")?;
    info!(
        update_server = %config.update_server,
        nameserver = %config.nameserver,
        "Configuration validated"
    );

    let updater = HttpUpdateClient::new(&config.update_server, config.request_timeout)?;
    let sync_client = ZoneSyncClient::new(updater, config.zones, config.nameserver);

    // Zones must exist before any record is written
    sync_client
        .bootstrap_until_ready(Duration::from_secs(BOOTSTRAP_RETRY_INTERVAL_SECS))
        .await;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let (services, reflector) = service_reflector(client.clone());
    tokio::spawn(reflector);
    services
        .wait_until_ready()
        .await
        .context("Service cache stopped before it was populated")?;
    info!(services = services.state().len(), "Service cache ready");

    let controller = Controller::new(sync_client, services);

    tokio::select! {
        () = controller.run(cluster_events(client)) => {
            error!("CRITICAL: event stream ended unexpectedly");
            anyhow::bail!("Event stream ended unexpectedly")
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
