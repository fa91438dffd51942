//! `mavsniff` binary: announce to a vehicle and print its telemetry.
//!
//! Runs until Ctrl+C or `SIGTERM`, then closes the socket and waits for the
//! receive loop to finish before exiting.

mod cli;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, OutputFormat};
use mavsniff::{ListenerSession, Record, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Some(addr) = cli.metrics_addr {
        install_metrics_exporter(addr)?;
    }

    let config = SessionConfig {
        listen_addr: cli.listen_addr(),
        remote_addr: cli.remote_addr(),
        read_deadline: Duration::from_millis(cli.read_deadline_ms),
        ..SessionConfig::default()
    };
    let session = ListenerSession::new(config).bind()?;
    println!(
        "listening on {}; announcing to {}",
        config.listen_addr, config.remote_addr
    );
    let session = session.announce().await?;

    let format = cli.format;
    let stats = session
        .run(move |record: Record| print_record(format, &record))
        .await;

    tracing::info!(
        datagrams = stats.datagrams,
        records = stats.records,
        receive_errors = stats.receive_errors,
        "shut down"
    );
    println!("bye");
    Ok(())
}

fn print_record(format: OutputFormat, record: &Record) {
    match format {
        OutputFormat::Text => println!("{record}"),
        OutputFormat::Json => match serde_json::to_string_pretty(record) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("failed to render record: error={e}"),
        },
    }
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(addr: std::net::SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(%addr, "serving metrics");
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(addr: std::net::SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    log::warn!("metrics support not compiled in; ignoring --metrics-addr {addr}");
    Ok(())
}
