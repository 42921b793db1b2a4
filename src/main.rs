//! JIRA gateway entry point.
//!
//! # Usage
//!
//! ```bash
//! jira-gateway --config ./gateway.yaml --port 8080
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use jira_gateway::{ConfigLoader, GatewayHttpServer, HttpServerConfig, JiraClient, LoggerImpl};

#[derive(Parser, Debug)]
#[command(name = "jira-gateway")]
#[command(about = "HTTP gateway translating simplified requests into JIRA REST API calls")]
#[command(version)]
struct Args {
    /// Additional YAML config file, merged over ./config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind to (overrides config and environment)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and environment)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match ConfigLoader::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("Error: failed to initialize logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let client = match JiraClient::new((&config.jira).into()) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to create JIRA client");
            return ExitCode::FAILURE;
        }
    };
    info!(
        jira_url = %client.base_url(),
        epic_link_field = %client.epic_link_field(),
        "JIRA client initialized"
    );

    let server = GatewayHttpServer::new(Arc::new(client), HttpServerConfig::from(&config.server));
    if let Err(err) = server.serve_with_shutdown(shutdown_signal()).await {
        error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
