//! Console front end for registering, signing in and signing out against an
//! identity provider.
//!
//! Configuration comes from `SESSION_CLIENT_*` environment variables, CLI
//! flags or a config file; commands are read from stdin.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use session_client::config::ClientSettings;
use session_client::inbound::console;
use session_client::outbound::identity::HttpIdentityProvider;
use session_client::{SessionClient, telemetry};
use tokio::io::{BufReader, stdin, stdout};
use tokio::runtime::Builder;
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = ClientSettings::load_from_iter(env::args_os())
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    telemetry::init(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(settings))
}

async fn run(settings: ClientSettings) -> Result<()> {
    let endpoints = settings.endpoints()?;
    let timeout = settings.request_timeout()?;
    info!(
        base_url = settings.base_url_text(),
        timeout_secs = timeout.as_secs(),
        "using identity provider"
    );

    let provider =
        HttpIdentityProvider::new(endpoints, timeout).wrap_err("failed to build HTTP client")?;
    let client = SessionClient::new(Arc::new(provider));
    console::run(&client, BufReader::new(stdin()), stdout())
        .await
        .wrap_err("console I/O failed")?;
    Ok(())
}
