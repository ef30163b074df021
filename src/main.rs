//! TKView - Testkube terminal dashboard
//!
//! Browse organisations, environments, agents, workflows and executions of a
//! Testkube deployment from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Token and URL from flags
//! tkview --token tkcapi_0123 --url https://api.testkube.io
//!
//! # Token from the environment, URL from ~/.tkview/config.yaml
//! TKVIEW_TOKEN=tkcapi_0123 tkview
//!
//! # With verbose logging to a custom directory
//! tkview -v --log-dir /tmp/tkview-logs
//! ```

use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tkview_client::{ClientConfig, TestkubeClient};
use tkview_core::{Config, LogGuard, TkviewError, init_logging};
use tkview_tui::{App, restore_terminal};
use tracing::{error, info};

/// Terminal dashboard for Testkube
///
/// Shows the organisation and environment tree, the agents of the selected
/// organisation, and the workflows and executions of the selected environment.
#[derive(Parser, Debug)]
#[command(name = "tkview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API token
    #[arg(long, env = "TKVIEW_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL
    #[arg(long, env = "TKVIEW_URL")]
    url: Option<String>,

    /// Configuration file (defaults to ~/.tkview/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for log files (defaults to ~/.tkview/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if let Some(hint) = e.guidance() {
                eprintln!("  {hint}");
            }
            return ExitCode::from(1);
        }
    };

    let _guard = match setup_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!(api_url = %config.api_url, "starting tkview");

    match run_app(&config) {
        Ok(()) => {
            info!("tkview exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("tkview error: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Merge the config file with environment and flags, then validate.
///
/// Flags and `TKVIEW_*` variables are both resolved by clap, so they take
/// precedence over the file.
fn load_config(cli: &Cli) -> tkview_core::Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config = config.with_api_url(url.clone());
    }
    if let Some(token) = &cli.token {
        config = config.with_token(token.clone());
    }
    if let Some(dir) = &cli.log_dir {
        config = config.with_log_dir(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Install a panic hook that restores the terminal before printing the panic message.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

fn setup_logging(cli: &Cli, config: &Config) -> tkview_core::Result<LogGuard> {
    init_logging(config.log_dir.clone(), cli.verbose > 0)
}

/// Build the API client and run the dashboard until the user quits.
fn run_app(config: &Config) -> anyhow::Result<()> {
    let client_config = ClientConfig::from_config(config)?;
    let client = TestkubeClient::new(client_config).context("failed to create API client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut app = App::new()
        .with_client(Arc::new(client))
        .with_refresh_interval(Duration::from_secs(config.refresh_interval_secs));

    runtime
        .block_on(app.run())
        .map_err(|e| match fatal_guidance(e.as_ref()) {
            Some(hint) => anyhow::anyhow!("{e}\n  {hint}"),
            None => anyhow::anyhow!("{e}"),
        })
        .context("dashboard failed")
}

/// Guidance for errors that stop the dashboard before it can show them.
fn fatal_guidance(err: &(dyn std::error::Error + 'static)) -> Option<&'static str> {
    err.downcast_ref::<TkviewError>()
        .filter(|err| err.is_fatal())
        .and_then(TkviewError::guidance)
}
