//! `build-notifier` binary.
//!
//! Loads settings, connects to the build server and alerts until Ctrl-C.
//! On Unix, `SIGHUP` reloads the settings file and re-opens the connection.

use std::path::PathBuf;

use build_notifier::{Client, Result, Settings};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "build-notifier", version, about)]
struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server URL.
    #[arg(long)]
    url: Option<String>,

    /// Only alert on failed builds.
    #[arg(long)]
    show_error_only: bool,
}

impl Cli {
    fn settings_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Settings::default_path)
    }

    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match self.settings_path() {
            Some(path) => Settings::load_or_default(path)?,
            None => Settings::default(),
        };

        if let Some(url) = &self.url {
            settings.url.clone_from(url);
        }
        if self.show_error_only {
            settings.show_error_only = true;
        }

        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("build_notifier=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.load_settings()?;

    let mut client = Client::builder().settings(settings).build()?;
    info!(url = %client.settings().url(), "Starting");
    client.open().await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            () = reload_signal() => {
                match cli.load_settings() {
                    Ok(settings) => {
                        if let Err(e) = client.apply_settings(settings).await {
                            error!(error = %e, "Rejected reloaded settings");
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to reload settings"),
                }
            }
        }
    }

    info!("Shutting down");
    client.close();
    Ok(())
}

/// Resolves on `SIGHUP`.
#[cfg(unix)]
async fn reload_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::hangup()) {
        Ok(mut hangup) => {
            hangup.recv().await;
        }
        Err(e) => {
            error!(error = %e, "Cannot listen for SIGHUP");
            std::future::pending::<()>().await;
        }
    }
}

/// Never resolves: there is no reload signal on this platform.
#[cfg(not(unix))]
async fn reload_signal() {
    std::future::pending::<()>().await;
}
