mod cli;
mod client;
mod config;
mod envelope;
mod error;
mod feed;
mod server;
mod skill;
mod speech;
mod util;
mod window;

use clap::Parser;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  #[cfg(unix)]
  {
    tokio::spawn(async {
      if let Err(e) = signal_handler().await {
        tracing::error!("signal handler failed: {e:?}");
      }
    });
  }

  let cli = cli::Cli::parse();
  cli.run().await
}

#[cfg(unix)]
async fn signal_handler() -> Result<()> {
  use tokio::signal::unix::{SignalKind, signal};
  use tracing::info;

  let mut sigint = signal(SignalKind::interrupt())?;
  let mut sigterm = signal(SignalKind::terminate())?;

  tokio::select! {
    _ = sigint.recv() => {
      info!("Received SIGINT, shutting down...");
    }
    _ = sigterm.recv() => {
      info!("Received SIGTERM, shutting down...");
    }
  };

  std::process::exit(0)
}
