use clap::Parser;
use color_eyre::eyre::Result;
use tracing::error;

use crate::{
  app::App,
  cli::Cli,
  utils::{initialize_logging, initialize_panic_handler},
};

pub mod action;
pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod mode;
pub mod query_cache;
pub mod tui;
pub mod utils;

async fn tokio_main() -> Result<()> {
  initialize_logging()?;
  initialize_panic_handler()?;

  let args = Cli::parse();
  let mut app = App::new(&args).inspect_err(|e| error!("Failed to start: {:?}", e))?;
  app.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
  tokio_main().await.inspect_err(|_| eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME")))
}
