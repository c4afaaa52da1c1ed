mod app;
mod catalog;
mod config;
mod event;
mod logging;
mod prefs;
mod query;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(about = "A terminal UI for a hosted products table")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/stockroom/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Store base URL, overrides config and STOCKROOM_URL
  #[arg(short, long)]
  url: Option<String>,

  /// Table holding the products
  #[arg(short, long)]
  table: Option<String>,

  /// Log file (default: $XDG_DATA_HOME/stockroom/stockroom.log)
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(args.log_file.as_deref())?;

  // Load configuration, command line wins
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.url {
    config.store.url = Some(url);
  }
  if let Some(table) = args.table {
    config.store.table = table;
  }

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
