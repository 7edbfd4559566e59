mod app;
mod client;
mod config;
mod events;
mod panels;
mod protocol;
mod socket;
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "debate-panels")]
#[command(version)]
#[command(about = "Watch two bots debate your question, live in the terminal", long_about = None)]
struct Cli {
    /// Server host and port, overriding the config file
    #[arg(long)]
    host: Option<String>,

    /// Config file to use instead of ~/.debate-panels/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write logs (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,
    /// Write a default config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => Config::home_dir()?.join("debate-panels.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force }) => init_config(cli.config.as_deref(), force),
        Some(Commands::Config) => {
            let config = Config::load(cli.config.as_deref())?.with_host(cli.host);
            print!("{}", config.to_toml()?);
            println!("# endpoint: {}", config.endpoint());
            Ok(())
        }
        None => {
            init_logging(cli.log_file.as_deref())?;
            let config = Config::load(cli.config.as_deref())?.with_host(cli.host);
            info!(
                "debate-panels v{} starting, endpoint {}",
                env!("CARGO_PKG_VERSION"),
                config.endpoint()
            );
            app::run(config).await
        }
    }
}
