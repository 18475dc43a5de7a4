//! fraid - manage striped virtual disks backed by files.
//!
//! Starts an interactive shell after checking that `mdadm` is installed
//! and attempting to load the loop kernel module.

use anyhow::Context;
use clap::Parser;
use fraid::sys::{Losetup, Mdadm, ZeroFill};
use fraid::{shell, ConfigStore, Engine};
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "fraid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Striped virtual disks assembled from files spread across physical disks")]
struct Cli {
    /// Directory holding fraid configuration records
    #[arg(long, default_value = fraid::config::DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let mdadm = Mdadm::new();
    mdadm
        .ensure_installed()
        .context("mdadm package must be installed")?;

    let losetup = Losetup::new();
    if let Err(e) = losetup.enable_module() {
        warn!("could not load loop module: {}", e);
    }

    let store = ConfigStore::open(&cli.config_dir)
        .with_context(|| format!("cannot open config directory {}", cli.config_dir.display()))?;

    let engine = Engine::new(store, mdadm, losetup, ZeroFill);
    shell::run(&engine)?;
    Ok(())
}
