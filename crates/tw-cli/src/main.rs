//! Command-line player for Taleweaver scripts.

mod commands;
mod config;
mod presenter;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tw",
    about = "Taleweaver: play and test YAML interactive fiction",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a script interactively
    Play {
        /// Script file, or a directory with a manifest.yaml
        path: PathBuf,

        /// Wrap width in columns
        #[arg(short, long)]
        width: Option<usize>,

        /// YAML file with presentation settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Do not print panel banners
        #[arg(long)]
        no_banners: bool,
    },

    /// Run the scripted playthroughs listed under `tests`
    Test {
        /// Script file, or a directory with a manifest.yaml
        path: PathBuf,
    },

    /// List the games found in a directory
    List {
        /// Directory holding one game directory per game
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Compile a script and summarize its states
    Check {
        /// Script file, or a directory with a manifest.yaml
        path: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_env("TW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            path,
            width,
            config,
            no_banners,
        } => commands::play::run(&path, width, config.as_deref(), no_banners),
        Commands::Test { path } => commands::test::run(&path),
        Commands::List { dir } => commands::list::run(&dir),
        Commands::Check { path } => commands::check::run(&path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
