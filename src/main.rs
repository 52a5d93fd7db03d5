// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use stereogram::{Config, StoreError, ViewingMethod};

mod cli;

#[derive(Parser)]
#[command(name = "stereogram")]
#[command(about = "Create, view and export stereo photo pairs")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Store directory (default: from the config file)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stereograms in the store
    List,

    /// Create a stereogram from a left and a right image
    Create { left: PathBuf, right: PathBuf },

    /// Create a stereogram by splitting a side-by-side image in half
    Split { image: PathBuf },

    /// Write the composed stereogram image
    Show {
        /// Stereogram index (from 'stereogram list')
        index: usize,

        /// Output file path (default: ./STEREO_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set the viewing method (cross-eye, wall-eye, red-green, random-dot, animated-gif)
    Method { index: usize, method: ViewingMethod },

    /// Switch between cross-eye and wall-eye viewing
    Toggle { index: usize },

    /// Copy a stereogram to the export directory
    Export {
        index: usize,

        /// Export directory (default: ~/Pictures/Stereograms)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Delete stereograms
    Delete {
        #[arg(required = true)]
        indices: Vec<usize>,
    },

    /// Write a stereogram's thumbnail as PNG
    Thumbnail {
        index: usize,

        /// Output file path (default: ./thumbnail_INDEX.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=stereogram=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(store) = cli.store {
        config.store_dir = store;
    }

    let result = match cli.command {
        Commands::List => cli::list(&config),
        Commands::Create { left, right } => cli::create(&config, &left, &right),
        Commands::Split { image } => cli::split(&config, &image),
        Commands::Show { index, output } => cli::show(&config, index, output),
        Commands::Method { index, method } => cli::set_method(&config, index, method),
        Commands::Toggle { index } => cli::toggle(&config, index),
        Commands::Export { index, dir } => cli::export(&config, index, dir),
        Commands::Delete { indices } => cli::delete(&config, &indices),
        Commands::Thumbnail { index, output } => cli::thumbnail(&config, index, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<StoreError>() {
                Some(err) => eprintln!(
                    "Error ({} {}): {}",
                    err.domain(),
                    err.code.code(),
                    err.message
                ),
                None => eprintln!("Error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}
