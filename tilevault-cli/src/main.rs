//! TileVault CLI - manage offline map regions from the terminal.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use console::style;

use tilevault::config::ConfigFile;

use commands::DownloadArgs;
use error::CliError;

#[derive(Parser)]
#[command(
    name = "tilevault",
    version,
    about = "Download, list and recall offline map regions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an offline region covering the given bounds
    Download {
        /// Display name stored in the region metadata
        #[arg(long)]
        name: String,

        /// Northern edge latitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        /// Southern edge latitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        /// Eastern edge longitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// Western edge longitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        /// Minimum zoom to cache (the current camera zoom)
        #[arg(long, default_value_t = 10.0)]
        zoom: f64,

        /// Maximum zoom to cache (defaults to the configured map maximum)
        #[arg(long)]
        max_zoom: Option<f64>,
    },

    /// List downloaded regions
    List,

    /// Print the camera target for re-centering on a region
    Goto {
        /// Region id as shown by `list`
        id: u64,
    },

    /// Permanently delete a region
    Delete {
        /// Region id as shown by `list`
        id: u64,
    },
}

fn init_logging() -> Option<tilevault::logging::WorkerGuard> {
    let log_dir = dirs::data_dir().map(|dir| dir.join("tilevault").join("logs"));
    match log_dir {
        Some(dir) => match tilevault::logging::init_file(&dir) {
            Ok(guard) => Some(guard),
            Err(_) => {
                tilevault::logging::init_stderr();
                None
            }
        },
        None => {
            tilevault::logging::init_stderr();
            None
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let manager = commands::build_manager(&config)?;

    match command {
        Commands::Download {
            name,
            north,
            south,
            east,
            west,
            zoom,
            max_zoom,
        } => {
            commands::download(
                &manager,
                &config,
                DownloadArgs {
                    name,
                    north,
                    south,
                    east,
                    west,
                    zoom,
                    max_zoom,
                },
            )
            .await
        }
        Commands::List => commands::list(&manager).await,
        Commands::Goto { id } => commands::goto(&manager, id).await,
        Commands::Delete { id } => commands::delete(&manager, id).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _guard = init_logging();

    if let Err(err) = run(cli.command).await {
        eprintln!("{} {}", style("error:").red().bold(), err);
        std::process::exit(1);
    }
}
