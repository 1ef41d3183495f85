//! CLI frontend for the Tableau interactive fiction engine.

mod commands;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use commands::SceneArgs;

#[derive(Parser)]
#[command(
    name = "tb",
    about = "Tableau — interactive fiction with a living scene",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively: read commands from stdin and send them to the story service
    Play {
        /// URL of the story service
        #[arg(
            long,
            env = "TABLEAU_ENDPOINT",
            default_value = "http://localhost:3000/api/openai-proxy"
        )]
        endpoint: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Apply recorded story responses and print the resulting scene operations
    Replay {
        /// JSON file holding an array of story responses or visual updates
        file: PathBuf,

        /// Pause between turns, in milliseconds
        #[arg(long, default_value = "0")]
        delay: u64,

        /// Wait for every effect to expire before printing the scene
        #[arg(long)]
        settle: bool,

        #[command(flatten)]
        scene: SceneArgs,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            endpoint,
            timeout,
            scene,
        } => commands::play::run(&endpoint, Duration::from_secs(timeout), &scene).await,
        Commands::Replay {
            file,
            delay,
            settle,
            scene,
        } => commands::replay::run(&file, Duration::from_millis(delay), settle, &scene).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
