mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "luach")]
#[command(about = "Manage Hebrew-calendar anniversaries and mirror them to Google Calendar")]
struct Cli {
    /// Print machine-readable envelopes instead of human output
    #[arg(long, global = true)]
    json: bool,

    /// Google Calendar access token (defaults to $LUACH_GOOGLE_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an anniversary and materialize its initial window
    Add {
        title: String,

        /// Hebrew day of month (1-30)
        #[arg(long)]
        day: u8,

        /// Hebrew month (e.g. "nisan", "adar", "adar-i")
        #[arg(long)]
        month: String,

        /// Hebrew year of the first occurrence
        #[arg(long)]
        year: i32,

        #[arg(long)]
        description: Option<String>,
    },
    /// List anniversaries
    List,
    /// Show the materialized occurrences of an event
    Occurrences { event_id: String },
    /// Report which years are missing, without touching the service
    Check { event_id: String },
    /// Fill missing years for every anniversary
    Sync,
    /// Edit title/description and propagate to every occurrence
    Edit {
        event_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an anniversary locally and remotely
    Remove { event_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let token = cli.token;

    match cli.command {
        Commands::Add {
            title,
            day,
            month,
            year,
            description,
        } => commands::add::run(title, day, month, year, description, token, json).await,
        Commands::List => commands::list::run(json),
        Commands::Occurrences { event_id } => commands::occurrences::run(event_id, json),
        Commands::Check { event_id } => commands::check::run(event_id, json),
        Commands::Sync => commands::sync::run(token, json).await,
        Commands::Edit {
            event_id,
            title,
            description,
        } => commands::edit::run(event_id, title, description, token, json).await,
        Commands::Remove { event_id } => commands::remove::run(event_id, token, json).await,
    }
}
