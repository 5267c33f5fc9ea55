mod commands;
mod ics;

// Re-export celebrate_core as crate::event for internal use
pub use celebrate_core as event;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::add::AddArgs;
use commands::edit::EditArgs;
use commands::types::TypesCommand;

#[derive(Parser)]
#[command(name = "celebrate")]
#[command(about = "Keep track of birthdays, namedays and other yearly celebrations")]
struct Cli {
    /// Use this config file instead of ~/.config/celebrate/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a celebration
    Add(AddArgs),
    /// List celebrations, soonest first
    List {
        /// Only show celebrations within this many days
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Show one celebration
    Show {
        /// Celebration id (or a unique prefix)
        id: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a celebration
    Edit(EditArgs),
    /// Remove a celebration and its reminder
    Remove {
        /// Celebration id (or a unique prefix)
        id: String,
    },
    /// Show or change a celebration's checklist
    Checklist {
        /// Celebration id (or a unique prefix)
        id: String,

        /// Append an item
        #[arg(short, long)]
        add: Option<String>,

        /// Toggle the item with this number
        #[arg(short, long)]
        toggle: Option<usize>,
    },
    /// Manage custom celebration types
    Types {
        #[command(subcommand)]
        command: TypesCommand,
    },
    /// Rebuild every reminder from the stored celebrations
    Reschedule,
    /// Show notifications for reminders that are due
    Remind {
        /// Keep running and check periodically
        #[arg(short, long)]
        watch: bool,

        /// Seconds between checks with --watch
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
    /// Export all celebrations as a yearly .ics calendar
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Add(args) => commands::add::run(config, args).await,
        Commands::List { days } => commands::list::run(config, days).await,
        Commands::Show { id, json } => commands::show::run(config, &id, json).await,
        Commands::Edit(args) => commands::edit::run(config, args).await,
        Commands::Remove { id } => commands::remove::run(config, &id).await,
        Commands::Checklist { id, add, toggle } => {
            commands::checklist::run(config, &id, add, toggle).await
        }
        Commands::Types { command } => commands::types::run(config, command).await,
        Commands::Reschedule => commands::reschedule::run(config).await,
        Commands::Remind { watch, interval } => {
            commands::remind::run(config, watch, interval).await
        }
        Commands::Export { output } => commands::export::run(config, output).await,
    }
}
