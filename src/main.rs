use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod core;
mod daemon;
mod poll;
mod sources;

#[derive(Parser)]
#[command(name = "dinewatch")]
#[command(author, version, about = "Desktop companion for a restaurant storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the watcher daemon
    Daemon,

    /// Show current order and reservation statuses
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the menu
    Menu {
        /// Category id or name to list items for
        #[arg(long)]
        category: Option<String>,

        /// Show a single item by id
        #[arg(long)]
        item: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage your cart
    Cart {
        #[command(subcommand)]
        command: cli::cart::CartCommand,
    },

    /// Place and track orders
    Order {
        #[command(subcommand)]
        command: cli::order::OrderCommand,
    },

    /// Book and manage table reservations
    Reserve {
        #[command(subcommand)]
        command: cli::reserve::ReserveCommand,
    },

    /// Read and leave reviews
    Review {
        #[command(subcommand)]
        command: cli::review::ReviewCommand,
    },

    /// Trigger daemon refresh via D-Bus
    Refresh,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(journald: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let journald_layer = if journald {
        tracing_journald::layer().ok()
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(journald_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon => {
            init_logging(true);
            daemon::run().await
        }
        Commands::Status { json } => {
            init_logging(false);
            cli::status::run(json).await
        }
        Commands::Menu {
            category,
            item,
            json,
        } => {
            init_logging(false);
            cli::menu::run(category, item, json).await
        }
        Commands::Cart { command } => {
            init_logging(false);
            cli::cart::run(command).await
        }
        Commands::Order { command } => {
            init_logging(false);
            cli::order::run(command).await
        }
        Commands::Reserve { command } => {
            init_logging(false);
            cli::reserve::run(command).await
        }
        Commands::Review { command } => {
            init_logging(false);
            cli::review::run(command).await
        }
        Commands::Refresh => {
            init_logging(false);
            cli::refresh::run().await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
