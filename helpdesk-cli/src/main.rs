//! Main entry point for the helpdesk CLI.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

use commands::{
    admin::AdminCommand, categories::CategoryCommand, notifications::NotificationCommand,
    session::SessionCommand, tickets::TicketCommand,
};

/// Helpdesk CLI
#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Command-line client for the helpdesk backend", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (e.g., config.yaml or config.json). If not provided, defaults will be used."
    )]
    pub config: Option<PathBuf>,

    /// Backend origin, overriding the configuration
    #[arg(
        long,
        global = true,
        help = "Backend origin (e.g., http://localhost:8000). Overrides the configuration file and HELPDESK_BASE_URL."
    )]
    pub base_url: Option<Url>,
}

/// Subcommands for the helpdesk CLI
#[derive(Subcommand)]
enum Commands {
    /// Sign in, register, sign out or show the current user
    #[command(subcommand)]
    Session(SessionCommand),

    /// Work with tickets
    #[command(subcommand)]
    Tickets(TicketCommand),

    /// Manage ticket categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Read notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),

    /// Administer accounts and permissions
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Run the route guard for a screen and print where navigation lands
    Navigate {
        /// Route name (e.g. `dashboard`) or path (e.g. `/ticket/4`)
        route: String,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(
            long,
            short,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: clap_complete::Shell,
    },

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml or json). Defaults to yaml."
        )]
        format: Option<String>,
    },
}

fn init_tracing(default_level: &str) {
    let default_level = default_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy()
    });
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Resolve configuration, start logging and restore the saved session.
fn connect(global: &GlobalArgs) -> Result<commands::Connection> {
    let config = commands::load_config(global)?;
    init_tracing(&config.log_level);
    commands::Connection::open(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Completion { shell } => commands::completion::generate_completion(shell),
        Commands::Config { format } => {
            let format = format.unwrap_or_else(|| "yaml".to_string());
            commands::config::generate_config(&format)?;
        }
        Commands::Session(command) => {
            commands::session::run(&connect(&cli.global)?, command).await?;
        }
        Commands::Tickets(command) => {
            commands::tickets::run(&connect(&cli.global)?, command).await?;
        }
        Commands::Categories(command) => {
            commands::categories::run(&connect(&cli.global)?, command).await?;
        }
        Commands::Notifications(command) => {
            commands::notifications::run(&connect(&cli.global)?, command).await?;
        }
        Commands::Admin(command) => {
            commands::admin::run(&connect(&cli.global)?, command).await?;
        }
        Commands::Navigate { route } => {
            commands::navigate::run(&connect(&cli.global)?, &route).await?;
        }
    }

    Ok(())
}
