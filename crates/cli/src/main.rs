//! Roamer CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive multi-turn session
//! - `ask`: Send a single message
//! - `suggest`: Example prompts to get started
//! - `capabilities`: What each agent can do
//! - `config`: Print or check configuration

use clap::{Parser, Subcommand};

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "roamer",
    about = "Roamer — multi-agent travel assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume a named session instead of starting a fresh one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,

        /// Session id to use
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// Print the full turn outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show example prompts
    Suggest {
        /// general, planning, information, budget, accommodation or activities
        #[arg(short, long, default_value = "general")]
        category: String,

        /// How many prompts to show (defaults to prompts.suggestion_count)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// List what each agent can do
    Capabilities,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration (the default action)
    Default,
    /// Print the effective configuration with keys redacted
    Show,
    /// Print the config file path
    Path,
    /// Load and validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat { session } => commands::chat::run(session).await?,
        Commands::Ask {
            message,
            session,
            json,
        } => commands::ask::run(&message, &session, json).await?,
        Commands::Suggest { category, count } => commands::suggest::run(&category, count).await?,
        Commands::Capabilities => commands::capabilities::run().await?,
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Default) {
            ConfigAction::Default => commands::config_cmd::print_default()?,
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Path => commands::config_cmd::path()?,
            ConfigAction::Validate => commands::config_cmd::validate()?,
        },
    }

    Ok(())
}
