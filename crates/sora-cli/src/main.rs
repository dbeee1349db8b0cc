//! Soramoyou CLI - headless shell for the Bluesky client backend.

mod app;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use sora_core::{init_logging, Config, Paths};

/// Soramoyou CLI - manage accounts, sessions, and settings.
#[derive(Parser)]
#[command(name = "soramoyou")]
#[command(about = "Soramoyou CLI for account and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with handle and app password
    Login {
        /// PDS base URL (defaults to the configured service)
        #[arg(short, long)]
        server: Option<String>,
        /// Account handle
        #[arg(long)]
        handle: Option<String>,
    },

    /// Logout and deactivate the current account
    Logout,

    /// Show session status
    Status,

    /// List stored accounts
    Accounts,

    /// Switch the active account
    Switch {
        /// DID of the account to activate
        did: String,
    },

    /// Manage settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set the UI locale (ja, en, pt, de)
    Locale {
        /// Language tag
        tag: String,
    },
    /// Set the theme mode (light, dark, system)
    Theme {
        /// Theme mode
        mode: String,
    },
    /// Reset settings to defaults
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level);

    let os_defaults = app::detect_os_defaults();
    let mut ctx = app::AppContext::init(paths, config, os_defaults).await?;

    match cli.command {
        Commands::Login { server, handle } => {
            commands::login(&ctx, server.as_deref(), handle.as_deref(), &cli.format).await
        }
        Commands::Logout => commands::logout(&ctx, &cli.format).await,
        Commands::Status => commands::status(&ctx, &cli.format).await,
        Commands::Accounts => commands::accounts(&ctx, &cli.format).await,
        Commands::Switch { did } => commands::switch(&ctx, &did, &cli.format).await,
        Commands::Settings { command } => match command {
            SettingsCommands::Show => commands::settings_show(&ctx, &cli.format).await,
            SettingsCommands::Locale { tag } => {
                commands::settings_locale(&mut ctx, &tag, &cli.format).await
            }
            SettingsCommands::Theme { mode } => {
                commands::settings_theme(&mut ctx, &mode, &cli.format).await
            }
            SettingsCommands::Reset => commands::settings_reset(&mut ctx, &cli.format).await,
        },
    }
}
