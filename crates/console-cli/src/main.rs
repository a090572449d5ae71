//! Examdesk CLI - operator console for the exam and attendance platform.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use console_core::init_logging;
use std::path::PathBuf;

/// Examdesk command-line interface.
#[derive(Parser)]
#[command(name = "examdesk")]
#[command(about = "Examdesk console for exam and attendance administration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Base directory for runtime files (config, session). Defaults to ~/.examdesk
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Logout and clear the session
    Logout,

    /// Check authentication status
    Status,

    /// Show the logged-in user's profile
    Profile,

    /// Watch session validity in the foreground
    Watch {
        /// Seconds between validity checks (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let ctx = commands::build_context(cli.base_dir)?;

    match cli.command {
        Commands::Login { email } => commands::login(&ctx, email, &cli.format).await?,
        Commands::Logout => commands::logout(&ctx, &cli.format)?,
        Commands::Status => commands::status(&ctx, &cli.format)?,
        Commands::Profile => commands::profile(&ctx, &cli.format).await?,
        Commands::Watch { interval } => commands::watch(&ctx, interval, &cli.format).await?,
    }

    Ok(())
}
