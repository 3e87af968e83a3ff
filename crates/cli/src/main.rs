//! CSE Motors CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! cse-cli migrate
//!
//! # Promote an account to employee
//! cse-cli account set-role -e manager@340jr.net -r employee
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account set-role` - Change an account's role. Registration only ever
//!   creates clients, so this is how employees and admins are made.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cse-cli")]
#[command(author, version, about = "CSE Motors CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Change the role of an existing account
    SetRole {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New role (`client`, `employee`, `admin`)
        #[arg(short, long)]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::site().await?,
        Commands::Account { action } => match action {
            AccountAction::SetRole { email, role } => {
                commands::account::set_role(&email, &role).await?;
            }
        },
    }
    Ok(())
}
