//! Kicks CLI - Database migrations and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! kicks-cli migrate
//!
//! # Load the demo sneaker catalog (or a catalog file)
//! kicks-cli seed catalog
//! kicks-cli seed catalog --file my-catalog.yaml
//!
//! # Grant or revoke back-office access
//! kicks-cli admin promote somchai
//! kicks-cli admin demote somchai
//!
//! # Add store credit to a wallet
//! kicks-cli wallet top-up --user-id 3 --amount 1000
//! ```
//!
//! Every command reads `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "kicks-cli")]
#[command(author, version, about = "Kicks CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage back-office access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Store-credit operations
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert a sneaker catalog
    Catalog {
        /// YAML catalog file; the built-in demo catalog when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seed even if the catalog already has products
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a user the admin role
    Promote {
        /// Username of the account
        username: String,
    },
    /// Return an admin to the user role
    Demote {
        /// Username of the account
        username: String,
    },
}

#[derive(Subcommand)]
enum WalletAction {
    /// Add store credit to a user's wallet
    TopUp {
        /// ID of the user
        #[arg(short, long)]
        user_id: i32,

        /// Amount in baht
        #[arg(short, long)]
        amount: Decimal,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, force } => {
                commands::seed::catalog(file.as_deref(), force).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Promote { username } => commands::admin::promote(&username).await?,
            AdminAction::Demote { username } => commands::admin::demote(&username).await?,
        },
        Commands::Wallet { action } => match action {
            WalletAction::TopUp { user_id, amount } => {
                commands::wallet::top_up(user_id, amount).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_wallet_top_up() {
        let cli = Cli::try_parse_from([
            "kicks-cli", "wallet", "top-up", "--user-id", "3", "--amount", "1000.50",
        ])
        .map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Wallet {
                action: WalletAction::TopUp { user_id: 3, .. }
            })
        ));
    }
}
