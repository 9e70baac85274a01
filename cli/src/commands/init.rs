use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use super::{connect, print_transaction, spinner};

#[derive(Subcommand)]
pub enum InitCommands {
    /// Create the DAO config and vault, owned by the current wallet
    Dao,

    /// Create the marketplace and its treasury
    Market,

    /// Create the membership registry, with the current wallet as mint authority
    Registry,
}

/// Execute one-time program setup
pub async fn execute(action: InitCommands) -> Result<()> {
    let (config, contracts) = connect()?;

    let (label, result) = match action {
        InitCommands::Dao => {
            let pb = spinner("Initializing DAO...");
            let result = contracts.initialize_dao().await;
            pb.finish_and_clear();
            ("DAO", result)
        }
        InitCommands::Market => {
            let pb = spinner("Initializing marketplace...");
            let result = contracts.initialize_market().await;
            pb.finish_and_clear();
            ("Marketplace", result)
        }
        InitCommands::Registry => {
            let pb = spinner("Initializing membership registry...");
            let result = contracts.initialize_registry().await;
            pb.finish_and_clear();
            ("Membership registry", result)
        }
    };

    match result {
        Ok(signature) => {
            println!("{}", format!("✅ {} initialized", label).bright_green());
            println!("  Authority: {}", contracts.payer().to_string().bright_yellow());
            print_transaction(&config, &signature);
            Ok(())
        }
        Err(e) => {
            println!("{}", format!("❌ {} initialization failed", label).bright_red());
            println!("  Error: {}", e);
            println!("  {}", "An account that already exists cannot be initialized twice".dimmed());
            Err(e)
        }
    }
}
