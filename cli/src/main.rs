mod commands;
mod config;
mod wallet;
mod errors;
mod contracts;

use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use commands::{
    init::InitCommands, market::MarketCommands, membership::MembershipCommands, vote::Choice,
};

#[derive(Parser)]
#[command(name = "dao-cli")]
#[command(author = "DAO Team")]
#[command(version = "0.1.0")]
#[command(about = "CLI tool for DAO members: propose, vote and execute marketplace purchases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-time setup of the on-chain programs
    Init {
        #[command(subcommand)]
        action: InitCommands,
    },

    /// Propose buying a marketplace item with DAO funds
    Propose {
        /// Marketplace item id
        #[arg(long)]
        item: u64,
    },

    /// Vote on an open proposal with all your voting rights
    Vote {
        /// Proposal id
        #[arg(long)]
        proposal: u64,

        /// Vote direction
        #[arg(long, value_enum)]
        choice: Choice,
    },

    /// Execute a proposal after its voting window closes
    Execute {
        /// Proposal id
        #[arg(long)]
        proposal: u64,
    },

    /// Deposit lamports into the DAO vault
    Deposit {
        /// Amount in lamports
        #[arg(long)]
        amount: u64,
    },

    /// Withdraw the whole DAO vault (owner only)
    Withdraw,

    /// Show a proposal
    Proposal {
        /// Proposal id
        #[arg(long)]
        id: u64,
    },

    /// Show the DAO vault balance and counters
    Treasury,

    /// Voting right management
    Membership {
        #[command(subcommand)]
        action: MembershipCommands,
    },

    /// Marketplace item management
    Market {
        #[command(subcommand)]
        action: MarketCommands,
    },

    /// Wallet management commands
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new wallet
    Create,

    /// Import wallet from keypair file
    Import {
        /// Path to keypair JSON file
        #[arg(long)]
        keypair: String,
    },

    /// Show wallet address
    Address,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set Solana cluster (localnet/devnet/mainnet-beta)
    SetCluster {
        /// Cluster name
        cluster: String,
    },

    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    println!("{}", "╔════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║      DAO CLI - Treasury & Governance       ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════════╝".bright_cyan());
    println!();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { action } => {
            commands::init::execute(action).await?;
        }
        Commands::Propose { item } => {
            commands::propose::execute(item).await?;
        }
        Commands::Vote { proposal, choice } => {
            commands::vote::execute(proposal, choice).await?;
        }
        Commands::Execute { proposal } => {
            commands::execute::execute(proposal).await?;
        }
        Commands::Deposit { amount } => {
            commands::treasury::deposit(amount).await?;
        }
        Commands::Withdraw => {
            commands::treasury::withdraw().await?;
        }
        Commands::Proposal { id } => {
            commands::proposal::execute(id).await?;
        }
        Commands::Treasury => {
            commands::treasury::show().await?;
        }
        Commands::Membership { action } => {
            commands::membership::execute(action).await?;
        }
        Commands::Market { action } => {
            commands::market::execute(action).await?;
        }
        Commands::Wallet { action } => match action {
            WalletCommands::Create => wallet::create().await?,
            WalletCommands::Import { keypair } => wallet::import(&keypair).await?,
            WalletCommands::Address => wallet::show_address().await?,
        },
        Commands::Config { action } => match action {
            ConfigCommands::SetCluster { cluster } => config::set_cluster(&cluster)?,
            ConfigCommands::Show => config::show()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verification() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_has_version() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some("0.1.0"));
    }

    #[test]
    fn test_vote_parses_choice() {
        let cli = Cli::try_parse_from(["dao-cli", "vote", "--proposal", "3", "--choice", "nay"])
            .unwrap();

        match cli.command {
            Commands::Vote { proposal, choice } => {
                assert_eq!(proposal, 3);
                assert_eq!(choice, Choice::Nay);
            }
            _ => panic!("expected vote command"),
        }
    }

    #[test]
    fn test_vote_rejects_unknown_choice() {
        let result =
            Cli::try_parse_from(["dao-cli", "vote", "--proposal", "3", "--choice", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deposit_requires_amount() {
        assert!(Cli::try_parse_from(["dao-cli", "deposit"]).is_err());
        assert!(Cli::try_parse_from(["dao-cli", "deposit", "--amount", "-5"]).is_err());
    }

    #[test]
    fn test_membership_transfer_args() {
        let cli = Cli::try_parse_from([
            "dao-cli", "membership", "transfer", "--right", "4", "--to", "abc",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Membership {
                action: MembershipCommands::Transfer { right: 4, .. }
            }
        ));
    }
}
