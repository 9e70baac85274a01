use anchor_client::solana_sdk::pubkey::Pubkey;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::str::FromStr;
use super::{connect, print_transaction, spinner};

#[derive(Subcommand)]
pub enum MembershipCommands {
    /// Open an empty holder record for the current wallet
    Open,

    /// Mint a new voting right (registry authority only)
    Mint {
        /// Recipient address
        #[arg(long)]
        to: String,
    },

    /// Transfer one of your voting rights
    Transfer {
        /// Voting right id
        #[arg(long)]
        right: u64,

        /// Recipient address
        #[arg(long)]
        to: String,
    },

    /// Show voting rights held by an address (defaults to the current wallet)
    Show {
        #[arg(long)]
        owner: Option<String>,
    },
}

pub async fn execute(action: MembershipCommands) -> Result<()> {
    match action {
        MembershipCommands::Open => open().await,
        MembershipCommands::Mint { to } => mint(&parse_address(&to)?).await,
        MembershipCommands::Transfer { right, to } => transfer(right, &parse_address(&to)?).await,
        MembershipCommands::Show { owner } => {
            let owner = owner.as_deref().map(parse_address).transpose()?;
            show(owner).await
        }
    }
}

async fn open() -> Result<()> {
    let (config, contracts) = connect()?;
    let owner = contracts.payer();

    if contracts.holder(&owner).await.is_some() {
        println!("{}", "  ✓ Holder record already exists".green());
        return Ok(());
    }

    let pb = spinner("Opening holder record...");
    let result = contracts.open_holder(&owner).await;
    pb.finish_and_clear();

    let signature = result?;
    println!("{}", "✅ Holder record opened!".bright_green());
    print_transaction(&config, &signature);

    Ok(())
}

async fn mint(to: &Pubkey) -> Result<()> {
    let (config, contracts) = connect()?;

    println!("{}", "Minting voting right...".bright_cyan());
    println!("  Recipient: {}", to.to_string().bright_yellow());
    println!();

    if contracts.holder(to).await.is_none() {
        println!("{}", "  Opening holder record for recipient...".dimmed());
        let signature = contracts.open_holder(to).await?;
        println!("  ✓ Holder record opened: {}", signature.bright_green());
    }

    let pb = spinner("Sending transaction...");
    let result = contracts.mint_right(to).await;
    pb.finish_and_clear();

    match result {
        Ok(signature) => {
            println!("{}", "✅ Voting right minted!".bright_green());
            print_transaction(&config, &signature);
        }
        Err(e) => {
            println!("{}", "❌ Mint failed".bright_red());
            println!("  Error: {}", e);
            println!("  {}", "Only the registry authority may mint voting rights".dimmed());
            return Err(e);
        }
    }

    Ok(())
}

async fn transfer(right_id: u64, to: &Pubkey) -> Result<()> {
    let (config, contracts) = connect()?;

    println!("{}", "Transferring voting right...".bright_cyan());
    println!("  Right:     #{}", right_id);
    println!("  Recipient: {}", to.to_string().bright_yellow());
    println!();

    if contracts.holder(to).await.is_none() {
        println!("{}", "  Opening holder record for recipient...".dimmed());
        let signature = contracts.open_holder(to).await?;
        println!("  ✓ Holder record opened: {}", signature.bright_green());
    }

    let pb = spinner("Sending transaction...");
    let result = contracts.transfer_right(right_id, to).await;
    pb.finish_and_clear();

    let signature = result?;
    println!("{}", "✅ Voting right transferred!".bright_green());
    print_transaction(&config, &signature);
    println!();
    println!(
        "{}",
        "Rights already used on a proposal cannot vote on it again".yellow()
    );

    Ok(())
}

async fn show(owner: Option<Pubkey>) -> Result<()> {
    let (_, contracts) = connect()?;
    let owner = owner.unwrap_or_else(|| contracts.payer());

    println!("{}", "═══ Voting Rights ═══".bright_cyan());
    println!("  Owner:   {}", owner.to_string().bright_yellow());

    match contracts.holder(&owner).await {
        Some(holder) => {
            println!("  Balance: {}", holder.balance_of().to_string().bright_green());
            let ids: Vec<String> = holder.voting_rights().map(|id| format!("#{}", id)).collect();
            if !ids.is_empty() {
                println!("  Rights:  {}", ids.join(", "));
            }
        }
        None => {
            println!("  Balance: {}", "0".dimmed());
            println!("  {}", "No holder record. Use 'dao-cli membership open'".dimmed());
        }
    }

    Ok(())
}

fn parse_address(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address).with_context(|| format!("Invalid address: {}", address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let key = Pubkey::new_unique();
        assert_eq!(parse_address(&key.to_string()).unwrap(), key);
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        let err = parse_address("not-a-key").unwrap_err();
        assert!(err.to_string().contains("Invalid address"));
    }
}
