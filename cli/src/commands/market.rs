use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use super::{connect, print_transaction, spinner};
use crate::contracts::{format_sol, vault_pda};

#[derive(Subcommand)]
pub enum MarketCommands {
    /// List a new item for sale (market authority only)
    List {
        #[arg(long)]
        item: u64,
    },

    /// Show an item's availability
    Show {
        #[arg(long)]
        item: u64,
    },
}

pub async fn execute(action: MarketCommands) -> Result<()> {
    match action {
        MarketCommands::List { item } => list(item).await,
        MarketCommands::Show { item } => show(item).await,
    }
}

async fn list(item_id: u64) -> Result<()> {
    let (config, contracts) = connect()?;

    let pb = spinner("Listing item...");
    let result = contracts.list_item(item_id).await;
    pb.finish_and_clear();

    let signature = result?;
    println!("{}", format!("✅ Item #{} listed!", item_id).bright_green());
    println!("  Price: {} SOL", format_sol(marketplace::ITEM_PRICE));
    print_transaction(&config, &signature);

    Ok(())
}

async fn show(item_id: u64) -> Result<()> {
    let (_, contracts) = connect()?;

    let item = contracts.item(item_id).await?;

    println!("{}", format!("═══ Item #{} ═══", item_id).bright_cyan());
    println!("  Price:  {} SOL", format_sol(marketplace::ITEM_PRICE));

    match item.holder {
        None => println!("  Status: {}", "Available".bright_green()),
        Some(holder) if holder == vault_pda() => {
            println!("  Status: {}", "Owned by the DAO".bright_yellow())
        }
        Some(holder) => println!("  Status: {} by {}", "Sold".yellow(), holder),
    }

    Ok(())
}
