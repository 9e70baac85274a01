use anyhow::Result;
use colored::Colorize;
use super::{connect, print_transaction, spinner};
use crate::contracts::format_sol;
use crate::errors::CliError;

/// Deposit lamports into the DAO vault
pub async fn deposit(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(CliError::InvalidAmount(amount).into());
    }

    let (config, contracts) = connect()?;

    println!("{}", "Depositing into DAO vault...".bright_cyan());
    println!("  From:   {}", contracts.payer().to_string().bright_yellow());
    println!("  Amount: {} SOL", format_sol(amount));
    println!();

    let pb = spinner("Sending transaction...");
    let result = contracts.deposit(amount).await;
    pb.finish_and_clear();

    let signature = result?;
    println!("{}", "✅ Deposit complete!".bright_green());
    print_transaction(&config, &signature);

    Ok(())
}

/// Withdraw the whole vault balance to the owner
pub async fn withdraw() -> Result<()> {
    let (config, contracts) = connect()?;

    let balance = contracts.vault_spendable().await?;

    println!("{}", "Withdrawing DAO vault...".bright_cyan());
    println!("  Owner:  {}", contracts.payer().to_string().bright_yellow());
    println!("  Amount: {} SOL", format_sol(balance));
    println!();

    let pb = spinner("Sending transaction...");
    let result = contracts.withdraw().await;
    pb.finish_and_clear();

    match result {
        Ok(signature) => {
            println!("{}", "✅ Vault withdrawn!".bright_green());
            print_transaction(&config, &signature);
        }
        Err(e) => {
            println!("{}", "❌ Withdrawal failed".bright_red());
            println!("  Error: {}", e);
            println!();
            println!("{}", "Troubleshooting:".bright_yellow());
            println!("  • Only the DAO owner may withdraw");
            println!("  • The vault must hold a nonzero balance");
            return Err(e);
        }
    }

    Ok(())
}

/// Show DAO vault and counters
pub async fn show() -> Result<()> {
    let (_, contracts) = connect()?;

    let dao_config = contracts.dao_config().await?;
    let balance = contracts.vault_balance().await?;
    let spendable = contracts.vault_spendable().await?;
    let price = marketplace::ITEM_PRICE;

    println!("{}", "═══ DAO Treasury ═══".bright_cyan());
    println!("  Owner:          {}", dao_config.owner.to_string().bright_yellow());
    println!("  Vault Balance:  {} SOL", format_sol(balance));
    println!("  Spendable:      {} SOL", format_sol(spendable).bright_green());
    println!("  Rent Reserve:   {} SOL", format_sol(balance.saturating_sub(spendable)).dimmed());
    println!("  Total Deposits: {} SOL", format_sol(dao_config.total_deposits).dimmed());
    println!("  Proposals:      {}", dao_config.proposal_count);
    println!(
        "  Purchases:      {} affordable at {} SOL each",
        affordable_purchases(spendable, price),
        format_sol(price)
    );

    Ok(())
}

/// Number of purchases the spendable balance covers
fn affordable_purchases(spendable: u64, price: u64) -> u64 {
    spendable / price
}
