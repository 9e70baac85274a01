use anyhow::Result;
use colored::Colorize;
use super::{connect, print_transaction, spinner};
use crate::contracts::format_sol;

/// Execute propose command
pub async fn execute(item_id: u64) -> Result<()> {
    let (config, contracts) = connect()?;

    println!("{}", "Creating purchase proposal...".bright_cyan());
    println!("  Proposer: {}", contracts.payer().to_string().bright_yellow());
    println!("  Item:     #{}", item_id);
    println!("  Price:    {} SOL", format_sol(marketplace::ITEM_PRICE));
    println!();

    let pb = spinner("Sending transaction...");
    let result = contracts.create_proposal(item_id).await;
    pb.finish_and_clear();

    match result {
        Ok((proposal_id, signature)) => {
            println!("{}", "✅ Proposal created!".bright_green());
            println!();
            println!("  Proposal ID: {}", proposal_id.to_string().bright_white().bold());
            print_transaction(&config, &signature);
            println!();
            println!(
                "{}",
                format!("Voting is open for {} minutes", dao::VOTING_WINDOW / 60).yellow()
            );
        }
        Err(e) => {
            println!("{}", "❌ Proposal failed".bright_red());
            println!("  Error: {}", e);
            println!();
            println!("{}", "Troubleshooting:".bright_yellow());
            println!("  • You must hold at least one voting right");
            println!("  • The item must be listed and not already purchased");
            return Err(e);
        }
    }

    Ok(())
}
