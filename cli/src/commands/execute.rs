use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use dao::ProposalPhase;
use super::{connect, print_transaction, spinner};
use crate::contracts::format_sol;

/// Execute a proposal whose voting window has closed
pub async fn execute(proposal_id: u64) -> Result<()> {
    let (config, contracts) = connect()?;

    let proposal = contracts.proposal(proposal_id).await?;
    let now = Utc::now().timestamp();

    println!("{}", "Executing proposal...".bright_cyan());
    println!("  Proposal: #{}", proposal_id);
    println!("  Item:     #{}", proposal.item_id);
    println!(
        "  Tally:    {} YAY / {} NAY",
        proposal.yay_votes.to_string().bright_green(),
        proposal.nay_votes.to_string().bright_red()
    );

    match proposal.phase(now) {
        ProposalPhase::Active => {
            println!(
                "{}",
                format!("  Voting still open for {}s", proposal.deadline - now).yellow()
            );
        }
        ProposalPhase::Executed => {
            println!("{}", "  Proposal has already been executed".yellow());
        }
        ProposalPhase::ExpiredPending => {}
    }
    println!();

    let pb = spinner("Sending transaction...");
    let result = contracts.execute(proposal_id).await;
    pb.finish_and_clear();

    match result {
        Ok(signature) => {
            if proposal.passed() {
                println!("{}", "✅ Proposal passed, item purchased!".bright_green());
                println!("  Paid: {} SOL", format_sol(marketplace::ITEM_PRICE));
            } else {
                println!("{}", "✅ Proposal rejected and closed".bright_green());
            }
            print_transaction(&config, &signature);
        }
        Err(e) => {
            println!("{}", "❌ Execution failed".bright_red());
            println!("  Error: {}", e);
            println!();
            println!("{}", "Troubleshooting:".bright_yellow());
            println!("  • Only voting-right holders may execute");
            println!(
                "  • A passing proposal needs {} SOL in the DAO vault",
                format_sol(marketplace::ITEM_PRICE)
            );
            return Err(e);
        }
    }

    Ok(())
}
