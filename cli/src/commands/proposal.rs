use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use dao::{Proposal, ProposalPhase};
use super::connect;

/// Show a proposal's tally and state
pub async fn execute(proposal_id: u64) -> Result<()> {
    let (_, contracts) = connect()?;

    let proposal = contracts.proposal(proposal_id).await?;
    let now = Utc::now().timestamp();

    println!("{}", format!("═══ Proposal #{} ═══", proposal_id).bright_cyan());
    println!("  Proposer:  {}", proposal.proposer.to_string().bright_yellow());
    println!("  Item:      #{}", proposal.item_id);
    println!("  YAY:       {}", proposal.yay_votes.to_string().bright_green());
    println!("  NAY:       {}", proposal.nay_votes.to_string().bright_red());
    println!("  Rights:    {} used", proposal.voted_rights.len());
    println!("  Created:   {}", format_time(proposal.created_at).dimmed());
    println!("  Deadline:  {}", format_time(proposal.deadline).dimmed());
    println!("  Status:    {}", status_line(&proposal, now));

    if let Some(executed_at) = proposal.executed_at {
        println!("  Executed:  {}", format_time(executed_at).dimmed());
    }

    Ok(())
}

fn status_line(proposal: &Proposal, now: i64) -> String {
    match proposal.phase(now) {
        ProposalPhase::Active => format!(
            "{} ({}s left)",
            "Voting".bright_green(),
            proposal.deadline - now
        ),
        ProposalPhase::ExpiredPending => {
            let verdict = if proposal.passed() { "passing" } else { "failing" };
            format!("{} ({})", "Awaiting execution".yellow(), verdict)
        }
        ProposalPhase::Executed => {
            let verdict = if proposal.passed() { "purchased" } else { "rejected" };
            format!("{} ({})", "Executed".dimmed(), verdict)
        }
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_client::solana_sdk::pubkey::Pubkey;

    fn proposal(yay: u64, nay: u64, executed: bool) -> Proposal {
        Proposal {
            proposal_id: 0,
            proposer: Pubkey::new_unique(),
            item_id: 1,
            deadline: 1_000,
            yay_votes: yay,
            nay_votes: nay,
            executed,
            voted_rights: Vec::new(),
            created_at: 700,
            executed_at: None,
            bump: 255,
        }
    }

    #[test]
    fn test_status_line_active() {
        let line = status_line(&proposal(0, 0, false), 900);
        assert!(line.contains("Voting"));
        assert!(line.contains("100s left"));
    }

    #[test]
    fn test_status_line_pending() {
        assert!(status_line(&proposal(2, 1, false), 1_000).contains("passing"));
        assert!(status_line(&proposal(1, 1, false), 1_000).contains("failing"));
    }

    #[test]
    fn test_status_line_executed() {
        assert!(status_line(&proposal(2, 1, true), 2_000).contains("purchased"));
        assert!(status_line(&proposal(0, 3, true), 2_000).contains("rejected"));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00:00 UTC");
    }
}
