use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use super::{connect, print_transaction, spinner};

/// Vote direction as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Choice {
    Yay,
    Nay,
}

impl From<Choice> for dao::Vote {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Yay => dao::Vote::Yay,
            Choice::Nay => dao::Vote::Nay,
        }
    }
}

/// Execute vote command
pub async fn execute(proposal_id: u64, choice: Choice) -> Result<()> {
    let (config, contracts) = connect()?;

    let weight = contracts
        .holder(&contracts.payer())
        .await
        .map(|h| h.balance_of())
        .unwrap_or(0);

    println!("{}", "Casting vote...".bright_cyan());
    println!("  Voter:    {}", contracts.payer().to_string().bright_yellow());
    println!("  Proposal: #{}", proposal_id);
    println!("  Choice:   {}", match choice {
        Choice::Yay => "YAY".bright_green(),
        Choice::Nay => "NAY".bright_red(),
    });
    println!("  Rights:   {}", weight);
    println!();

    let pb = spinner("Sending transaction...");
    let result = contracts.vote(proposal_id, choice.into()).await;
    pb.finish_and_clear();

    match result {
        Ok(signature) => {
            println!("{}", "✅ Vote recorded!".bright_green());
            print_transaction(&config, &signature);
        }
        Err(e) => {
            println!("{}", "❌ Vote failed".bright_red());
            println!("  Error: {}", e);
            println!();
            println!("{}", "Troubleshooting:".bright_yellow());
            println!("  • Voting closes 5 minutes after the proposal is created");
            println!("  • Each voting right counts once per proposal");
            return Err(e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_maps_to_program_vote() {
        assert_eq!(dao::Vote::from(Choice::Yay), dao::Vote::Yay);
        assert_eq!(dao::Vote::from(Choice::Nay), dao::Vote::Nay);
    }

    #[test]
    fn test_choice_parses_lowercase() {
        assert_eq!(Choice::from_str("yay", false).unwrap(), Choice::Yay);
        assert_eq!(Choice::from_str("nay", false).unwrap(), Choice::Nay);
        assert!(Choice::from_str("abstain", false).is_err());
    }
}
