use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};
use marketplace::program::Marketplace;
use marketplace::{Item, Market};
use membership::Holder;

declare_id!("8i2bDvmPuBbs5peB8JuGKuMbSZdnSgjzxCapTJ2ALQc1");

/// Voting window opened by every proposal (5 minutes in seconds)
pub const VOTING_WINDOW: i64 = 5 * 60;

/// Maximum number of distinct voting rights a single proposal can record.
/// Matches the registry's issuance cap, so every issued right fits.
pub const MAX_VOTED_RIGHTS: usize = membership::MAX_TOTAL_RIGHTS as usize;

#[program]
pub mod dao {
    use super::*;

    /// Initialize the DAO configuration (one-time setup by deployer)
    pub fn initialize_dao(ctx: Context<InitializeDao>) -> Result<()> {
        // The vault always holds at least the rent-exempt reserve.
        let rent_reserve = Rent::get()?.minimum_balance(0);
        let top_up = rent_reserve.saturating_sub(ctx.accounts.vault.lamports());
        if top_up > 0 {
            system_program::transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.owner.to_account_info(),
                        to: ctx.accounts.vault.to_account_info(),
                    },
                ),
                top_up,
            )?;
        }

        let dao_config = &mut ctx.accounts.dao_config;

        dao_config.owner = ctx.accounts.owner.key();
        dao_config.proposal_count = 0;
        dao_config.total_deposits = 0;
        dao_config.bump = ctx.bumps.dao_config;
        dao_config.vault_bump = ctx.bumps.vault;

        msg!(
            "DAO initialized: owner={}, voting_window={}s",
            dao_config.owner,
            VOTING_WINDOW
        );

        emit!(DaoInitializedEvent {
            owner: dao_config.owner,
            vault: ctx.accounts.vault.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Propose buying a marketplace item
    pub fn create_proposal(ctx: Context<CreateProposal>, item_id: u64) -> Result<()> {
        let clock = Clock::get()?;
        let proposer = ctx.accounts.proposer.key();

        require_member(voting_power(&ctx.accounts.holder))?;
        require!(ctx.accounts.item.is_available(), DaoError::ItemUnavailable);

        let dao_config = &mut ctx.accounts.dao_config;
        let proposal_id = dao_config.proposal_count;
        dao_config.proposal_count = dao_config
            .proposal_count
            .checked_add(1)
            .ok_or(DaoError::Overflow)?;

        let proposal = &mut ctx.accounts.proposal;
        proposal.open(
            proposal_id,
            proposer,
            item_id,
            clock.unix_timestamp,
            ctx.bumps.proposal,
        )?;

        msg!(
            "Proposal {} created for item {} by {}, voting closes at {}",
            proposal_id,
            item_id,
            proposer,
            proposal.deadline
        );

        emit!(ProposalCreatedEvent {
            proposal_id,
            proposer,
            item_id,
            deadline: proposal.deadline,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Spend every unused voting right of the caller on one side
    pub fn vote_on_proposal(
        ctx: Context<VoteOnProposal>,
        proposal_id: u64,
        vote: Vote,
    ) -> Result<()> {
        let clock = Clock::get()?;

        require_member(voting_power(&ctx.accounts.holder))?;

        let rights: Vec<u64> = ctx
            .accounts
            .holder
            .as_ref()
            .map(|holder| holder.voting_rights().collect())
            .unwrap_or_default();

        let proposal = &mut ctx.accounts.proposal;
        let weight = proposal.cast_votes(rights, vote, clock.unix_timestamp)?;

        msg!(
            "Vote cast on proposal {}: {:?} with weight {} by {} (yay={}, nay={})",
            proposal_id,
            vote,
            weight,
            ctx.accounts.voter.key(),
            proposal.yay_votes,
            proposal.nay_votes
        );

        emit!(VoteCastEvent {
            proposal_id,
            voter: ctx.accounts.voter.key(),
            vote,
            weight,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Finalize a proposal after its deadline, buying the item if YAY won
    pub fn execute_proposal(ctx: Context<ExecuteProposal>, proposal_id: u64) -> Result<()> {
        let clock = Clock::get()?;

        require_member(voting_power(&ctx.accounts.holder))?;

        let treasury_balance = spendable_balance(
            ctx.accounts.vault.lamports(),
            Rent::get()?.minimum_balance(0),
        );
        let outcome = ctx.accounts.proposal.execute(
            clock.unix_timestamp,
            treasury_balance,
            Market::price(),
        )?;

        if let ExecutionOutcome::Purchase { item_id, price } = outcome {
            let vault_bump = ctx.accounts.dao_config.vault_bump;
            let seeds = &[b"vault".as_ref(), &[vault_bump]];
            let signer = &[&seeds[..]];

            let cpi_accounts = marketplace::cpi::accounts::Purchase {
                market: ctx.accounts.market.to_account_info(),
                item: ctx.accounts.item.to_account_info(),
                treasury: ctx.accounts.market_treasury.to_account_info(),
                buyer: ctx.accounts.vault.to_account_info(),
                system_program: ctx.accounts.system_program.to_account_info(),
            };
            let cpi_program = ctx.accounts.marketplace_program.to_account_info();
            let cpi_ctx = CpiContext::new_with_signer(cpi_program, cpi_accounts, signer);
            marketplace::cpi::purchase(cpi_ctx, item_id, price)?;

            msg!(
                "Proposal {} executed: item {} bought for {} lamports",
                proposal_id,
                item_id,
                price
            );
        } else {
            msg!("Proposal {} executed: rejected, no purchase", proposal_id);
        }

        let proposal = &ctx.accounts.proposal;
        emit!(ProposalExecutedEvent {
            proposal_id,
            executor: ctx.accounts.executor.key(),
            item_id: proposal.item_id,
            purchased: outcome.is_purchase(),
            yay_votes: proposal.yay_votes,
            nay_votes: proposal.nay_votes,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }

    /// Deposit lamports into the DAO vault
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        require!(amount > 0, DaoError::InvalidAmount);

        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.depositor.to_account_info(),
                    to: ctx.accounts.vault.to_account_info(),
                },
            ),
            amount,
        )?;

        let dao_config = &mut ctx.accounts.dao_config;
        dao_config.total_deposits = dao_config
            .total_deposits
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;

        msg!(
            "Deposited {} lamports to DAO vault by {}",
            amount,
            ctx.accounts.depositor.key()
        );

        emit!(TreasuryDepositEvent {
            depositor: ctx.accounts.depositor.key(),
            amount,
            total_deposits: dao_config.total_deposits,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Send the whole spendable vault balance to the owner
    pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
        let spendable = spendable_balance(
            ctx.accounts.vault.lamports(),
            Rent::get()?.minimum_balance(0),
        );
        let amount = ctx
            .accounts
            .dao_config
            .check_withdraw(ctx.accounts.owner.key(), spendable)?;

        let vault_bump = ctx.accounts.dao_config.vault_bump;
        let seeds = &[b"vault".as_ref(), &[vault_bump]];
        let signer = &[&seeds[..]];

        system_program::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.owner.to_account_info(),
                },
                signer,
            ),
            amount,
        )
        .map_err(|_| error!(DaoError::TransferFailed))?;

        msg!("Withdrew {} lamports to owner {}", amount, ctx.accounts.owner.key());

        emit!(TreasuryWithdrawalEvent {
            owner: ctx.accounts.owner.key(),
            amount,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

/// Voting rights held by the caller; a missing holder record counts as none.
fn voting_power(holder: &Option<Account<'_, Holder>>) -> u64 {
    holder.as_ref().map_or(0, |holder| holder.balance_of())
}

fn require_member(voting_power: u64) -> Result<()> {
    require!(voting_power > 0, DaoError::NotMember);
    Ok(())
}

/// Vault lamports available for purchases and withdrawals, net of the
/// rent-exempt reserve the vault must keep.
pub fn spendable_balance(vault_lamports: u64, rent_reserve: u64) -> u64 {
    vault_lamports.saturating_sub(rent_reserve)
}

// ============================================================================
// ACCOUNT STRUCTURES
// ============================================================================

/// DAO configuration account
#[account]
pub struct DaoConfig {
    /// Owner allowed to withdraw the vault
    pub owner: Pubkey,
    /// Total number of proposals created
    pub proposal_count: u64,
    /// Total lamports deposited through the deposit instruction
    pub total_deposits: u64,
    /// PDA bump
    pub bump: u8,
    /// Vault PDA bump
    pub vault_bump: u8,
}

impl DaoConfig {
    pub const MAX_SIZE: usize = 8 +  // discriminator
        32 +                          // owner
        8 +                           // proposal_count
        8 +                           // total_deposits
        1 +                           // bump
        1;                            // vault_bump

    /// Amount the owner may withdraw: the whole spendable balance.
    pub fn check_withdraw(&self, caller: Pubkey, spendable: u64) -> Result<u64> {
        require_keys_eq!(caller, self.owner, DaoError::NotOwner);
        require!(spendable > 0, DaoError::NothingToWithdraw);
        Ok(spendable)
    }
}

/// Proposal account
#[account]
pub struct Proposal {
    /// Creation-order index
    pub proposal_id: u64,
    /// Proposer's public key
    pub proposer: Pubkey,
    /// Marketplace item to buy
    pub item_id: u64,
    /// Voting closes at this timestamp
    pub deadline: i64,
    /// Voting rights spent on YAY
    pub yay_votes: u64,
    /// Voting rights spent on NAY
    pub nay_votes: u64,
    /// Set once, after the deadline
    pub executed: bool,
    /// Voting rights already spent on this proposal
    pub voted_rights: Vec<u64>,
    /// Creation timestamp
    pub created_at: i64,
    /// Execution timestamp (if executed)
    pub executed_at: Option<i64>,
    /// PDA bump
    pub bump: u8,
}

impl Proposal {
    pub const MAX_SIZE: usize = 8 +   // discriminator
        8 +                            // proposal_id
        32 +                           // proposer
        8 +                            // item_id
        8 +                            // deadline
        8 +                            // yay_votes
        8 +                            // nay_votes
        1 +                            // executed
        4 + 8 * MAX_VOTED_RIGHTS +     // voted_rights (vec prefix + data)
        8 +                            // created_at
        1 + 8 +                        // executed_at (Option<i64>)
        1;                             // bump

    pub fn open(
        &mut self,
        proposal_id: u64,
        proposer: Pubkey,
        item_id: u64,
        now: i64,
        bump: u8,
    ) -> Result<()> {
        let deadline = now.checked_add(VOTING_WINDOW).ok_or(DaoError::Overflow)?;

        self.proposal_id = proposal_id;
        self.proposer = proposer;
        self.item_id = item_id;
        self.deadline = deadline;
        self.yay_votes = 0;
        self.nay_votes = 0;
        self.executed = false;
        self.voted_rights = Vec::new();
        self.created_at = now;
        self.executed_at = None;
        self.bump = bump;
        Ok(())
    }

    pub fn phase(&self, now: i64) -> ProposalPhase {
        if self.executed {
            ProposalPhase::Executed
        } else if now < self.deadline {
            ProposalPhase::Active
        } else {
            ProposalPhase::ExpiredPending
        }
    }

    pub fn has_voted(&self, right_id: u64) -> bool {
        self.voted_rights.contains(&right_id)
    }

    pub fn passed(&self) -> bool {
        self.yay_votes > self.nay_votes
    }

    /// Spend every right not yet used on this proposal and return the weight
    /// added. Nothing is mutated unless the whole vote is accepted.
    pub fn cast_votes<I>(&mut self, rights: I, vote: Vote, now: i64) -> Result<u64>
    where
        I: IntoIterator<Item = u64>,
    {
        require!(
            self.phase(now) == ProposalPhase::Active,
            DaoError::VotingClosed
        );

        let mut fresh: Vec<u64> = Vec::new();
        for right_id in rights {
            if !self.has_voted(right_id) && !fresh.contains(&right_id) {
                fresh.push(right_id);
            }
        }

        require!(!fresh.is_empty(), DaoError::AlreadyVoted);
        require!(
            self.voted_rights.len() + fresh.len() <= MAX_VOTED_RIGHTS,
            DaoError::VoteCapacityExceeded
        );

        let weight = fresh.len() as u64;
        let tally = match vote {
            Vote::Yay => &mut self.yay_votes,
            Vote::Nay => &mut self.nay_votes,
        };
        *tally = tally.checked_add(weight).ok_or(DaoError::Overflow)?;
        self.voted_rights.extend(fresh);

        Ok(weight)
    }

    /// Finalize the proposal. A purchase is owed only when YAY strictly
    /// outnumbers NAY; a tie or NAY majority just closes the proposal.
    pub fn execute(
        &mut self,
        now: i64,
        treasury_balance: u64,
        price: u64,
    ) -> Result<ExecutionOutcome> {
        match self.phase(now) {
            ProposalPhase::Executed => return err!(DaoError::AlreadyExecuted),
            ProposalPhase::Active => return err!(DaoError::VotingStillOpen),
            ProposalPhase::ExpiredPending => {}
        }

        let outcome = if self.passed() {
            require!(treasury_balance >= price, DaoError::InsufficientFunds);
            ExecutionOutcome::Purchase {
                item_id: self.item_id,
                price,
            }
        } else {
            ExecutionOutcome::Rejected
        };

        self.executed = true;
        self.executed_at = Some(now);

        Ok(outcome)
    }
}

/// Side of a vote
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Yay,
    Nay,
}

/// Where a proposal is in its lifecycle at a given time
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalPhase {
    /// Before the deadline, accepting votes
    Active,
    /// Deadline passed, waiting for execution
    ExpiredPending,
    /// Finalized
    Executed,
}

/// What executing a proposal requires of the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Purchase { item_id: u64, price: u64 },
    Rejected,
}

impl ExecutionOutcome {
    pub fn is_purchase(&self) -> bool {
        matches!(self, ExecutionOutcome::Purchase { .. })
    }
}

// ============================================================================
// ACCOUNT CONTEXTS
// ============================================================================

/// Initialize DAO configuration
#[derive(Accounts)]
pub struct InitializeDao<'info> {
    #[account(
        init,
        payer = owner,
        space = DaoConfig::MAX_SIZE,
        seeds = [b"dao_config"],
        bump
    )]
    pub dao_config: Account<'info, DaoConfig>,

    /// Holds the DAO's lamports
    #[account(mut, seeds = [b"vault"], bump)]
    pub vault: SystemAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Create a new proposal
#[derive(Accounts)]
#[instruction(item_id: u64)]
pub struct CreateProposal<'info> {
    #[account(
        mut,
        seeds = [b"dao_config"],
        bump = dao_config.bump
    )]
    pub dao_config: Account<'info, DaoConfig>,

    #[account(
        init,
        payer = proposer,
        space = Proposal::MAX_SIZE,
        seeds = [b"proposal", dao_config.proposal_count.to_le_bytes().as_ref()],
        bump
    )]
    pub proposal: Account<'info, Proposal>,

    /// Proposer's voting rights
    #[account(constraint = holder.owner == proposer.key() @ DaoError::NotMember)]
    pub holder: Option<Account<'info, Holder>>,

    /// Marketplace record of the item
    #[account(constraint = item.item_id == item_id @ DaoError::ItemMismatch)]
    pub item: Account<'info, Item>,

    #[account(mut)]
    pub proposer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Cast a vote
#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct VoteOnProposal<'info> {
    #[account(
        mut,
        seeds = [b"proposal", proposal_id.to_le_bytes().as_ref()],
        bump = proposal.bump
    )]
    pub proposal: Account<'info, Proposal>,

    /// Voter's voting rights
    #[account(constraint = holder.owner == voter.key() @ DaoError::NotMember)]
    pub holder: Option<Account<'info, Holder>>,

    pub voter: Signer<'info>,
}

/// Execute a proposal
#[derive(Accounts)]
#[instruction(proposal_id: u64)]
pub struct ExecuteProposal<'info> {
    #[account(
        seeds = [b"dao_config"],
        bump = dao_config.bump
    )]
    pub dao_config: Account<'info, DaoConfig>,

    #[account(
        mut,
        seeds = [b"proposal", proposal_id.to_le_bytes().as_ref()],
        bump = proposal.bump
    )]
    pub proposal: Account<'info, Proposal>,

    /// Executor's voting rights
    #[account(constraint = holder.owner == executor.key() @ DaoError::NotMember)]
    pub holder: Option<Account<'info, Holder>>,

    #[account(
        mut,
        seeds = [b"vault"],
        bump = dao_config.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        constraint = item.item_id == proposal.item_id @ DaoError::ItemMismatch
    )]
    pub item: Account<'info, Item>,

    /// Validated by the marketplace program during purchase
    #[account(mut)]
    pub market_treasury: SystemAccount<'info>,

    pub executor: Signer<'info>,

    pub marketplace_program: Program<'info, Marketplace>,
    pub system_program: Program<'info, System>,
}

/// Deposit to the vault
#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [b"dao_config"],
        bump = dao_config.bump
    )]
    pub dao_config: Account<'info, DaoConfig>,

    #[account(
        mut,
        seeds = [b"vault"],
        bump = dao_config.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Withdraw the vault
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        seeds = [b"dao_config"],
        bump = dao_config.bump,
        has_one = owner @ DaoError::NotOwner
    )]
    pub dao_config: Account<'info, DaoConfig>,

    #[account(
        mut,
        seeds = [b"vault"],
        bump = dao_config.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ============================================================================
// EVENTS
// ============================================================================

#[event]
pub struct DaoInitializedEvent {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ProposalCreatedEvent {
    pub proposal_id: u64,
    pub proposer: Pubkey,
    pub item_id: u64,
    pub deadline: i64,
    pub timestamp: i64,
}

#[event]
pub struct VoteCastEvent {
    pub proposal_id: u64,
    pub voter: Pubkey,
    pub vote: Vote,
    pub weight: u64,
    pub timestamp: i64,
}

#[event]
pub struct ProposalExecutedEvent {
    pub proposal_id: u64,
    pub executor: Pubkey,
    pub item_id: u64,
    pub purchased: bool,
    pub yay_votes: u64,
    pub nay_votes: u64,
    pub timestamp: i64,
}

#[event]
pub struct TreasuryDepositEvent {
    pub depositor: Pubkey,
    pub amount: u64,
    pub total_deposits: u64,
    pub timestamp: i64,
}

#[event]
pub struct TreasuryWithdrawalEvent {
    pub owner: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[error_code]
pub enum DaoError {
    #[msg("Caller holds no voting rights")]
    NotMember,

    #[msg("Item is already held by someone")]
    ItemUnavailable,

    #[msg("Voting period has ended")]
    VotingClosed,

    #[msg("All of the caller's voting rights were already used on this proposal")]
    AlreadyVoted,

    #[msg("Voting period has not ended yet")]
    VotingStillOpen,

    #[msg("Proposal has already been executed")]
    AlreadyExecuted,

    #[msg("DAO vault cannot cover the item price")]
    InsufficientFunds,

    #[msg("Unauthorized: Only the DAO owner can perform this action")]
    NotOwner,

    #[msg("DAO vault is empty")]
    NothingToWithdraw,

    #[msg("Transfer to the owner was rejected")]
    TransferFailed,

    #[msg("Item account does not match the proposal")]
    ItemMismatch,

    #[msg("Proposal cannot record any more voting rights")]
    VoteCapacityExceeded,

    #[msg("Invalid amount")]
    InvalidAmount,

    #[msg("Arithmetic overflow")]
    Overflow,
}
