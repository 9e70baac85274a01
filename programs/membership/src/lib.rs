use anchor_lang::prelude::*;

declare_id!("9MQWD6teZZNXtMoiH2hLw72UXwYXRfp9y3tgmfem6e5d");

/// Maximum number of voting rights a single holder record can carry
pub const MAX_RIGHTS_PER_HOLDER: usize = 32;

/// Maximum number of voting rights the registry will ever issue
pub const MAX_TOTAL_RIGHTS: u64 = 128;

#[program]
pub mod membership {
    use super::*;

    /// Initialize the registry (one-time setup by deployer)
    pub fn initialize_registry(ctx: Context<InitializeRegistry>) -> Result<()> {
        let registry = &mut ctx.accounts.registry;

        registry.authority = ctx.accounts.authority.key();
        registry.next_right_id = 0;
        registry.total_rights = 0;
        registry.bump = ctx.bumps.registry;

        msg!("Membership registry initialized by {}", registry.authority);

        emit!(RegistryInitializedEvent {
            authority: registry.authority,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Open an empty holder record for an address
    pub fn open_holder(ctx: Context<OpenHolder>) -> Result<()> {
        let holder = &mut ctx.accounts.holder;

        holder.owner = ctx.accounts.owner.key();
        holder.rights = Vec::new();
        holder.bump = ctx.bumps.holder;

        msg!("Holder record opened for {}", holder.owner);

        Ok(())
    }

    /// Issue a new voting right to a holder (authority only)
    pub fn mint_right(ctx: Context<MintRight>) -> Result<()> {
        let registry = &mut ctx.accounts.registry;
        let holder = &mut ctx.accounts.holder;

        let right_id = registry.issue()?;
        holder.receive(right_id)?;

        msg!("Voting right {} minted to {}", right_id, holder.owner);

        emit!(RightMintedEvent {
            right_id,
            owner: holder.owner,
            total_rights: registry.total_rights,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Move one voting right to another holder
    pub fn transfer_right(ctx: Context<TransferRight>, right_id: u64) -> Result<()> {
        require_keys_neq!(
            ctx.accounts.from.key(),
            ctx.accounts.to.key(),
            MembershipError::SelfTransfer
        );

        ctx.accounts.from.release(right_id)?;
        ctx.accounts.to.receive(right_id)?;

        msg!(
            "Voting right {} transferred from {} to {}",
            right_id,
            ctx.accounts.from.owner,
            ctx.accounts.to.owner
        );

        emit!(RightTransferredEvent {
            right_id,
            from: ctx.accounts.from.owner,
            to: ctx.accounts.to.owner,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Number of voting rights held
    pub fn balance_of(ctx: Context<ReadHolder>) -> Result<u64> {
        Ok(ctx.accounts.holder.balance_of())
    }

    /// Voting right held at the given position
    pub fn voting_right_at(ctx: Context<ReadHolder>, index: u64) -> Result<u64> {
        ctx.accounts
            .holder
            .voting_right_at(index)
            .ok_or_else(|| error!(MembershipError::IndexOutOfBounds))
    }
}

// ============================================================================
// ACCOUNT STRUCTURES
// ============================================================================

/// Registry configuration account
#[account]
pub struct Registry {
    /// Authority allowed to mint new rights
    pub authority: Pubkey,
    /// Id assigned to the next minted right
    pub next_right_id: u64,
    /// Total number of rights ever minted
    pub total_rights: u64,
    /// PDA bump
    pub bump: u8,
}

impl Registry {
    pub const MAX_SIZE: usize = 8 +  // discriminator
        32 +                          // authority
        8 +                           // next_right_id
        8 +                           // total_rights
        1;                            // bump

    /// Reserve the next right id. Ids are never reused.
    pub fn issue(&mut self) -> Result<u64> {
        require!(
            self.next_right_id < MAX_TOTAL_RIGHTS,
            MembershipError::RegistryFull
        );
        let right_id = self.next_right_id;

        self.next_right_id = self
            .next_right_id
            .checked_add(1)
            .ok_or(MembershipError::Overflow)?;
        self.total_rights = self
            .total_rights
            .checked_add(1)
            .ok_or(MembershipError::Overflow)?;

        Ok(right_id)
    }
}

/// Voting rights held by one address
#[account]
pub struct Holder {
    /// Address the rights belong to
    pub owner: Pubkey,
    /// Held right ids, in acquisition order
    pub rights: Vec<u64>,
    /// PDA bump
    pub bump: u8,
}

impl Holder {
    pub const MAX_SIZE: usize = 8 +  // discriminator
        32 +                          // owner
        4 + 8 * MAX_RIGHTS_PER_HOLDER + // rights (vec prefix + data)
        1;                            // bump

    pub fn balance_of(&self) -> u64 {
        self.rights.len() as u64
    }

    pub fn voting_right_at(&self, index: u64) -> Option<u64> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.rights.get(i))
            .copied()
    }

    pub fn voting_rights(&self) -> impl Iterator<Item = u64> + '_ {
        self.rights.iter().copied()
    }

    pub fn holds(&self, right_id: u64) -> bool {
        self.rights.contains(&right_id)
    }

    pub fn receive(&mut self, right_id: u64) -> Result<()> {
        require!(
            self.rights.len() < MAX_RIGHTS_PER_HOLDER,
            MembershipError::HolderFull
        );
        self.rights.push(right_id);
        Ok(())
    }

    pub fn release(&mut self, right_id: u64) -> Result<()> {
        require!(self.holds(right_id), MembershipError::RightNotHeld);
        self.rights.retain(|&id| id != right_id);
        Ok(())
    }
}

// ============================================================================
// ACCOUNT CONTEXTS
// ============================================================================

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(
        init,
        payer = authority,
        space = Registry::MAX_SIZE,
        seeds = [b"registry"],
        bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct OpenHolder<'info> {
    #[account(
        init,
        payer = payer,
        space = Holder::MAX_SIZE,
        seeds = [b"holder", owner.key().as_ref()],
        bump
    )]
    pub holder: Account<'info, Holder>,

    /// CHECK: Any address may own voting rights
    pub owner: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct MintRight<'info> {
    #[account(
        mut,
        seeds = [b"registry"],
        bump = registry.bump,
        has_one = authority @ MembershipError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [b"holder", holder.owner.as_ref()],
        bump = holder.bump
    )]
    pub holder: Account<'info, Holder>,

    pub authority: Signer<'info>,
}

#[derive(Accounts)]
pub struct TransferRight<'info> {
    #[account(
        mut,
        seeds = [b"holder", owner.key().as_ref()],
        bump = from.bump,
        has_one = owner @ MembershipError::Unauthorized
    )]
    pub from: Account<'info, Holder>,

    #[account(
        mut,
        seeds = [b"holder", to.owner.as_ref()],
        bump = to.bump
    )]
    pub to: Account<'info, Holder>,

    pub owner: Signer<'info>,
}

#[derive(Accounts)]
pub struct ReadHolder<'info> {
    #[account(
        seeds = [b"holder", holder.owner.as_ref()],
        bump = holder.bump
    )]
    pub holder: Account<'info, Holder>,
}

// ============================================================================
// EVENTS
// ============================================================================

#[event]
pub struct RegistryInitializedEvent {
    pub authority: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct RightMintedEvent {
    pub right_id: u64,
    pub owner: Pubkey,
    pub total_rights: u64,
    pub timestamp: i64,
}

#[event]
pub struct RightTransferredEvent {
    pub right_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
    pub timestamp: i64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[error_code]
pub enum MembershipError {
    #[msg("Unauthorized: signer does not control this account")]
    Unauthorized,

    #[msg("Holder already carries the maximum number of voting rights")]
    HolderFull,

    #[msg("Registry has issued the maximum number of voting rights")]
    RegistryFull,

    #[msg("Voting right is not held by this holder")]
    RightNotHeld,

    #[msg("No voting right at this index")]
    IndexOutOfBounds,

    #[msg("Cannot transfer a voting right to the same holder")]
    SelfTransfer,

    #[msg("Arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder_with(rights: &[u64]) -> Holder {
        Holder {
            owner: Pubkey::new_unique(),
            rights: rights.to_vec(),
            bump: 255,
        }
    }

    #[test]
    fn test_registry_issues_sequential_ids() {
        let mut registry = Registry {
            authority: Pubkey::new_unique(),
            next_right_id: 0,
            total_rights: 0,
            bump: 255,
        };

        assert_eq!(registry.issue().unwrap(), 0);
        assert_eq!(registry.issue().unwrap(), 1);
        assert_eq!(registry.issue().unwrap(), 2);
        assert_eq!(registry.next_right_id, 3);
        assert_eq!(registry.total_rights, 3);
    }

    #[test]
    fn test_registry_stops_at_total_cap() {
        let mut registry = Registry {
            authority: Pubkey::new_unique(),
            next_right_id: 0,
            total_rights: 0,
            bump: 255,
        };

        for expected in 0..MAX_TOTAL_RIGHTS {
            assert_eq!(registry.issue().unwrap(), expected);
        }

        let err = registry.issue().unwrap_err();
        assert_eq!(err, MembershipError::RegistryFull.into());
        assert_eq!(registry.next_right_id, MAX_TOTAL_RIGHTS);
        assert_eq!(registry.total_rights, MAX_TOTAL_RIGHTS);
    }

    #[test]
    fn test_balance_and_enumeration() {
        let holder = holder_with(&[4, 9]);

        assert_eq!(holder.balance_of(), 2);
        assert_eq!(holder.voting_right_at(0), Some(4));
        assert_eq!(holder.voting_right_at(1), Some(9));
        assert_eq!(holder.voting_right_at(2), None);
        assert_eq!(holder.voting_rights().collect::<Vec<_>>(), vec![4, 9]);
    }

    #[test]
    fn test_empty_holder_has_no_balance() {
        let holder = holder_with(&[]);

        assert_eq!(holder.balance_of(), 0);
        assert_eq!(holder.voting_rights().count(), 0);
    }

    #[test]
    fn test_receive_until_full() {
        let mut holder = holder_with(&[]);

        for id in 0..MAX_RIGHTS_PER_HOLDER as u64 {
            holder.receive(id).unwrap();
        }

        let err = holder.receive(1_000).unwrap_err();
        assert_eq!(err, MembershipError::HolderFull.into());
        assert_eq!(holder.balance_of(), MAX_RIGHTS_PER_HOLDER as u64);
    }

    #[test]
    fn test_release_moves_right_out() {
        let mut from = holder_with(&[1, 2, 3]);
        let mut to = holder_with(&[]);

        from.release(2).unwrap();
        to.receive(2).unwrap();

        assert!(!from.holds(2));
        assert!(to.holds(2));
        assert_eq!(from.voting_rights().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_release_unknown_right() {
        let mut holder = holder_with(&[1]);

        let err = holder.release(7).unwrap_err();
        assert_eq!(err, MembershipError::RightNotHeld.into());
        assert_eq!(holder.balance_of(), 1);
    }

    #[test]
    fn test_holder_size_fits_full_capacity() {
        let holder = holder_with(&vec![u64::MAX; MAX_RIGHTS_PER_HOLDER]);
        let mut data = Vec::new();
        holder.serialize(&mut data).unwrap();

        assert!(8 + data.len() <= Holder::MAX_SIZE);
    }
}
