use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

declare_id!("G31uQhQar5pi4739nSAy9aQv3xCBkUAifCcGzRPZUusY");

/// Fixed price of every item (0.1 SOL)
pub const ITEM_PRICE: u64 = 100_000_000;

#[program]
pub mod marketplace {
    use super::*;

    /// Initialize the market (one-time setup by deployer)
    pub fn initialize_market(ctx: Context<InitializeMarket>) -> Result<()> {
        let market = &mut ctx.accounts.market;

        market.authority = ctx.accounts.authority.key();
        market.items_listed = 0;
        market.total_sales = 0;
        market.bump = ctx.bumps.market;
        market.treasury_bump = ctx.bumps.treasury;

        msg!("Market initialized: price={} lamports", ITEM_PRICE);

        Ok(())
    }

    /// Create the on-chain record for an item (authority only)
    pub fn list_item(ctx: Context<ListItem>, item_id: u64) -> Result<()> {
        let market = &mut ctx.accounts.market;
        let item = &mut ctx.accounts.item;

        item.item_id = item_id;
        item.holder = None;
        item.bump = ctx.bumps.item;

        market.items_listed = market
            .items_listed
            .checked_add(1)
            .ok_or(MarketplaceError::Overflow)?;

        msg!("Item {} listed", item_id);

        emit!(ItemListedEvent {
            item_id,
            price: ITEM_PRICE,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Current per-item price
    pub fn get_price(_ctx: Context<GetPrice>) -> Result<u64> {
        Ok(Market::price())
    }

    /// Whether nobody holds the item yet
    pub fn available(ctx: Context<ReadItem>, _item_id: u64) -> Result<bool> {
        Ok(ctx.accounts.item.is_available())
    }

    /// Buy an item for exactly the fixed price
    ///
    /// An item that already has a holder can be bought again; the new buyer
    /// simply replaces the recorded holder.
    pub fn purchase(ctx: Context<Purchase>, item_id: u64, payment: u64) -> Result<()> {
        Market::check_payment(payment)?;

        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.buyer.to_account_info(),
                    to: ctx.accounts.treasury.to_account_info(),
                },
            ),
            payment,
        )?;

        let buyer = ctx.accounts.buyer.key();
        let previous_holder = ctx.accounts.item.record_holder(buyer);

        let market = &mut ctx.accounts.market;
        market.total_sales = market
            .total_sales
            .checked_add(1)
            .ok_or(MarketplaceError::Overflow)?;

        msg!("Item {} purchased by {} for {} lamports", item_id, buyer, payment);

        emit!(ItemPurchasedEvent {
            item_id,
            buyer,
            previous_holder,
            payment,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}

// ============================================================================
// ACCOUNT STRUCTURES
// ============================================================================

/// Market configuration account
#[account]
pub struct Market {
    /// Authority allowed to list items
    pub authority: Pubkey,
    /// Number of listed items
    pub items_listed: u64,
    /// Number of completed purchases
    pub total_sales: u64,
    /// PDA bump
    pub bump: u8,
    /// Treasury PDA bump
    pub treasury_bump: u8,
}

impl Market {
    pub const MAX_SIZE: usize = 8 +  // discriminator
        32 +                          // authority
        8 +                           // items_listed
        8 +                           // total_sales
        1 +                           // bump
        1;                            // treasury_bump

    pub fn price() -> u64 {
        ITEM_PRICE
    }

    pub fn check_payment(payment: u64) -> Result<()> {
        require_eq!(payment, Self::price(), MarketplaceError::WrongPayment);
        Ok(())
    }
}

/// A listed item and who holds it
#[account]
pub struct Item {
    pub item_id: u64,
    pub holder: Option<Pubkey>,
    pub bump: u8,
}

impl Item {
    pub const MAX_SIZE: usize = 8 +  // discriminator
        8 +                           // item_id
        1 + 32 +                      // holder (Option<Pubkey>)
        1;                            // bump

    pub fn is_available(&self) -> bool {
        self.holder.is_none()
    }

    /// Record a new holder, returning the one it replaces.
    pub fn record_holder(&mut self, buyer: Pubkey) -> Option<Pubkey> {
        self.holder.replace(buyer)
    }
}

// ============================================================================
// ACCOUNT CONTEXTS
// ============================================================================

#[derive(Accounts)]
pub struct InitializeMarket<'info> {
    #[account(
        init,
        payer = authority,
        space = Market::MAX_SIZE,
        seeds = [b"market"],
        bump
    )]
    pub market: Account<'info, Market>,

    /// Receives item payments
    #[account(seeds = [b"treasury"], bump)]
    pub treasury: SystemAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(item_id: u64)]
pub struct ListItem<'info> {
    #[account(
        mut,
        seeds = [b"market"],
        bump = market.bump,
        has_one = authority @ MarketplaceError::Unauthorized
    )]
    pub market: Account<'info, Market>,

    #[account(
        init,
        payer = authority,
        space = Item::MAX_SIZE,
        seeds = [b"item", item_id.to_le_bytes().as_ref()],
        bump
    )]
    pub item: Account<'info, Item>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct GetPrice<'info> {
    #[account(seeds = [b"market"], bump = market.bump)]
    pub market: Account<'info, Market>,
}

#[derive(Accounts)]
#[instruction(item_id: u64)]
pub struct ReadItem<'info> {
    #[account(
        seeds = [b"item", item_id.to_le_bytes().as_ref()],
        bump = item.bump
    )]
    pub item: Account<'info, Item>,
}

#[derive(Accounts)]
#[instruction(item_id: u64)]
pub struct Purchase<'info> {
    #[account(
        mut,
        seeds = [b"market"],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [b"item", item_id.to_le_bytes().as_ref()],
        bump = item.bump
    )]
    pub item: Account<'info, Item>,

    #[account(
        mut,
        seeds = [b"treasury"],
        bump = market.treasury_bump
    )]
    pub treasury: SystemAccount<'info>,

    #[account(mut)]
    pub buyer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ============================================================================
// EVENTS
// ============================================================================

#[event]
pub struct ItemListedEvent {
    pub item_id: u64,
    pub price: u64,
    pub timestamp: i64,
}

#[event]
pub struct ItemPurchasedEvent {
    pub item_id: u64,
    pub buyer: Pubkey,
    pub previous_holder: Option<Pubkey>,
    pub payment: u64,
    pub timestamp: i64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[error_code]
pub enum MarketplaceError {
    #[msg("Payment must equal the item price")]
    WrongPayment,

    #[msg("Unauthorized: Only the market authority can perform this action")]
    Unauthorized,

    #[msg("Arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_is_fixed() {
        assert_eq!(Market::price(), 100_000_000);
        assert_eq!(Market::price(), Market::price());
    }

    #[test]
    fn test_exact_payment_accepted() {
        assert!(Market::check_payment(ITEM_PRICE).is_ok());
    }

    #[test]
    fn test_wrong_payment_rejected() {
        for payment in [0, ITEM_PRICE - 1, ITEM_PRICE + 1, u64::MAX] {
            let err = Market::check_payment(payment).unwrap_err();
            assert_eq!(err, MarketplaceError::WrongPayment.into());
        }
    }

    #[test]
    fn test_new_item_is_available() {
        let item = Item {
            item_id: 7,
            holder: None,
            bump: 255,
        };

        assert!(item.is_available());
    }

    #[test]
    fn test_purchase_records_holder() {
        let mut item = Item {
            item_id: 7,
            holder: None,
            bump: 255,
        };
        let buyer = Pubkey::new_unique();

        assert_eq!(item.record_holder(buyer), None);
        assert_eq!(item.holder, Some(buyer));
        assert!(!item.is_available());
    }

    #[test]
    fn test_repurchase_replaces_holder() {
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        let mut item = Item {
            item_id: 7,
            holder: Some(first),
            bump: 255,
        };

        assert_eq!(item.record_holder(second), Some(first));
        assert_eq!(item.holder, Some(second));
    }
}
