use anchor_client::solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
};
use anchor_client::{Client, Cluster, Program};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};
use crate::errors::CliError;

pub fn dao_config_pda() -> Pubkey {
    Pubkey::find_program_address(&[b"dao_config"], &dao::ID).0
}

pub fn vault_pda() -> Pubkey {
    Pubkey::find_program_address(&[b"vault"], &dao::ID).0
}

pub fn proposal_pda(proposal_id: u64) -> Pubkey {
    Pubkey::find_program_address(&[b"proposal", &proposal_id.to_le_bytes()], &dao::ID).0
}

pub fn market_pda() -> Pubkey {
    Pubkey::find_program_address(&[b"market"], &marketplace::ID).0
}

pub fn market_treasury_pda() -> Pubkey {
    Pubkey::find_program_address(&[b"treasury"], &marketplace::ID).0
}

pub fn item_pda(item_id: u64) -> Pubkey {
    Pubkey::find_program_address(&[b"item", &item_id.to_le_bytes()], &marketplace::ID).0
}

pub fn registry_pda() -> Pubkey {
    Pubkey::find_program_address(&[b"registry"], &membership::ID).0
}

pub fn holder_pda(owner: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"holder", owner.as_ref()], &membership::ID).0
}

/// Handles to the three on-chain programs, signing with one wallet
pub struct Contracts {
    payer: Pubkey,
    dao: Program<Arc<Keypair>>,
    marketplace: Program<Arc<Keypair>>,
    membership: Program<Arc<Keypair>>,
}

impl Contracts {
    pub fn connect(keypair: Keypair, cluster: Cluster) -> Result<Self> {
        let payer = keypair.pubkey();
        debug!(%payer, cluster = %cluster, "connecting anchor client");

        let client = Client::new(cluster, Arc::new(keypair));

        Ok(Self {
            payer,
            dao: client.program(dao::ID)?,
            marketplace: client.program(marketplace::ID)?,
            membership: client.program(membership::ID)?,
        })
    }

    pub fn payer(&self) -> Pubkey {
        self.payer
    }

    // ------------------------------------------------------------------
    // DAO
    // ------------------------------------------------------------------

    pub async fn initialize_dao(&self) -> Result<String> {
        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::InitializeDao {
                dao_config: dao_config_pda(),
                vault: vault_pda(),
                owner: self.payer,
                system_program: system_program::ID,
            })
            .args(dao::instruction::InitializeDao {})
            .send()
            .await?;

        info!(%sig, "dao initialized");
        Ok(sig.to_string())
    }

    /// Create a proposal and return its index with the transaction signature
    pub async fn create_proposal(&self, item_id: u64) -> Result<(u64, String)> {
        let config = self.dao_config().await?;
        let proposal_id = config.proposal_count;
        self.item(item_id).await?;

        debug!(proposal_id, item_id, "sending create_proposal");

        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::CreateProposal {
                dao_config: dao_config_pda(),
                proposal: proposal_pda(proposal_id),
                holder: self.holder_account(&self.payer).await,
                item: item_pda(item_id),
                proposer: self.payer,
                system_program: system_program::ID,
            })
            .args(dao::instruction::CreateProposal { item_id })
            .send()
            .await?;

        info!(%sig, proposal_id, "proposal created");
        Ok((proposal_id, sig.to_string()))
    }

    pub async fn vote(&self, proposal_id: u64, vote: dao::Vote) -> Result<String> {
        self.proposal(proposal_id).await?;
        let holder = self
            .holder_account(&self.payer)
            .await
            .ok_or_else(|| CliError::NotMember(self.payer.to_string()))?;

        debug!(proposal_id, ?vote, "sending vote_on_proposal");

        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::VoteOnProposal {
                proposal: proposal_pda(proposal_id),
                holder: Some(holder),
                voter: self.payer,
            })
            .args(dao::instruction::VoteOnProposal { proposal_id, vote })
            .send()
            .await?;

        info!(%sig, proposal_id, "vote cast");
        Ok(sig.to_string())
    }

    pub async fn execute(&self, proposal_id: u64) -> Result<String> {
        let proposal = self.proposal(proposal_id).await?;

        debug!(proposal_id, item_id = proposal.item_id, "sending execute_proposal");

        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::ExecuteProposal {
                dao_config: dao_config_pda(),
                proposal: proposal_pda(proposal_id),
                holder: self.holder_account(&self.payer).await,
                vault: vault_pda(),
                market: market_pda(),
                item: item_pda(proposal.item_id),
                market_treasury: market_treasury_pda(),
                executor: self.payer,
                marketplace_program: marketplace::ID,
                system_program: system_program::ID,
            })
            .args(dao::instruction::ExecuteProposal { proposal_id })
            .send()
            .await?;

        info!(%sig, proposal_id, "proposal executed");
        Ok(sig.to_string())
    }

    pub async fn deposit(&self, amount: u64) -> Result<String> {
        if amount == 0 {
            return Err(CliError::InvalidAmount(amount).into());
        }

        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::Deposit {
                dao_config: dao_config_pda(),
                vault: vault_pda(),
                depositor: self.payer,
                system_program: system_program::ID,
            })
            .args(dao::instruction::Deposit { amount })
            .send()
            .await?;

        info!(%sig, amount, "deposit sent");
        Ok(sig.to_string())
    }

    pub async fn withdraw(&self) -> Result<String> {
        let sig = self
            .dao
            .request()
            .accounts(dao::accounts::Withdraw {
                dao_config: dao_config_pda(),
                vault: vault_pda(),
                owner: self.payer,
                system_program: system_program::ID,
            })
            .args(dao::instruction::Withdraw {})
            .send()
            .await?;

        info!(%sig, "vault withdrawn");
        Ok(sig.to_string())
    }

    pub async fn dao_config(&self) -> Result<dao::DaoConfig> {
        self.dao
            .account::<dao::DaoConfig>(dao_config_pda())
            .await
            .map_err(|e| CliError::SolanaRpcError(format!("DAO not initialized: {}", e)).into())
    }

    pub async fn proposal(&self, proposal_id: u64) -> Result<dao::Proposal> {
        self.dao
            .account::<dao::Proposal>(proposal_pda(proposal_id))
            .await
            .map_err(|_| CliError::ProposalNotFound(proposal_id).into())
    }

    pub async fn vault_balance(&self) -> Result<u64> {
        let balance = self.dao.rpc().get_balance(&vault_pda()).await?;
        Ok(balance)
    }

    /// Vault lamports the DAO can actually spend, net of its rent reserve
    pub async fn vault_spendable(&self) -> Result<u64> {
        let rpc = self.dao.rpc();
        let balance = rpc.get_balance(&vault_pda()).await?;
        let reserve = rpc.get_minimum_balance_for_rent_exemption(0).await?;
        debug!(balance, reserve, "vault balance");

        Ok(dao::spendable_balance(balance, reserve))
    }

    // ------------------------------------------------------------------
    // Marketplace
    // ------------------------------------------------------------------

    pub async fn initialize_market(&self) -> Result<String> {
        let sig = self
            .marketplace
            .request()
            .accounts(marketplace::accounts::InitializeMarket {
                market: market_pda(),
                treasury: market_treasury_pda(),
                authority: self.payer,
                system_program: system_program::ID,
            })
            .args(marketplace::instruction::InitializeMarket {})
            .send()
            .await?;

        info!(%sig, "market initialized");
        Ok(sig.to_string())
    }

    pub async fn list_item(&self, item_id: u64) -> Result<String> {
        let sig = self
            .marketplace
            .request()
            .accounts(marketplace::accounts::ListItem {
                market: market_pda(),
                item: item_pda(item_id),
                authority: self.payer,
                system_program: system_program::ID,
            })
            .args(marketplace::instruction::ListItem { item_id })
            .send()
            .await?;

        info!(%sig, item_id, "item listed");
        Ok(sig.to_string())
    }

    pub async fn item(&self, item_id: u64) -> Result<marketplace::Item> {
        self.marketplace
            .account::<marketplace::Item>(item_pda(item_id))
            .await
            .map_err(|_| CliError::ItemNotListed(item_id).into())
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub async fn initialize_registry(&self) -> Result<String> {
        let sig = self
            .membership
            .request()
            .accounts(membership::accounts::InitializeRegistry {
                registry: registry_pda(),
                authority: self.payer,
                system_program: system_program::ID,
            })
            .args(membership::instruction::InitializeRegistry {})
            .send()
            .await?;

        info!(%sig, "registry initialized");
        Ok(sig.to_string())
    }

    pub async fn open_holder(&self, owner: &Pubkey) -> Result<String> {
        let sig = self
            .membership
            .request()
            .accounts(membership::accounts::OpenHolder {
                holder: holder_pda(owner),
                owner: *owner,
                payer: self.payer,
                system_program: system_program::ID,
            })
            .args(membership::instruction::OpenHolder {})
            .send()
            .await?;

        info!(%sig, %owner, "holder opened");
        Ok(sig.to_string())
    }

    pub async fn mint_right(&self, to: &Pubkey) -> Result<String> {
        let sig = self
            .membership
            .request()
            .accounts(membership::accounts::MintRight {
                registry: registry_pda(),
                holder: holder_pda(to),
                authority: self.payer,
            })
            .args(membership::instruction::MintRight {})
            .send()
            .await?;

        info!(%sig, %to, "voting right minted");
        Ok(sig.to_string())
    }

    pub async fn transfer_right(&self, right_id: u64, to: &Pubkey) -> Result<String> {
        let sig = self
            .membership
            .request()
            .accounts(membership::accounts::TransferRight {
                from: holder_pda(&self.payer),
                to: holder_pda(to),
                owner: self.payer,
            })
            .args(membership::instruction::TransferRight { right_id })
            .send()
            .await?;

        info!(%sig, right_id, %to, "voting right transferred");
        Ok(sig.to_string())
    }

    pub async fn holder(&self, owner: &Pubkey) -> Option<membership::Holder> {
        self.membership
            .account::<membership::Holder>(holder_pda(owner))
            .await
            .ok()
    }

    /// Holder address to pass to the DAO, or `None` when no record exists
    async fn holder_account(&self, owner: &Pubkey) -> Option<Pubkey> {
        self.holder(owner).await.map(|_| holder_pda(owner))
    }
}

/// Format a lamport amount as SOL
pub fn format_sol(lamports: u64) -> String {
    let sol = lamports as f64 / 1_000_000_000.0;
    format!("{:.4}", sol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_are_unique() {
        assert_ne!(dao::ID, marketplace::ID);
        assert_ne!(dao::ID, membership::ID);
        assert_ne!(marketplace::ID, membership::ID);
    }

    #[test]
    fn test_proposal_pdas_are_distinct_per_index() {
        assert_eq!(proposal_pda(0), proposal_pda(0));
        assert_ne!(proposal_pda(0), proposal_pda(1));
    }

    #[test]
    fn test_holder_pda_depends_on_owner() {
        let alice = Keypair::new().pubkey();
        let bob = Keypair::new().pubkey();

        assert_eq!(holder_pda(&alice), holder_pda(&alice));
        assert_ne!(holder_pda(&alice), holder_pda(&bob));
    }

    #[test]
    fn test_singleton_pdas_are_off_curve() {
        for pda in [
            dao_config_pda(),
            vault_pda(),
            market_pda(),
            market_treasury_pda(),
            registry_pda(),
        ] {
            assert!(!pda.is_on_curve());
        }
    }

    #[test]
    fn test_item_pda_matches_program_seeds() {
        let (expected, _) = Pubkey::find_program_address(
            &[b"item", &7u64.to_le_bytes()],
            &marketplace::ID,
        );
        assert_eq!(item_pda(7), expected);
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(1_000_000_000), "1.0000");
        assert_eq!(format_sol(marketplace::ITEM_PRICE), "0.1000");
        assert_eq!(format_sol(0), "0.0000");
    }
}
