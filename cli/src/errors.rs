use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Wallet not found. Run 'dao-cli wallet create' first")]
    WalletNotFound,

    #[error("Invalid cluster name: {0}. Valid options: localnet, devnet, mainnet-beta")]
    InvalidCluster(String),

    #[error("Invalid amount: {0}. Must be greater than zero")]
    InvalidAmount(u64),

    #[error("No voting rights found for {0}. Ask the registry authority to mint one")]
    NotMember(String),

    #[error("Proposal {0} does not exist")]
    ProposalNotFound(u64),

    #[error("Item {0} is not listed on the marketplace")]
    ItemNotListed(u64),

    #[error("Solana RPC error: {0}")]
    SolanaRpcError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_not_found_error() {
        let err = CliError::WalletNotFound;
        assert_eq!(
            err.to_string(),
            "Wallet not found. Run 'dao-cli wallet create' first"
        );
    }

    #[test]
    fn test_invalid_cluster_error() {
        let err = CliError::InvalidCluster("testnet".to_string());
        assert!(err.to_string().contains("testnet"));
        assert!(err.to_string().contains("localnet"));
    }

    #[test]
    fn test_invalid_amount_error() {
        let err = CliError::InvalidAmount(0);
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_proposal_not_found_error() {
        let err = CliError::ProposalNotFound(42);
        assert_eq!(err.to_string(), "Proposal 42 does not exist");
    }

    #[test]
    fn test_item_not_listed_error() {
        let err = CliError::ItemNotListed(7);
        assert!(err.to_string().contains("Item 7"));
    }
}
