use anchor_client::Cluster;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::CliError;

/// Configuration for the DAO CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cluster: String,
    pub wallet_path: Option<PathBuf>,
    pub rpc_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: "devnet".to_string(),
            wallet_path: None,
            rpc_url: "https://api.devnet.solana.com".to_string(),
        }
    }
}

impl Config {
    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
        Ok(config_dir.join("dao-cli").join("config.toml"))
    }

    /// Load config from the default location, creating it on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Switch to a known cluster and its public RPC endpoint
    pub fn set_cluster(&mut self, cluster: &str) -> Result<()> {
        let rpc_url = match cluster {
            "localnet" => "http://127.0.0.1:8899",
            "devnet" => "https://api.devnet.solana.com",
            "mainnet-beta" => "https://api.mainnet-beta.solana.com",
            _ => return Err(CliError::InvalidCluster(cluster.to_string()).into()),
        };

        self.cluster = cluster.to_string();
        self.rpc_url = rpc_url.to_string();

        Ok(())
    }

    /// Cluster the anchor client should talk to
    pub fn anchor_cluster(&self) -> Result<Cluster> {
        match self.cluster.as_str() {
            "localnet" => Ok(Cluster::Localnet),
            "devnet" => Ok(Cluster::Devnet),
            "mainnet-beta" => Ok(Cluster::Mainnet),
            other => Err(CliError::InvalidCluster(other.to_string()).into()),
        }
    }

    /// Explorer link for a transaction signature
    pub fn explorer_url(&self, signature: &str) -> String {
        match self.cluster.as_str() {
            "mainnet-beta" => format!("https://explorer.solana.com/tx/{}", signature),
            "localnet" => format!(
                "https://explorer.solana.com/tx/{}?cluster=custom&customUrl={}",
                signature, self.rpc_url
            ),
            cluster => format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                signature, cluster
            ),
        }
    }
}

/// Set cluster configuration
pub fn set_cluster(cluster: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set_cluster(cluster)?;
    config.save()?;

    println!("{}", format!("✓ Cluster set to: {}", cluster).green());
    println!("  RPC URL: {}", config.rpc_url);

    Ok(())
}

/// Show current configuration
pub fn show() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "DAO CLI Configuration".bright_cyan().bold());
    println!("  Cluster:      {}", config.cluster.bright_yellow());
    println!("  RPC URL:      {}", config.rpc_url);
    println!("  Wallet Path:  {}",
        config.wallet_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not set".to_string())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert!(config.wallet_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            cluster = "localnet"
            rpc_url = "http://127.0.0.1:8899"
            wallet_path = "/tmp/wallet.json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster, "localnet");
        assert_eq!(config.wallet_path, Some(PathBuf::from("/tmp/wallet.json")));
    }

    #[test]
    fn test_set_cluster_localnet() {
        let mut config = Config::default();
        config.set_cluster("localnet").unwrap();

        assert_eq!(config.cluster, "localnet");
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
    }

    #[test]
    fn test_set_cluster_mainnet() {
        let mut config = Config::default();
        config.set_cluster("mainnet-beta").unwrap();

        assert_eq!(config.cluster, "mainnet-beta");
        assert_eq!(config.rpc_url, "https://api.mainnet-beta.solana.com");
    }

    #[test]
    fn test_set_cluster_invalid() {
        let mut config = Config::default();
        let result = config.set_cluster("testnet-2");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid cluster"));
        assert_eq!(config.cluster, "devnet");
    }

    #[test]
    fn test_anchor_cluster_mapping() {
        let mut config = Config::default();
        assert_eq!(config.anchor_cluster().unwrap(), Cluster::Devnet);

        config.set_cluster("localnet").unwrap();
        assert_eq!(config.anchor_cluster().unwrap(), Cluster::Localnet);

        config.cluster = "unknown".to_string();
        assert!(config.anchor_cluster().is_err());
    }

    #[test]
    fn test_explorer_url() {
        let mut config = Config::default();
        assert_eq!(
            config.explorer_url("abc"),
            "https://explorer.solana.com/tx/abc?cluster=devnet"
        );

        config.set_cluster("mainnet-beta").unwrap();
        assert_eq!(config.explorer_url("abc"), "https://explorer.solana.com/tx/abc");
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.cluster, "devnet");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set_cluster("localnet").unwrap();
        config.wallet_path = Some(dir.path().join("wallet.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cluster, "localnet");
        assert_eq!(loaded.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(loaded.wallet_path, config.wallet_path);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cluster = [not toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
