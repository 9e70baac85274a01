pub mod execute;
pub mod init;
pub mod market;
pub mod membership;
pub mod proposal;
pub mod propose;
pub mod treasury;
pub mod vote;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use crate::config::Config;
use crate::contracts::Contracts;
use crate::wallet;

/// Load the wallet and cluster from config and connect to the programs
pub(crate) fn connect() -> Result<(Config, Contracts)> {
    let config = Config::load()?;
    let keypair = wallet::load_wallet()?;
    let contracts = Contracts::connect(keypair, config.anchor_cluster()?)?;

    Ok((config, contracts))
}

/// Spinner shown while a transaction is in flight
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub(crate) fn print_transaction(config: &Config, signature: &str) {
    println!("  Transaction: {}", signature.bright_yellow());
    println!("  Explorer: {}", config.explorer_url(signature).bright_blue());
}
