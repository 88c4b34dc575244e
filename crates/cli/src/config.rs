//! Runtime configuration read from the environment.

use amm_swap_domain::Address;
use amm_swap_execution::prelude::OrchestratorConfig;
use amm_swap_protocols::prelude::{ProgramAddresses, RpcConfig};
use anyhow::{Context, Result};
use std::time::Duration;

/// Node endpoint.
pub const RPC_URL: &str = "AMM_RPC_URL";
/// Wallet endpoint. Takes precedence over [`RPC_URL`] when set.
pub const WALLET_URL: &str = "AMM_WALLET_URL";
/// Pool program address.
pub const POOL_ADDRESS: &str = "AMM_ADDRESS";
/// Token program address.
pub const TOKEN_ADDRESS: &str = "TOKEN_ADDRESS";
/// Confirmation wait bound in seconds.
pub const CONFIRMATION_TIMEOUT: &str = "AMM_CONFIRMATION_TIMEOUT_SECS";
/// Receipt poll interval in milliseconds.
pub const POLL_INTERVAL: &str = "AMM_POLL_INTERVAL_MS";

/// Everything the CLI needs to build a session.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// The one endpoint the session talks to: account authorization,
    /// reads, signed writes and receipts all go through it.
    pub rpc: RpcConfig,
    /// Program addresses; zero means not deployed.
    pub addresses: ProgramAddresses,
    /// Confirmation bounds.
    pub orchestrator: OrchestratorConfig,
}

impl CliConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `get`. Unset and empty values take defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        // A wallet endpoint carries all traffic, reads included.
        let mut rpc = RpcConfig::default();
        if let Some(url) = get(WALLET_URL).or_else(|| get(RPC_URL)) {
            rpc.url = url;
        }

        let address = |key: &str| -> Result<Address> {
            match get(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} is not a valid address: {v}")),
                None => Ok(Address::ZERO),
            }
        };
        let addresses = ProgramAddresses::new(address(POOL_ADDRESS)?, address(TOKEN_ADDRESS)?);

        let mut orchestrator = OrchestratorConfig::default();
        if let Some(v) = get(CONFIRMATION_TIMEOUT) {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("{CONFIRMATION_TIMEOUT} must be whole seconds: {v}"))?;
            orchestrator.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get(POLL_INTERVAL) {
            let ms: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("{POLL_INTERVAL} must be whole milliseconds: {v}"))?;
            orchestrator.poll_interval = Duration::from_millis(ms);
        }

        Ok(Self {
            rpc,
            addresses,
            orchestrator,
        })
    }
}
