//! Signer-bound program proxies.

use crate::confirmation::ReceiptSource;
use crate::pool::{AmmPool, PoolProgram};
use crate::rpc::RpcProvider;
use crate::token::{Erc20Token, TokenProgram};
use amm_swap_domain::Address;
use std::sync::Arc;

/// Addresses of the two ledger programs, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgramAddresses {
    /// Pool program.
    pub pool: Address,
    /// Token program (the pool's token A).
    pub token: Address,
}

impl ProgramAddresses {
    /// Creates a new address pair.
    #[must_use]
    pub fn new(pool: Address, token: Address) -> Self {
        Self { pool, token }
    }

    /// False while the pool address is the zero placeholder.
    #[must_use]
    pub fn pool_configured(&self) -> bool {
        !self.pool.is_zero()
    }

    /// False while the token address is the zero placeholder.
    #[must_use]
    pub fn token_configured(&self) -> bool {
        !self.token.is_zero()
    }
}

/// Token and pool proxies plus the receipt source used to confirm their writes.
#[derive(Clone)]
pub struct ProgramBindings {
    /// Token program.
    pub token: Arc<dyn TokenProgram>,
    /// Pool program.
    pub pool: Arc<dyn PoolProgram>,
    /// Receipts for writes submitted through either program.
    pub receipts: Arc<dyn ReceiptSource>,
}

/// Produces program bindings, optionally bound to a signer.
pub trait LedgerConnector: Send + Sync {
    /// Configured program addresses.
    fn addresses(&self) -> ProgramAddresses;

    /// Binds both programs. Writes require `signer`.
    fn bind(&self, signer: Option<Address>) -> ProgramBindings;
}

/// Connector over a JSON-RPC provider.
pub struct RpcConnector {
    provider: Arc<RpcProvider>,
    addresses: ProgramAddresses,
}

impl RpcConnector {
    /// Creates a connector.
    pub fn new(provider: Arc<RpcProvider>, addresses: ProgramAddresses) -> Self {
        Self {
            provider,
            addresses,
        }
    }
}

impl LedgerConnector for RpcConnector {
    fn addresses(&self) -> ProgramAddresses {
        self.addresses
    }

    fn bind(&self, signer: Option<Address>) -> ProgramBindings {
        ProgramBindings {
            token: Arc::new(Erc20Token::new(
                self.provider.clone(),
                self.addresses.token,
                signer,
            )),
            pool: Arc::new(AmmPool::new(
                self.provider.clone(),
                self.addresses.pool,
                signer,
            )),
            receipts: self.provider.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::ScriptedTransport;

    #[test]
    fn test_zero_addresses_are_unconfigured() {
        let addresses = ProgramAddresses::default();
        assert!(!addresses.pool_configured());
        assert!(!addresses.token_configured());
    }

    #[test]
    fn test_bind_uses_configured_addresses() {
        let pool: Address = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512".parse().unwrap();
        let token: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
        let provider = Arc::new(RpcProvider::new(Arc::new(ScriptedTransport::default())));
        let connector = RpcConnector::new(provider, ProgramAddresses::new(pool, token));

        let bindings = connector.bind(None);
        assert_eq!(bindings.pool.address(), pool);
        assert_eq!(bindings.token.address(), token);
        assert!(connector.addresses().pool_configured());
    }
}
