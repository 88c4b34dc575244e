//! Binding for the fungible-token program.

use crate::abi::{self, ALLOWANCE, APPROVE, BALANCE_OF, DECIMALS, encode_call};
use crate::confirmation::TxHash;
use crate::error::LedgerError;
use crate::rpc::RpcProvider;
use amm_swap_domain::{Address, TokenAmount};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Operations of the token program.
///
/// Reads hit current ledger state. `approve` returns once the transaction
/// is submitted; confirm it through a `ReceiptSource` before relying on it.
#[async_trait]
pub trait TokenProgram: Send + Sync {
    /// Program address.
    fn address(&self) -> Address;

    /// Balance held by `owner`.
    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError>;

    /// Amount `spender` may move on behalf of `owner`.
    async fn allowance(&self, owner: Address, spender: Address)
    -> Result<TokenAmount, LedgerError>;

    /// Display decimal count.
    async fn decimals(&self) -> Result<u8, LedgerError>;

    /// Submits `approve(spender, amount)` from the bound signer.
    async fn approve(&self, spender: Address, amount: TokenAmount) -> Result<TxHash, LedgerError>;
}

/// ERC-20 style token reached over JSON-RPC.
pub struct Erc20Token {
    provider: Arc<RpcProvider>,
    address: Address,
    signer: Option<Address>,
}

impl Erc20Token {
    /// Creates a binding; `signer` is required for `approve`.
    pub fn new(provider: Arc<RpcProvider>, address: Address, signer: Option<Address>) -> Self {
        Self {
            provider,
            address,
            signer,
        }
    }
}

#[async_trait]
impl TokenProgram for Erc20Token {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError> {
        let out = self
            .provider
            .call(self.address, &encode_call(BALANCE_OF, &[owner.into()]))
            .await?;
        Ok(TokenAmount(abi::decode_uint(&out, 0)?))
    }

    async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<TokenAmount, LedgerError> {
        let out = self
            .provider
            .call(
                self.address,
                &encode_call(ALLOWANCE, &[owner.into(), spender.into()]),
            )
            .await?;
        let allowance = TokenAmount(abi::decode_uint(&out, 0)?);
        debug!(owner = %owner, spender = %spender, allowance = %allowance, "Read allowance");
        Ok(allowance)
    }

    async fn decimals(&self) -> Result<u8, LedgerError> {
        let out = self
            .provider
            .call(self.address, &encode_call(DECIMALS, &[]))
            .await?;
        abi::decode_u8(&out, 0)
    }

    async fn approve(&self, spender: Address, amount: TokenAmount) -> Result<TxHash, LedgerError> {
        let from = self.signer.ok_or(LedgerError::NoSigner)?;
        let data = encode_call(APPROVE, &[spender.into(), amount.into()]);
        let hash = self
            .provider
            .send_transaction(from, self.address, &data)
            .await?;
        info!(tx = %hash, spender = %spender, amount = %amount, "Approval submitted");
        Ok(hash)
    }
}
