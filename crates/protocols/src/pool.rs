//! Binding for the pool program.

use crate::abi::{self, ADD_LIQUIDITY, GET_RESERVES, SWAP_EXACT_TOKENS_FOR_TOKENS, encode_call};
use crate::confirmation::TxHash;
use crate::error::LedgerError;
use crate::rpc::RpcProvider;
use amm_swap_domain::{Address, PoolReserves, TokenAmount};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Operations of the two-asset pool program.
///
/// Writes return once submitted; they are not evidence of effect until
/// confirmed.
#[async_trait]
pub trait PoolProgram: Send + Sync {
    /// Program address; the spender for token approvals.
    fn address(&self) -> Address;

    /// Current reserves.
    async fn get_reserves(&self) -> Result<PoolReserves, LedgerError>;

    /// Submits `swapExactTokensForTokens(amount_in, min_amount_out)`.
    async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: TokenAmount,
        min_amount_out: TokenAmount,
    ) -> Result<TxHash, LedgerError>;

    /// Submits `addLiquidity(amount_a, amount_b)`.
    async fn add_liquidity(
        &self,
        amount_a: TokenAmount,
        amount_b: TokenAmount,
    ) -> Result<TxHash, LedgerError>;
}

/// AMM pool reached over JSON-RPC.
pub struct AmmPool {
    provider: Arc<RpcProvider>,
    address: Address,
    signer: Option<Address>,
}

impl AmmPool {
    /// Creates a binding; `signer` is required for writes.
    pub fn new(provider: Arc<RpcProvider>, address: Address, signer: Option<Address>) -> Self {
        Self {
            provider,
            address,
            signer,
        }
    }

    async fn send(&self, data: Vec<u8>) -> Result<TxHash, LedgerError> {
        let from = self.signer.ok_or(LedgerError::NoSigner)?;
        self.provider
            .send_transaction(from, self.address, &data)
            .await
    }
}

#[async_trait]
impl PoolProgram for AmmPool {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_reserves(&self) -> Result<PoolReserves, LedgerError> {
        let out = self
            .provider
            .call(self.address, &encode_call(GET_RESERVES, &[]))
            .await?;
        Ok(PoolReserves::new(
            TokenAmount(abi::decode_uint(&out, 0)?),
            TokenAmount(abi::decode_uint(&out, 1)?),
        ))
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: TokenAmount,
        min_amount_out: TokenAmount,
    ) -> Result<TxHash, LedgerError> {
        let hash = self
            .send(encode_call(
                SWAP_EXACT_TOKENS_FOR_TOKENS,
                &[amount_in.into(), min_amount_out.into()],
            ))
            .await?;
        info!(
            tx = %hash,
            amount_in = %amount_in,
            min_amount_out = %min_amount_out,
            "Swap submitted"
        );
        Ok(hash)
    }

    async fn add_liquidity(
        &self,
        amount_a: TokenAmount,
        amount_b: TokenAmount,
    ) -> Result<TxHash, LedgerError> {
        let hash = self
            .send(encode_call(
                ADD_LIQUIDITY,
                &[amount_a.into(), amount_b.into()],
            ))
            .await?;
        info!(tx = %hash, amount_a = %amount_a, amount_b = %amount_b, "Liquidity submitted");
        Ok(hash)
    }
}
