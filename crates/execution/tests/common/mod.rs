//! In-memory ledger used by the orchestration tests.

#![allow(dead_code)]

use amm_swap_domain::{Address, PoolReserves, TokenAmount};
use amm_swap_execution::prelude::*;
use amm_swap_protocols::prelude::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const OWNER: Address = Address::from_bytes([0x11; 20]);
pub const POOL: Address = Address::from_bytes([0x22; 20]);
pub const TOKEN: Address = Address::from_bytes([0x33; 20]);

/// One ledger interaction, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    BalanceOf(Address),
    Allowance(Address, Address),
    Decimals,
    Approve(Address, TokenAmount),
    GetReserves,
    Swap(TokenAmount, TokenAmount),
    AddLiquidity(TokenAmount, TokenAmount),
    Receipt(TxHash),
}

/// How a submitted write resolves once polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mining {
    Confirm,
    Revert,
    Never,
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    Approve(TokenAmount),
    Swap(TokenAmount),
    Deposit(TokenAmount, TokenAmount),
}

#[derive(Debug)]
struct State {
    allowance: TokenAmount,
    balance: TokenAmount,
    reserves: PoolReserves,
    decimals: Option<u8>,
    reserves_fail: bool,
    approve_error: Option<LedgerError>,
    approve_mining: Mining,
    write_error: Option<LedgerError>,
    write_mining: Mining,
    pending: HashMap<TxHash, (Effect, Mining)>,
    next_tx: u64,
    calls: Vec<Call>,
}

/// Token program, pool program and receipt source over shared state.
#[derive(Debug)]
pub struct FakeLedger {
    state: Mutex<State>,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                allowance: TokenAmount::zero(),
                balance: TokenAmount::from(10_000u64),
                reserves: PoolReserves::new(TokenAmount::from(1_000_000u64), TokenAmount::from(2_000_000u64)),
                decimals: Some(18),
                reserves_fail: false,
                approve_error: None,
                approve_mining: Mining::Confirm,
                write_error: None,
                write_mining: Mining::Confirm,
                pending: HashMap::new(),
                next_tx: 1,
                calls: Vec::new(),
            }),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_allowance(&self, v: u64) {
        self.state().allowance = TokenAmount::from(v);
    }

    pub fn set_decimals(&self, d: Option<u8>) {
        self.state().decimals = d;
    }

    pub fn fail_reserves(&self, fail: bool) {
        self.state().reserves_fail = fail;
    }

    pub fn fail_approve(&self, e: LedgerError) {
        self.state().approve_error = Some(e);
    }

    pub fn mine_approvals(&self, m: Mining) {
        self.state().approve_mining = m;
    }

    pub fn fail_writes(&self, e: LedgerError) {
        self.state().write_error = Some(e);
    }

    pub fn clear_write_failure(&self) {
        self.state().write_error = None;
    }

    pub fn mine_writes(&self, m: Mining) {
        self.state().write_mining = m;
    }

    pub fn allowance(&self) -> TokenAmount {
        self.state().allowance
    }

    pub fn balance(&self) -> TokenAmount {
        self.state().balance
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Calls other than receipt polls.
    pub fn requests(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Receipt(_)))
            .collect()
    }

    pub fn approve_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Approve(..)))
            .count()
    }

    fn submit(&self, state: &mut State, effect: Effect, mining: Mining) -> TxHash {
        let n = state.next_tx;
        state.next_tx += 1;
        let hash: TxHash = format!("0x{n:064x}").parse().unwrap();
        state.pending.insert(hash, (effect, mining));
        hash
    }
}

#[async_trait]
impl TokenProgram for FakeLedger {
    fn address(&self) -> Address {
        TOKEN
    }

    async fn balance_of(&self, owner: Address) -> Result<TokenAmount, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::BalanceOf(owner));
        Ok(s.balance)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<TokenAmount, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::Allowance(owner, spender));
        Ok(s.allowance)
    }

    async fn decimals(&self) -> Result<u8, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::Decimals);
        s.decimals
            .ok_or_else(|| LedgerError::Rpc { code: -32000, message: "decimals unavailable".into() })
    }

    async fn approve(&self, spender: Address, amount: TokenAmount) -> Result<TxHash, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::Approve(spender, amount));
        if let Some(e) = s.approve_error.clone() {
            return Err(e);
        }
        let mining = s.approve_mining;
        Ok(self.submit(&mut s, Effect::Approve(amount), mining))
    }
}

#[async_trait]
impl PoolProgram for FakeLedger {
    fn address(&self) -> Address {
        POOL
    }

    async fn get_reserves(&self) -> Result<PoolReserves, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::GetReserves);
        if s.reserves_fail {
            return Err(LedgerError::Transport("connection refused".into()));
        }
        Ok(s.reserves)
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: TokenAmount,
        min_amount_out: TokenAmount,
    ) -> Result<TxHash, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::Swap(amount_in, min_amount_out));
        if let Some(e) = s.write_error.clone() {
            return Err(e);
        }
        let mining = s.write_mining;
        Ok(self.submit(&mut s, Effect::Swap(amount_in), mining))
    }

    async fn add_liquidity(
        &self,
        amount_a: TokenAmount,
        amount_b: TokenAmount,
    ) -> Result<TxHash, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::AddLiquidity(amount_a, amount_b));
        if let Some(e) = s.write_error.clone() {
            return Err(e);
        }
        let mining = s.write_mining;
        Ok(self.submit(&mut s, Effect::Deposit(amount_a, amount_b), mining))
    }
}

#[async_trait]
impl ReceiptSource for FakeLedger {
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, LedgerError> {
        let mut s = self.state();
        s.calls.push(Call::Receipt(hash));
        let Some((effect, mining)) = s.pending.get(&hash).copied() else {
            return Ok(None);
        };
        let success = match mining {
            Mining::Never => return Ok(None),
            Mining::Revert => false,
            Mining::Confirm => true,
        };
        s.pending.remove(&hash);
        if success {
            match effect {
                Effect::Approve(amount) => s.allowance = amount,
                Effect::Swap(amount) => {
                    s.allowance = s.allowance.saturating_sub(amount);
                    s.balance = s.balance.saturating_sub(amount);
                    s.reserves.reserve_a = s.reserves.reserve_a.checked_add(amount).unwrap();
                }
                Effect::Deposit(a, b) => {
                    s.allowance = s.allowance.saturating_sub(a);
                    s.balance = s.balance.saturating_sub(a);
                    s.reserves.reserve_a = s.reserves.reserve_a.checked_add(a).unwrap();
                    s.reserves.reserve_b = s.reserves.reserve_b.checked_add(b).unwrap();
                }
            }
        }
        Ok(Some(TransactionReceipt {
            hash,
            block_number: Some(s.next_tx),
            success,
            gas_used: Some(21_000),
        }))
    }
}

pub struct FakeConnector {
    pub ledger: Arc<FakeLedger>,
    pub addresses: ProgramAddresses,
}

impl LedgerConnector for FakeConnector {
    fn addresses(&self) -> ProgramAddresses {
        self.addresses
    }

    fn bind(&self, _signer: Option<Address>) -> ProgramBindings {
        ProgramBindings {
            token: self.ledger.clone(),
            pool: self.ledger.clone(),
            receipts: self.ledger.clone(),
        }
    }
}

/// Wallet that always authorizes `OWNER`.
pub struct FakeWallet;

#[async_trait]
impl WalletCapability for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        Ok(vec![OWNER])
    }
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        confirmation_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(2),
    }
}

pub fn session_with(ledger: &Arc<FakeLedger>, addresses: ProgramAddresses) -> SwapSession {
    let connector = Arc::new(FakeConnector {
        ledger: ledger.clone(),
        addresses,
    });
    SwapSession::new(Some(Arc::new(FakeWallet)), connector, fast_config())
}

pub fn session(ledger: &Arc<FakeLedger>) -> SwapSession {
    session_with(ledger, ProgramAddresses::new(POOL, TOKEN))
}

pub fn amount(v: u64) -> TokenAmount {
    TokenAmount::from(v)
}
