//! Allowance-gated orchestration of pool writes.

use super::in_flight::InFlight;
use super::phase::{SwapPhase, approval_required};
use crate::error::SwapError;
use crate::identity::IdentityResolver;
use crate::lifecycle::{OperationKind, PhaseChange, SwapReport};
use crate::sync::PoolStateSynchronizer;
use amm_swap_domain::{
    Address, AmountInput, DEFAULT_DECIMALS, DepositRequest, SwapRequest, TokenAmount,
};
use amm_swap_protocols::prelude::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Configuration for orchestration runs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bound on each confirmation wait.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Pool write requested by the caller.
enum Operation {
    Swap(SwapRequest),
    Deposit(DepositRequest),
}

impl Operation {
    fn kind(&self) -> OperationKind {
        match self {
            Self::Swap(_) => OperationKind::Swap,
            Self::Deposit(_) => OperationKind::Deposit,
        }
    }

    /// Error for a write the node refused or the signer declined.
    fn rejected(&self, reason: String) -> SwapError {
        match self {
            Self::Swap(_) => SwapError::SwapRejected(reason),
            Self::Deposit(_) => SwapError::DepositRejected(reason),
        }
    }

    /// Error for a write the pool program reverted.
    fn reverted(&self, reason: String) -> SwapError {
        match self {
            Self::Swap(_) => SwapError::SwapReverted(reason),
            Self::Deposit(_) => SwapError::DepositReverted(reason),
        }
    }
}

/// State of one run. Every phase change goes through [`Run::advance`].
struct Run<'a> {
    phase: SwapPhase,
    report: SwapReport,
    /// `None` until the run is admitted; rejected runs never publish.
    publisher: Option<&'a watch::Sender<SwapPhase>>,
}

impl<'a> Run<'a> {
    fn new(kind: OperationKind) -> Self {
        let now = Utc::now();
        Self {
            phase: SwapPhase::Idle,
            report: SwapReport {
                id: Uuid::new_v4(),
                kind,
                owner: None,
                amount_in: None,
                allowance_before: None,
                approval_tx: None,
                pool_tx: None,
                transitions: Vec::new(),
                snapshot: None,
                started_at: now,
                finished_at: now,
            },
            publisher: None,
        }
    }

    fn admit(&mut self, publisher: &'a watch::Sender<SwapPhase>) {
        publisher.send_replace(SwapPhase::Idle);
        self.publisher = Some(publisher);
    }

    fn advance(&mut self, next: SwapPhase) -> Result<(), SwapError> {
        if !self.phase.can_advance_to(&next) {
            return Err(SwapError::Internal(format!(
                "illegal transition {} -> {}",
                self.phase, next
            )));
        }
        debug!(run = %self.report.id, from = %self.phase, to = %next, "Phase change");
        self.report.transitions.push(PhaseChange::now(next.clone()));
        if let Some(publisher) = self.publisher {
            publisher.send_replace(next.clone());
        }
        self.phase = next;
        Ok(())
    }

    /// Moves to `Done` or `Failed` and closes the report.
    fn finish(mut self, result: Result<(), SwapError>) -> SwapReport {
        let terminal = match result {
            Ok(()) => SwapPhase::Done,
            Err(e) => SwapPhase::Failed(e),
        };
        if let Err(e) = self.advance(terminal) {
            // Only reachable if the run was already terminal.
            warn!(run = %self.report.id, error = %e, "Run already finished");
        }
        self.report.finished_at = Utc::now();
        self.report
    }
}

/// Drives swaps and deposits through the allowance gate.
///
/// At most one run per identity is in flight; a second request for the same
/// identity fails with `OrchestrationBusy` without touching the ledger.
pub struct SwapOrchestrator {
    resolver: Arc<IdentityResolver>,
    connector: Arc<dyn LedgerConnector>,
    synchronizer: Arc<PoolStateSynchronizer>,
    config: OrchestratorConfig,
    in_flight: InFlight,
    phase: watch::Sender<SwapPhase>,
}

impl SwapOrchestrator {
    /// Creates an orchestrator.
    pub fn new(
        resolver: Arc<IdentityResolver>,
        connector: Arc<dyn LedgerConnector>,
        synchronizer: Arc<PoolStateSynchronizer>,
        config: OrchestratorConfig,
    ) -> Self {
        let (phase, _) = watch::channel(SwapPhase::Idle);
        Self {
            resolver,
            connector,
            synchronizer,
            config,
            in_flight: InFlight::default(),
            phase,
        }
    }

    /// Subscribes to phase changes of admitted runs.
    pub fn subscribe(&self) -> watch::Receiver<SwapPhase> {
        self.phase.subscribe()
    }

    /// Phase of the latest admitted run.
    pub fn phase(&self) -> SwapPhase {
        self.phase.borrow().clone()
    }

    /// Whether `owner` has a run in flight.
    pub fn is_busy(&self, owner: &Address) -> bool {
        self.in_flight.is_busy(owner)
    }

    /// Configuration in use.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Swaps the configured token into the pool.
    pub async fn swap(&self, request: SwapRequest) -> SwapReport {
        self.execute(Operation::Swap(request)).await
    }

    /// Deposits both pool tokens. Only token A goes through the allowance gate.
    pub async fn add_liquidity(&self, request: DepositRequest) -> SwapReport {
        self.execute(Operation::Deposit(request)).await
    }

    async fn execute(&self, op: Operation) -> SwapReport {
        let mut run = Run::new(op.kind());

        let Some(identity) = self.resolver.current().await else {
            warn!(kind = %op.kind(), "Rejected: no connected identity");
            return run.finish(Err(SwapError::NotConnected));
        };
        let owner = identity.address;
        run.report.owner = Some(owner);

        let _guard = match self.in_flight.claim(owner) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(owner = %owner, kind = %op.kind(), "Rejected: run already in flight");
                return run.finish(Err(e));
            }
        };
        run.admit(&self.phase);

        info!(run = %run.report.id, owner = %owner, kind = %op.kind(), "Starting run");

        let result = self.drive(&mut run, owner, &op).await;
        let refresh = match &result {
            Ok(()) => true,
            Err(e) => e.may_have_landed(),
        };

        let mut report = run.finish(result);
        match report.error() {
            None => info!(run = %report.id, status = %report.status(), "Run finished"),
            Some(e) => warn!(run = %report.id, error = %e, "Run failed"),
        }

        if refresh {
            report.snapshot = Some(self.synchronizer.refresh(Some(owner)).await);
        }
        report
    }

    async fn drive(&self, run: &mut Run<'_>, owner: Address, op: &Operation) -> Result<(), SwapError> {
        run.advance(SwapPhase::Validating)?;
        match op {
            Operation::Swap(request) => request.amount_in.validate()?,
            Operation::Deposit(request) => {
                request.amount_a.validate()?;
                request.amount_b.validate()?;
            }
        }

        let addresses = self.connector.addresses();
        if !addresses.pool_configured() {
            return Err(SwapError::PoolNotConfigured);
        }
        if !addresses.token_configured() {
            return Err(SwapError::TokenNotConfigured);
        }
        let bindings = self.connector.bind(Some(owner));

        let (amount_in, write) = match op {
            Operation::Swap(request) => {
                let amount_in = self.resolve(&bindings, &request.amount_in).await?;
                (amount_in, (amount_in, request.min_amount_out))
            }
            Operation::Deposit(request) => {
                let amount_a = self.resolve(&bindings, &request.amount_a).await?;
                // Only token A is bound; token B amounts in human units assume the default.
                let amount_b = request.amount_b.resolve(DEFAULT_DECIMALS)?;
                (amount_a, (amount_a, amount_b))
            }
        };
        run.report.amount_in = Some(amount_in);

        run.advance(SwapPhase::CheckingAllowance)?;
        let spender = bindings.pool.address();
        let allowance = bindings
            .token
            .allowance(owner, spender)
            .await
            .map_err(SwapError::read)?;
        run.report.allowance_before = Some(allowance);

        if approval_required(allowance, amount_in) {
            info!(allowance = %allowance, amount_in = %amount_in, "Allowance insufficient, approving");
            run.advance(SwapPhase::Approving)?;
            self.approve(run, &bindings, spender, amount_in).await?;
        } else {
            debug!(allowance = %allowance, amount_in = %amount_in, "Allowance sufficient");
        }

        run.advance(SwapPhase::Swapping)?;
        let (first, second) = write;
        let submitted = match op {
            Operation::Swap(_) => bindings.pool.swap_exact_tokens_for_tokens(first, second).await,
            Operation::Deposit(_) => bindings.pool.add_liquidity(first, second).await,
        };
        let hash = submitted.map_err(|e| {
            if e.is_revert() {
                op.reverted(e.to_string())
            } else {
                op.rejected(e.to_string())
            }
        })?;
        run.report.pool_tx = Some(hash);
        info!(tx = %hash, kind = %op.kind(), "Pool write submitted");

        run.advance(SwapPhase::Confirming)?;
        self.confirm(&bindings, hash, |reason| op.reverted(reason)).await
    }

    /// Normalizes `input`, reading the token's decimals only when needed.
    async fn resolve(
        &self,
        bindings: &ProgramBindings,
        input: &AmountInput,
    ) -> Result<TokenAmount, SwapError> {
        let decimals = if input.needs_decimals() {
            match bindings.token.decimals().await {
                Ok(d) => d,
                Err(e) => {
                    warn!(error = %e, fallback = DEFAULT_DECIMALS, "decimals() failed, using default");
                    DEFAULT_DECIMALS
                }
            }
        } else {
            DEFAULT_DECIMALS
        };
        Ok(input.resolve(decimals)?)
    }

    async fn approve(
        &self,
        run: &mut Run<'_>,
        bindings: &ProgramBindings,
        spender: Address,
        amount: TokenAmount,
    ) -> Result<(), SwapError> {
        let hash = bindings
            .token
            .approve(spender, amount)
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    SwapError::ApprovalRejected(e.to_string())
                } else {
                    SwapError::ApprovalFailed(e.to_string())
                }
            })?;
        run.report.approval_tx = Some(hash);
        info!(tx = %hash, spender = %spender, amount = %amount, "Approval submitted");

        self.confirm(bindings, hash, SwapError::ApprovalFailed).await
    }

    /// Waits for `hash`, mapping a reverted receipt through `reverted`.
    async fn confirm(
        &self,
        bindings: &ProgramBindings,
        hash: TxHash,
        reverted: impl FnOnce(String) -> SwapError,
    ) -> Result<(), SwapError> {
        let waiter = ConfirmationWaiter::new(self.config.confirmation_timeout, self.config.poll_interval);
        match waiter.wait(bindings.receipts.as_ref(), hash).await {
            Ok(receipt) => {
                info!(tx = %hash, block = ?receipt.block_number, "Transaction confirmed");
                Ok(())
            }
            Err(TxFailure::Reverted(receipt)) => Err(reverted(format!(
                "transaction {hash} reverted in block {}",
                receipt
                    .block_number
                    .map_or_else(|| "unknown".to_string(), |b| b.to_string())
            ))),
            Err(TxFailure::Timeout(waited)) => {
                warn!(tx = %hash, waited_ms = waited.as_millis() as u64, "Confirmation timed out");
                Err(SwapError::ConfirmationTimeout { hash, waited })
            }
        }
    }
}
