//! # Write-Action Orchestrator
//!
//! Sequences multi-step writes and exposes one combined status.
//!
//! ## Sequences
//!
//! - **Claim then redeem** ([`WriteOrchestrator::claim_and_redeem`]): pending
//!   rewards are claimed first; the redeem is submitted only after the claim
//!   is confirmed. A failed claim aborts the sequence.
//! - **Approve then redeem** ([`WriteOrchestrator::redeem_from_wallet`]): with
//!   an insufficient allowance only the approval is sent and the call returns
//!   [`RedeemOutcome::ApprovalSubmitted`]; the caller redeems again once it is
//!   confirmed.
//! - **Approve then mint** ([`WriteOrchestrator::mint_nft`]): same gating on the
//!   stablecoin allowance against the NFT price.
//!
//! Each transaction must be submitted and confirmed within the configured
//! timeout. Writes are never retried automatically. A successful sequence
//! bumps the write counter so every subscribed refresher re-reads.

use std::future::Future;
use std::time::Duration;

use near_api::AccountId;
use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::error::WriteError;
use crate::events::{TxConfirmed, TxFailed, TxSubmitted};
use crate::gateway::{ContractGateway, TxReceipt, WriteAction};
use crate::reader::ContractReader;
use crate::units::{parse_units, TOKEN_DECIMALS};

/// Combined state of the current write sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteStatus {
    /// A transaction is being signed or submitted.
    pub is_pending: bool,
    /// A submitted transaction is awaiting its final outcome.
    pub is_confirming: bool,
    /// The last sequence completed successfully.
    pub is_success: bool,
    /// First error of the last sequence.
    pub error: Option<WriteError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Allowance was too low; only an approval was sent.
    ApprovalSubmitted(TxReceipt),
    Redeemed(TxReceipt),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintOutcome {
    /// Stablecoin allowance was below the NFT price; only an approval was sent.
    ApprovalSubmitted(TxReceipt),
    Minted(TxReceipt),
}

pub struct WriteOrchestrator<G> {
    reader: ContractReader<G>,
    confirmation_timeout: Duration,
    status: watch::Sender<WriteStatus>,
    completed: watch::Sender<u64>,
}

impl<G: ContractGateway> WriteOrchestrator<G> {
    pub fn new(reader: ContractReader<G>, confirmation_timeout: Duration) -> Self {
        let (status, _) = watch::channel(WriteStatus::default());
        let (completed, _) = watch::channel(0);
        Self {
            reader,
            confirmation_timeout,
            status,
            completed,
        }
    }

    pub fn status(&self) -> WriteStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WriteStatus> {
        self.status.subscribe()
    }

    /// Count of successful sequences. Each receiver sees every change, so
    /// any number of refreshers can follow it.
    pub fn refresh_trigger(&self) -> watch::Receiver<u64> {
        self.completed.subscribe()
    }

    // ------------------------------------------------------------------------
    // Vault
    // ------------------------------------------------------------------------

    /// Redeems `amount` tokens from NFT `token_id`, claiming its pending
    /// rewards first if there are any.
    pub async fn claim_and_redeem(&self, token_id: u64, amount: &str) -> Result<TxReceipt, WriteError> {
        self.sequence(async {
            let amount = parse_units(amount, TOKEN_DECIMALS)?;
            // Reading zero here would skip the claim, so an unreadable
            // pending balance stops the sequence before any submission.
            let pending = self
                .reader
                .gateway()
                .calculate_pending(token_id)
                .await
                .map_err(|e| WriteError::Rejected(format!("pending rewards unavailable: {e}")))?;

            if pending > 0 {
                let claim = WriteAction::ClaimTokens {
                    token_id,
                    amount: pending,
                };
                self.execute(&claim).await.map_err(|e| abort(&claim, e))?;
            }

            self.execute(&WriteAction::RedeemFromNft { token_id, amount })
                .await
        })
        .await
    }

    pub async fn redeem_from_nft(&self, token_id: u64, amount: &str) -> Result<TxReceipt, WriteError> {
        self.sequence(async {
            let amount = parse_units(amount, TOKEN_DECIMALS)?;
            self.execute(&WriteAction::RedeemFromNft { token_id, amount })
                .await
        })
        .await
    }

    /// Redeems wallet tokens, or only approves the vault if the current
    /// allowance does not cover `amount`.
    pub async fn redeem_from_wallet(
        &self,
        owner: &AccountId,
        amount: &str,
    ) -> Result<RedeemOutcome, WriteError> {
        self.sequence(async {
            let amount = parse_units(amount, TOKEN_DECIMALS)?;
            let vault = self.reader.contracts().vault.clone();
            let allowance = self.reader.read_allowance(owner, &vault).await;

            if allowance.raw < amount {
                tracing::info!(
                    "Allowance below redeem amount, approving: allowance={} amount={}",
                    allowance.raw,
                    amount
                );
                let receipt = self
                    .execute(&WriteAction::ApproveToken {
                        spender: vault,
                        amount,
                    })
                    .await?;
                return Ok(RedeemOutcome::ApprovalSubmitted(receipt));
            }

            self.execute(&WriteAction::RedeemFromWallet { amount })
                .await
                .map(RedeemOutcome::Redeemed)
        })
        .await
    }

    pub async fn redeem_from_bonus(&self, amount: &str) -> Result<TxReceipt, WriteError> {
        self.sequence(async {
            let amount = parse_units(amount, TOKEN_DECIMALS)?;
            self.execute(&WriteAction::RedeemFromBonus { amount }).await
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Token and stablecoin
    // ------------------------------------------------------------------------

    pub async fn burn(&self, amount: &str) -> Result<TxReceipt, WriteError> {
        self.sequence(async {
            let amount = parse_units(amount, TOKEN_DECIMALS)?;
            self.execute(&WriteAction::Burn { amount }).await
        })
        .await
    }

    /// Approves `spender` for `amount` stablecoin, scaled by its resolved decimals.
    pub async fn approve_stable(&self, spender: &AccountId, amount: &str) -> Result<TxReceipt, WriteError> {
        self.sequence(async {
            let decimals = self.reader.stable_decimals().await;
            let amount = parse_units(amount, decimals)?;
            self.execute(&WriteAction::ApproveStable {
                spender: spender.clone(),
                amount,
            })
            .await
        })
        .await
    }

    // ------------------------------------------------------------------------
    // NFT
    // ------------------------------------------------------------------------

    /// Mints one NFT, or only approves the NFT contract for the price if the
    /// stablecoin allowance does not cover it.
    pub async fn mint_nft(
        &self,
        owner: &AccountId,
        referrer: Option<AccountId>,
    ) -> Result<MintOutcome, WriteError> {
        self.sequence(async {
            let nft = self.reader.contracts().nft.clone();
            // A price of zero would skip the approval, so an unreadable price
            // stops the mint instead of being defaulted.
            let price = self
                .reader
                .gateway()
                .nft_price()
                .await
                .map_err(|e| WriteError::Rejected(format!("NFT price unavailable: {e}")))?;
            let allowance = self.reader.read_stable_allowance(owner, &nft).await;

            if allowance.raw < price {
                let receipt = self
                    .execute(&WriteAction::ApproveStable {
                        spender: nft,
                        amount: price,
                    })
                    .await?;
                return Ok(MintOutcome::ApprovalSubmitted(receipt));
            }

            self.execute(&WriteAction::Mint { referrer })
                .await
                .map(MintOutcome::Minted)
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Runs one user-initiated sequence, resetting and finalizing the status.
    async fn sequence<T>(
        &self,
        steps: impl Future<Output = Result<T, WriteError>>,
    ) -> Result<T, WriteError> {
        self.status.send_replace(WriteStatus::default());
        let result = steps.await;

        self.status.send_modify(|status| {
            status.is_pending = false;
            status.is_confirming = false;
            match &result {
                Ok(_) => status.is_success = true,
                Err(WriteError::SequenceAborted { source, .. }) => {
                    status.error.get_or_insert_with(|| (**source).clone());
                }
                Err(e) => {
                    status.error.get_or_insert_with(|| e.clone());
                }
            }
        });

        if result.is_ok() {
            self.completed.send_modify(|count| *count = count.wrapping_add(1));
        }
        result
    }

    /// Submits `action` and waits for its final outcome.
    async fn execute(&self, action: &WriteAction) -> Result<TxReceipt, WriteError> {
        self.status.send_modify(|status| {
            status.is_pending = true;
            status.is_confirming = false;
        });

        let result = self.submit_and_confirm(action).await;
        match &result {
            Ok(receipt) => TxConfirmed {
                action: action.name(),
                tx_hash: &receipt.tx_hash.0,
            }
            .emit(),
            Err(e) => TxFailed {
                action: action.name(),
                error: e.to_string(),
            }
            .emit(),
        }
        result
    }

    /// Submission and confirmation share one deadline.
    async fn submit_and_confirm(&self, action: &WriteAction) -> Result<TxReceipt, WriteError> {
        let gateway = self.reader.gateway();
        let deadline = Instant::now() + self.confirmation_timeout;

        let tx = time::timeout_at(deadline, gateway.submit(action))
            .await
            .map_err(|_| WriteError::Timeout(self.confirmation_timeout))??;
        TxSubmitted {
            action: action.name(),
            tx_hash: &tx.0,
        }
        .emit();

        self.status.send_modify(|status| {
            status.is_pending = false;
            status.is_confirming = true;
        });

        time::timeout_at(deadline, gateway.confirm(&tx))
            .await
            .map_err(|_| WriteError::Timeout(self.confirmation_timeout))?
    }
}

fn abort(step: &WriteAction, source: WriteError) -> WriteError {
    WriteError::SequenceAborted {
        step: step.name().to_string(),
        source: Box::new(source),
    }
}
