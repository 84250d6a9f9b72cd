//! The transaction runner boundary.
//!
//! The runner owns nonce management, gas pricing and confirmation tracking —
//! all outside this workspace. Facades hand it a bound contract, a method
//! name and arguments, and block until the chain includes the transaction.

use alloy_core::dyn_abi::DynSolValue;
use async_trait::async_trait;

use crate::binding::{BindingError, BoundContract, PendingTransaction, TransactionReceipt};

/// Submits state-changing calls as transactions and waits for inclusion.
///
/// Implementations must be safe to call concurrently: two submissions for
/// different targets share no mutable transaction-building state.
///
/// Cancellation is dropping the returned future. A transaction that was
/// already broadcast may still be mined — callers must not assume a
/// cancelled write had no effect.
#[async_trait]
pub trait TransactionRunner: Send + Sync + 'static {
    /// Submit the transaction without waiting for confirmation.
    async fn submit(
        &self,
        contract: &dyn BoundContract,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Box<dyn PendingTransaction>, BindingError>;

    /// Submit and block until mined or terminally failed.
    ///
    /// Kept as submit-then-wait internally so an async caller can be given
    /// the two halves separately without changing this contract.
    async fn submit_and_wait(
        &self,
        contract: &dyn BoundContract,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt, BindingError> {
        let pending = self.submit(contract, method, args).await?;
        pending.wait().await
    }
}
