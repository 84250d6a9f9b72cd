//! The contract-binding capability boundary.
//!
//! Generated per-contract bindings live outside this workspace; the client
//! layer sees them only through [`BoundContract`] — a narrow `call` /
//! `transact` / `filter_logs` surface — and obtains instances through a
//! [`ContractProvider`]. Facades own their bound contract; the provider and
//! the underlying connection are shared and never mutated by a facade.

use std::sync::Arc;
use std::time::Duration;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a contract binding adapter.
///
/// This is the adapter's native error type. Facades wrap it into a
/// [`crate::error::RegistryError`] exactly once and never return it raw.
#[derive(Debug, Error)]
pub enum BindingError {
    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Execution reverted; `data` is the raw revert payload.
    #[error("execution reverted ({} bytes of revert data)", data.len())]
    Reverted { data: Vec<u8> },

    /// Transport failure (connection refused, timeout, etc.).
    #[error("network error: {0}")]
    Network(String),

    /// Argument or return data did not match the contract interface.
    #[error("ABI error: {0}")]
    Abi(String),

    /// The adapter observed cancellation before completion.
    #[error("operation cancelled")]
    Cancelled,
}

impl BindingError {
    /// Returns `true` if this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// The raw revert payload, if execution reverted.
    pub fn revert_data(&self) -> Option<&[u8]> {
        match self {
            Self::Reverted { data } => Some(data),
            _ => None,
        }
    }
}

// ─── Per-call options ─────────────────────────────────────────────────────────

/// Options for a read call. Constructed fresh per call, never cached.
#[derive(Debug, Clone, Default)]
pub struct CallOpts {
    /// Pin the call to a block; `None` means latest.
    pub block_number: Option<u64>,
    /// Abort the call after this duration.
    pub timeout: Option<Duration>,
}

/// Options for a state-changing call. Constructed fresh per call.
#[derive(Debug, Clone, Default)]
pub struct TransactOpts {
    pub gas_limit: Option<u64>,
}

// ─── Logs ─────────────────────────────────────────────────────────────────────

/// A log query over a block range.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub from_block: u64,
    pub to_block: u64,
    /// Restrict to logs emitted by this contract.
    pub address: Option<Address>,
    /// Accepted topic0 values; empty matches every event.
    pub topics: Vec<B256>,
}

/// One emitted log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub tx_hash: B256,
}

// ─── Transactions ─────────────────────────────────────────────────────────────

/// Terminal status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

/// Receipt data for a mined transaction.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub status: TxStatus,
    pub logs: Vec<LogEntry>,
    /// Revert payload for a failed transaction, when the node reports one.
    pub revert_data: Option<Vec<u8>>,
}

/// Handle for a submitted, not yet confirmed transaction.
///
/// Dropping a `wait` future abandons the wait, not the transaction — it may
/// still be mined.
#[async_trait]
pub trait PendingTransaction: Send + Sync + std::fmt::Debug {
    fn tx_hash(&self) -> B256;

    /// Block until the transaction is mined or submission fails terminally.
    async fn wait(&self) -> Result<TransactionReceipt, BindingError>;
}

// ─── The capability traits ────────────────────────────────────────────────────

/// A contract bound at one address on one chain.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; facades issue concurrent calls.
#[async_trait]
pub trait BoundContract: Send + Sync + 'static {
    /// The address this contract is bound at.
    fn address(&self) -> Address;

    /// Invoke a view method and return its decoded outputs.
    async fn call(
        &self,
        opts: &CallOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, BindingError>;

    /// Submit a state-changing method invocation.
    async fn transact(
        &self,
        opts: &TransactOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Box<dyn PendingTransaction>, BindingError>;

    /// Fetch logs emitted by this contract matching `filter`.
    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, BindingError>;
}

/// Binds addresses to [`BoundContract`] instances — the entry point into the
/// generated-binding layer.
pub trait ContractProvider: Send + Sync + 'static {
    fn bind(&self, address: Address) -> Result<Arc<dyn BoundContract>, BindingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(BindingError::Network("connection refused".into()).is_retryable());
        assert!(!BindingError::Rpc { code: -32000, message: "rejected".into() }.is_retryable());
        assert!(!BindingError::Reverted { data: vec![] }.is_retryable());
        assert!(!BindingError::Cancelled.is_retryable());
    }

    #[test]
    fn revert_data_accessor() {
        let err = BindingError::Reverted { data: vec![1, 2, 3] };
        assert_eq!(err.revert_data(), Some(&[1u8, 2, 3][..]));
        assert_eq!(BindingError::Cancelled.revert_data(), None);
    }
}
