//! chainreg-core — foundation types and traits for the ChainReg registry client.
//!
//! This crate defines:
//! - [`ErrorKind`] / [`RegistryError`] — the taxonomy every facade returns
//! - [`ChainIdentity`] / [`ContractConfig`] — typed config handed in by the host
//! - [`BoundContract`] / [`ContractProvider`] — the contract-binding capability boundary
//! - [`TransactionRunner`] — the submit-and-wait boundary for state-changing calls
//! - revert-string codec and the read-retry policy

pub mod binding;
pub mod config;
pub mod error;
pub mod records;
pub mod retry;
pub mod revert;
pub mod runner;

pub use binding::{
    BindingError, BoundContract, CallOpts, ContractProvider, LogEntry, LogFilter,
    PendingTransaction, TransactOpts, TransactionReceipt, TxStatus,
};
pub use config::{ChainIdentity, ContractConfig, RegistrySettings};
pub use error::{ErrorKind, RegistryError, Result};
pub use records::{ChannelRecord, DelegationRecord, StreamRecord, WalletLinkRecord};
pub use retry::{RetryConfig, RetryPolicy};
pub use runner::TransactionRunner;
