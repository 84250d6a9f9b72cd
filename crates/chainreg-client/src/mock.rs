//! In-memory chain for tests and CLI diagnostics.
//!
//! [`MockChain`] implements [`ContractProvider`]; every bound contract shares
//! one chain state and interprets the registry wire methods directly.
//! Transactions are included immediately, one block each, and domain errors
//! revert with the same ABI-encoded `Error(string)` payloads the real
//! contracts use.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chainreg_core::binding::{
    BindingError, BoundContract, CallOpts, ContractProvider, LogEntry, LogFilter,
    PendingTransaction, TransactOpts, TransactionReceipt, TxStatus,
};
use chainreg_core::revert::encode_error_string;
use chainreg_core::runner::TransactionRunner;
use chainreg_core::{ChannelRecord, StreamRecord};

use crate::facade::{REASON_ALREADY_EXISTS, REASON_NOT_FOUND, REASON_OUT_OF_BOUNDS};
use crate::stream::stream_allocated_topic;

// ─── Chain state ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct ChainState {
    block_number: u64,
    tx_counter: u64,
    streams: Vec<StreamRecord>,
    stream_index: HashMap<String, usize>,
    channels: Vec<ChannelRecord>,
    channel_index: HashMap<String, usize>,
    /// wallet → root key
    wallet_links: HashMap<Address, Address>,
    /// vault → delegates, insertion order
    delegations: HashMap<Address, Vec<Address>>,
    logs: Vec<LogEntry>,
}

impl ChainState {
    fn next_tx_hash(&mut self) -> B256 {
        self.tx_counter += 1;
        let mut hash = B256::ZERO;
        hash.0[24..].copy_from_slice(&self.tx_counter.to_be_bytes());
        hash
    }
}

fn revert(reason: &str) -> BindingError {
    BindingError::Reverted { data: encode_error_string(reason) }
}

fn bad_args(method: &str) -> BindingError {
    BindingError::Abi(format!("malformed arguments for {method}"))
}

fn stream_value(record: &StreamRecord) -> DynSolValue {
    DynSolValue::Tuple(vec![
        DynSolValue::String(record.stream_id.clone()),
        DynSolValue::Array(record.nodes.iter().map(|n| DynSolValue::Address(*n)).collect()),
        DynSolValue::FixedBytes(record.genesis_miniblock_hash, 32),
        DynSolValue::Bytes(record.genesis_miniblock.clone().unwrap_or_default()),
        DynSolValue::FixedBytes(record.last_miniblock_hash, 32),
        DynSolValue::Uint(U256::from(record.last_miniblock_num), 64),
    ])
}

fn channel_value(record: &ChannelRecord) -> DynSolValue {
    DynSolValue::Tuple(vec![
        DynSolValue::String(record.channel_id.clone()),
        DynSolValue::Bool(record.disabled),
        DynSolValue::String(record.metadata.clone()),
        DynSolValue::Array(
            record.role_ids.iter().map(|id| DynSolValue::Uint(U256::from(*id), 64)).collect(),
        ),
    ])
}

// ─── MockChain ────────────────────────────────────────────────────────────────

/// An in-memory chain shared by every contract bound through it.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<RwLock<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block height.
    pub fn block_number(&self) -> u64 {
        self.state.read().unwrap().block_number
    }

    /// Pre-populate a channel without going through a transaction.
    pub fn seed_channel(&self, record: ChannelRecord) {
        let mut state = self.state.write().unwrap();
        let index = state.channels.len();
        state.channel_index.insert(record.channel_id.clone(), index);
        state.channels.push(record);
    }

    /// Pre-populate a wallet link.
    pub fn seed_wallet_link(&self, wallet: Address, root_key: Address) {
        self.state.write().unwrap().wallet_links.insert(wallet, root_key);
    }

    /// Pre-populate a delegation.
    pub fn seed_delegation(&self, vault: Address, delegate: Address) {
        self.state.write().unwrap().delegations.entry(vault).or_default().push(delegate);
    }
}

impl ContractProvider for MockChain {
    fn bind(&self, address: Address) -> Result<Arc<dyn BoundContract>, BindingError> {
        Ok(Arc::new(MockContract { address, state: Arc::clone(&self.state) }))
    }
}

// ─── MockContract ─────────────────────────────────────────────────────────────

struct MockContract {
    address: Address,
    state: Arc<RwLock<ChainState>>,
}

impl MockContract {
    fn read_call(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, BindingError> {
        let state = self.state.read().unwrap();
        match method {
            "getStream" => {
                let [DynSolValue::String(id)] = args else { return Err(bad_args(method)) };
                let index = state.stream_index.get(id).ok_or_else(|| revert(REASON_NOT_FOUND))?;
                Ok(vec![stream_value(&state.streams[*index])])
            }
            "getStreamsLength" => {
                Ok(vec![DynSolValue::Uint(U256::from(state.streams.len()), 256)])
            }
            "getStreamByIndex" => {
                let index = args
                    .first()
                    .and_then(DynSolValue::as_uint)
                    .ok_or_else(|| bad_args(method))?
                    .0;
                let index = usize::try_from(index).map_err(|_| revert(REASON_OUT_OF_BOUNDS))?;
                let record = state.streams.get(index).ok_or_else(|| revert(REASON_OUT_OF_BOUNDS))?;
                Ok(vec![stream_value(record)])
            }
            "getAllStreams" => Ok(vec![DynSolValue::Array(
                state.streams.iter().map(stream_value).collect(),
            )]),
            "getChannel" => {
                let [DynSolValue::String(id)] = args else { return Err(bad_args(method)) };
                let index = state.channel_index.get(id).ok_or_else(|| revert(REASON_NOT_FOUND))?;
                Ok(vec![channel_value(&state.channels[*index])])
            }
            "getChannels" => Ok(vec![DynSolValue::Array(
                state.channels.iter().map(channel_value).collect(),
            )]),
            "getWalletsByRootKey" => {
                let [DynSolValue::Address(root_key)] = args else { return Err(bad_args(method)) };
                let mut wallets: Vec<(&Address, &Address)> = state
                    .wallet_links
                    .iter()
                    .filter(|(_, root)| *root == root_key)
                    .collect();
                wallets.sort();
                Ok(vec![DynSolValue::Array(
                    wallets.into_iter().map(|(w, _)| DynSolValue::Address(*w)).collect(),
                )])
            }
            "getRootKeyForWallet" => {
                let [DynSolValue::Address(wallet)] = args else { return Err(bad_args(method)) };
                let root = state.wallet_links.get(wallet).copied().unwrap_or(Address::ZERO);
                Ok(vec![DynSolValue::Address(root)])
            }
            "checkIfLinked" => {
                let [DynSolValue::Address(root_key), DynSolValue::Address(wallet)] = args else {
                    return Err(bad_args(method));
                };
                let linked = state.wallet_links.get(wallet) == Some(root_key);
                Ok(vec![DynSolValue::Bool(linked)])
            }
            "getDelegatesForAll" => {
                let [DynSolValue::Address(vault)] = args else { return Err(bad_args(method)) };
                let delegates = state.delegations.get(vault).cloned().unwrap_or_default();
                Ok(vec![DynSolValue::Array(
                    delegates.into_iter().map(DynSolValue::Address).collect(),
                )])
            }
            "checkDelegateForAll" => {
                let [DynSolValue::Address(delegate), DynSolValue::Address(vault)] = args else {
                    return Err(bad_args(method));
                };
                let held = state
                    .delegations
                    .get(vault)
                    .is_some_and(|ds| ds.contains(delegate));
                Ok(vec![DynSolValue::Bool(held)])
            }
            _ => Err(BindingError::Abi(format!("unknown method {method}"))),
        }
    }

    fn apply_transact(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt, BindingError> {
        let mut state = self.state.write().unwrap();
        match method {
            "allocateStream" => {
                let [DynSolValue::String(stream_id), DynSolValue::Array(nodes), DynSolValue::FixedBytes(genesis_hash, 32), DynSolValue::Bytes(genesis)] =
                    args
                else {
                    return Err(bad_args(method));
                };
                if state.stream_index.contains_key(stream_id) {
                    return Err(revert(REASON_ALREADY_EXISTS));
                }
                let nodes: Vec<Address> = nodes
                    .iter()
                    .map(|v| v.as_address().ok_or_else(|| bad_args(method)))
                    .collect::<Result<_, _>>()?;
                let genesis = (!genesis.is_empty()).then(|| genesis.clone());
                let record = StreamRecord::allocated(
                    stream_id.clone(),
                    nodes.clone(),
                    *genesis_hash,
                    genesis,
                );
                let index = state.streams.len();
                state.stream_index.insert(stream_id.clone(), index);
                state.streams.push(record);

                state.block_number += 1;
                let tx_hash = state.next_tx_hash();
                let block_number = state.block_number;
                let log = LogEntry {
                    address: self.address,
                    topics: vec![stream_allocated_topic()],
                    data: DynSolValue::Tuple(vec![
                        DynSolValue::String(stream_id.clone()),
                        DynSolValue::Array(
                            nodes.iter().map(|n| DynSolValue::Address(*n)).collect(),
                        ),
                        DynSolValue::FixedBytes(*genesis_hash, 32),
                    ])
                    .abi_encode_params(),
                    block_number,
                    tx_hash,
                };
                state.logs.push(log.clone());
                Ok(TransactionReceipt {
                    tx_hash,
                    block_number,
                    status: TxStatus::Success,
                    logs: vec![log],
                    revert_data: None,
                })
            }
            "linkWalletToRootKey" => {
                let [DynSolValue::Address(wallet), DynSolValue::Address(root_key)] = args else {
                    return Err(bad_args(method));
                };
                if state.wallet_links.contains_key(wallet) {
                    return Err(revert(REASON_ALREADY_EXISTS));
                }
                state.wallet_links.insert(*wallet, *root_key);
                state.block_number += 1;
                let tx_hash = state.next_tx_hash();
                Ok(TransactionReceipt {
                    tx_hash,
                    block_number: state.block_number,
                    status: TxStatus::Success,
                    logs: vec![],
                    revert_data: None,
                })
            }
            _ => Err(BindingError::Abi(format!("unknown method {method}"))),
        }
    }
}

#[async_trait]
impl BoundContract for MockContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(
        &self,
        _opts: &CallOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, BindingError> {
        self.read_call(method, args)
    }

    async fn transact(
        &self,
        _opts: &TransactOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Box<dyn PendingTransaction>, BindingError> {
        let receipt = self.apply_transact(method, args)?;
        Ok(Box::new(MockPending { receipt }))
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, BindingError> {
        let state = self.state.read().unwrap();
        Ok(state
            .logs
            .iter()
            .filter(|log| {
                log.block_number >= filter.from_block
                    && log.block_number <= filter.to_block
                    && filter.address.map_or(true, |a| a == log.address)
                    && (filter.topics.is_empty()
                        || log.topics.first().is_some_and(|t| filter.topics.contains(t)))
            })
            .cloned()
            .collect())
    }
}

// ─── MockPending / MockRunner ─────────────────────────────────────────────────

#[derive(Debug)]
struct MockPending {
    receipt: TransactionReceipt,
}

#[async_trait]
impl PendingTransaction for MockPending {
    fn tx_hash(&self) -> B256 {
        self.receipt.tx_hash
    }

    async fn wait(&self) -> Result<TransactionReceipt, BindingError> {
        Ok(self.receipt.clone())
    }
}

/// Runner for the mock chain: transactions are included at submit time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRunner;

#[async_trait]
impl TransactionRunner for MockRunner {
    async fn submit(
        &self,
        contract: &dyn BoundContract,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Box<dyn PendingTransaction>, BindingError> {
        contract.transact(&TransactOpts::default(), method, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(chain: &MockChain) -> Arc<dyn BoundContract> {
        chain.bind(Address::repeat_byte(0x11)).unwrap()
    }

    #[tokio::test]
    async fn allocation_emits_a_filterable_log() {
        let chain = MockChain::new();
        let contract = bound(&chain);
        let args = [
            DynSolValue::String("stream-1".into()),
            DynSolValue::Array(vec![DynSolValue::Address(Address::repeat_byte(0x22))]),
            DynSolValue::FixedBytes(B256::repeat_byte(0x33), 32),
            DynSolValue::Bytes(vec![]),
        ];
        let pending = contract.transact(&TransactOpts::default(), "allocateStream", &args).await.unwrap();
        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.status, TxStatus::Success);
        assert_eq!(receipt.block_number, 1);

        let logs = contract
            .filter_logs(&LogFilter {
                from_block: 0,
                to_block: 10,
                address: Some(Address::repeat_byte(0x11)),
                topics: vec![stream_allocated_topic()],
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].tx_hash, receipt.tx_hash);
    }

    #[tokio::test]
    async fn duplicate_allocation_reverts_with_reason() {
        let chain = MockChain::new();
        let contract = bound(&chain);
        let args = [
            DynSolValue::String("stream-1".into()),
            DynSolValue::Array(vec![DynSolValue::Address(Address::repeat_byte(0x22))]),
            DynSolValue::FixedBytes(B256::ZERO, 32),
            DynSolValue::Bytes(vec![]),
        ];
        contract.transact(&TransactOpts::default(), "allocateStream", &args).await.unwrap();
        let err = contract
            .transact(&TransactOpts::default(), "allocateStream", &args)
            .await
            .unwrap_err();
        let data = err.revert_data().unwrap();
        assert_eq!(
            chainreg_core::revert::decode_error_string(data).as_deref(),
            Some(REASON_ALREADY_EXISTS)
        );
    }

    #[tokio::test]
    async fn unknown_method_is_an_abi_error() {
        let chain = MockChain::new();
        let contract = bound(&chain);
        let err = contract.call(&CallOpts::default(), "selfdestruct", &[]).await.unwrap_err();
        assert!(matches!(err, BindingError::Abi(_)));
    }
}
