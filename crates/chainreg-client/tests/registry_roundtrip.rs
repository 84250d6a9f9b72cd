//! End-to-end facade scenarios against the in-memory mock chain.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use chainreg_client::mock::{MockChain, MockRunner};
use chainreg_client::{for_chain, Blockchain, StreamRegistry};
use chainreg_core::binding::{
    BindingError, BoundContract, CallOpts, ContractProvider, LogEntry, LogFilter,
    PendingTransaction, TransactOpts,
};
use chainreg_core::{ContractConfig, ErrorKind, RegistrySettings, RetryConfig};

const REGISTRY_ADDRESS: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn dev_blockchain(mock: &MockChain) -> Blockchain {
    let factory = for_chain(31337).expect("localhost chain is supported");
    Blockchain::new(*factory.chain(), Arc::new(mock.clone()), Arc::new(MockRunner))
}

fn dev_config() -> ContractConfig {
    ContractConfig { address: REGISTRY_ADDRESS.into(), version: "dev".into() }
}

fn stream_registry(mock: &MockChain) -> StreamRegistry {
    let blockchain = dev_blockchain(mock);
    for_chain(31337)
        .unwrap()
        .stream_registry(&blockchain, &dev_config(), RegistrySettings::default())
        .expect("facade binds")
}

fn node(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

// ─── Stream registry ──────────────────────────────────────────────────────────

#[tokio::test]
async fn allocate_then_get_preserves_record() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    let nodes = vec![node(0x03), node(0x01), node(0x02)];
    let genesis_hash = B256::repeat_byte(0x42);

    registry
        .allocate_stream("space-1", &nodes, genesis_hash, b"genesis")
        .await
        .unwrap();

    let record = registry.get_stream("space-1").await.unwrap();
    assert_eq!(record.stream_id, "space-1");
    assert_eq!(record.nodes, nodes, "node order must survive the round trip");
    assert_eq!(record.genesis_miniblock_hash, genesis_hash);
    assert_eq!(record.genesis_miniblock.as_deref(), Some(&b"genesis"[..]));
    assert_eq!(record.last_miniblock_hash, genesis_hash);
    assert_eq!(record.last_miniblock_num, 0);
}

#[tokio::test]
async fn duplicate_allocation_is_already_exists() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    let nodes = vec![node(0x01)];

    registry.allocate_stream("space-1", &nodes, B256::ZERO, &[]).await.unwrap();
    let err = registry
        .allocate_stream("space-1", &nodes, B256::ZERO, &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    // The registry never overwrites: still exactly one stream.
    assert_eq!(registry.get_stream_count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_stream_is_not_found() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    let err = registry.get_stream("no-such-stream").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn preconditions_fail_before_any_chain_call() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);

    let err = registry.allocate_stream("", &[node(0x01)], B256::ZERO, &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadArgument);

    let err = registry.allocate_stream("space-1", &[], B256::ZERO, &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadArgument);

    // Nothing reached the chain.
    assert_eq!(mock.block_number(), 0);
    assert_eq!(registry.get_stream_count().await.unwrap(), 0);
}

#[tokio::test]
async fn count_matches_snapshot_length() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    assert_eq!(registry.get_stream_count().await.unwrap(), 0);

    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        registry.allocate_stream(id, &[node(0x01)], B256::ZERO, &[]).await.unwrap();
        assert_eq!(registry.get_stream_count().await.unwrap(), i as i64 + 1);
    }

    let all = registry.get_all_streams().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(registry.get_stream_count().await.unwrap(), all.len() as i64);
}

#[tokio::test]
async fn index_reads_agree_with_snapshot_order() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    for id in ["a", "b", "c"] {
        registry.allocate_stream(id, &[node(0x01)], B256::ZERO, &[]).await.unwrap();
    }

    let all = registry.get_all_streams().await.unwrap();
    for (i, expected) in all.iter().enumerate() {
        let record = registry.get_stream_by_index(i as u64).await.unwrap();
        assert_eq!(&record, expected);
    }

    let err = registry.get_stream_by_index(all.len() as u64).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
}

#[tokio::test]
async fn allocation_events_are_observable() {
    let mock = MockChain::new();
    let registry = stream_registry(&mock);
    let nodes = vec![node(0x05), node(0x06)];
    let genesis_hash = B256::repeat_byte(0x07);
    registry.allocate_stream("space-1", &nodes, genesis_hash, &[]).await.unwrap();

    let events = registry.stream_allocated_events(0, mock.block_number()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].stream_id, "space-1");
    assert_eq!(events[0].nodes, nodes);
    assert_eq!(events[0].genesis_miniblock_hash, genesis_hash);

    // A range before the allocation sees nothing.
    let none = registry.stream_allocated_events(0, 0).await.unwrap();
    assert!(none.is_empty());
}

// ─── Read retries ─────────────────────────────────────────────────────────────

/// Provider whose contracts fail reads with a network error a fixed number of
/// times before delegating to the mock chain.
struct FlakyProvider {
    inner: MockChain,
    failures: Arc<AtomicU32>,
}

struct FlakyContract {
    inner: Arc<dyn BoundContract>,
    failures: Arc<AtomicU32>,
}

impl ContractProvider for FlakyProvider {
    fn bind(&self, address: Address) -> Result<Arc<dyn BoundContract>, BindingError> {
        Ok(Arc::new(FlakyContract {
            inner: self.inner.bind(address)?,
            failures: Arc::clone(&self.failures),
        }))
    }
}

#[async_trait::async_trait]
impl BoundContract for FlakyContract {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn call(
        &self,
        opts: &CallOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, BindingError> {
        if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BindingError::Network("connection reset".into()));
        }
        self.inner.call(opts, method, args).await
    }

    async fn transact(
        &self,
        opts: &TransactOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Box<dyn PendingTransaction>, BindingError> {
        self.inner.transact(opts, method, args).await
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, BindingError> {
        self.inner.filter_logs(filter).await
    }
}

#[tokio::test]
async fn snapshot_read_retries_transient_failures() {
    let mock = MockChain::new();
    let failures = Arc::new(AtomicU32::new(0));
    let factory = for_chain(31337).unwrap();
    let blockchain = Blockchain::new(
        *factory.chain(),
        Arc::new(FlakyProvider { inner: mock.clone(), failures: Arc::clone(&failures) }),
        Arc::new(MockRunner),
    );
    let settings = RegistrySettings {
        read_retries: RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        },
    };
    let registry = factory.stream_registry(&blockchain, &dev_config(), settings).unwrap();
    registry.allocate_stream("a", &[node(0x01)], B256::ZERO, &[]).await.unwrap();

    // Two transient failures are absorbed by the two configured retries.
    failures.store(2, Ordering::SeqCst);
    assert_eq!(registry.get_all_streams().await.unwrap().len(), 1);

    // Three exhaust the budget and surface as a retryable error.
    failures.store(3, Ordering::SeqCst);
    let err = registry.get_all_streams().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotCallContract);
    assert!(err.is_retryable());

    // Point reads never retry internally.
    failures.store(1, Ordering::SeqCst);
    let err = registry.get_stream("a").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotCallContract);
}

// ─── Selector and configuration ───────────────────────────────────────────────

#[test]
fn unsupported_chain_is_bad_config_not_a_panic() {
    let err = for_chain(424242).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadConfig);
}

#[test]
fn version_mismatch_is_bad_config() {
    let mock = MockChain::new();
    let blockchain = dev_blockchain(&mock);
    let cfg = ContractConfig { address: REGISTRY_ADDRESS.into(), version: "v3".into() };
    let err = for_chain(31337)
        .unwrap()
        .stream_registry(&blockchain, &cfg, RegistrySettings::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadConfig);
}

// ─── Sibling registries ───────────────────────────────────────────────────────

#[tokio::test]
async fn wallet_link_round_trip() {
    let mock = MockChain::new();
    let blockchain = dev_blockchain(&mock);
    let registry = for_chain(31337)
        .unwrap()
        .wallet_link(&blockchain, &dev_config())
        .unwrap();

    let wallet = node(0x0a);
    let root_key = node(0x0b);
    assert!(registry.get_root_key_for_wallet(wallet).await.unwrap().is_none());
    assert!(!registry.check_if_linked(wallet, root_key).await.unwrap());

    registry.link_wallet_to_root_key(wallet, root_key).await.unwrap();
    assert_eq!(registry.get_root_key_for_wallet(wallet).await.unwrap(), Some(root_key));
    assert!(registry.check_if_linked(wallet, root_key).await.unwrap());
    assert_eq!(registry.get_wallets_by_root_key(root_key).await.unwrap(), vec![wallet]);

    let err = registry.link_wallet_to_root_key(wallet, root_key).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn delegation_checks() {
    let mock = MockChain::new();
    mock.seed_delegation(node(0x10), node(0x11));
    let blockchain = dev_blockchain(&mock);
    let registry = for_chain(31337)
        .unwrap()
        .delegation(&blockchain, &dev_config())
        .unwrap();

    assert!(registry.check_delegation(node(0x10), node(0x11)).await.unwrap());
    assert!(!registry.check_delegation(node(0x10), node(0x12)).await.unwrap());

    let delegations = registry.get_delegations_by_vault(node(0x10)).await.unwrap();
    assert_eq!(delegations.len(), 1);
    assert_eq!(delegations[0].delegate, node(0x11));
    assert!(registry.get_delegations_by_vault(node(0x13)).await.unwrap().is_empty());
}

#[tokio::test]
async fn channel_reads() {
    let mock = MockChain::new();
    mock.seed_channel(chainreg_core::ChannelRecord {
        channel_id: "general".into(),
        disabled: false,
        metadata: "town square".into(),
        role_ids: vec![1, 7],
    });
    let blockchain = dev_blockchain(&mock);
    let registry = for_chain(31337)
        .unwrap()
        .channels(&blockchain, &dev_config(), RegistrySettings::default())
        .unwrap();

    let channel = registry.get_channel("general").await.unwrap();
    assert_eq!(channel.metadata, "town square");
    assert_eq!(channel.role_ids, vec![1, 7]);

    let err = registry.get_channel("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(registry.get_channels().await.unwrap().len(), 1);
}
