//! The stream registry facade.
//!
//! Wraps the on-chain stream registry: allocation (write) plus point reads,
//! snapshot reads and the `StreamAllocated` event feed. All chain access goes
//! through the [`BoundContract`] the constructor bound; writes go through the
//! blockchain's [`TransactionRunner`](chainreg_core::TransactionRunner).

use std::sync::Arc;

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, B256, U256};
use chainreg_core::binding::{BoundContract, CallOpts, LogFilter};
use chainreg_core::{
    ContractConfig, ErrorKind, RegistryError, RegistrySettings, Result, RetryPolicy, StreamRecord,
};
use tracing::{debug, warn};

use crate::blockchain::Blockchain;
use crate::facade::{
    bind_registry, check_receipt, decode_stream, malformed, map_binding_error, single,
};

// Wire method names, per the deployed StreamRegistry ABI.
const M_ALLOCATE_STREAM: &str = "allocateStream";
const M_GET_STREAM: &str = "getStream";
const M_GET_STREAMS_LENGTH: &str = "getStreamsLength";
const M_GET_STREAM_BY_INDEX: &str = "getStreamByIndex";
const M_GET_ALL_STREAMS: &str = "getAllStreams";

/// A `StreamAllocated(string,address[],bytes32)` event unpacked from a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamAllocated {
    pub stream_id: String,
    pub nodes: Vec<Address>,
    pub genesis_miniblock_hash: B256,
    pub block_number: u64,
    pub tx_hash: B256,
}

/// Topic0 of the `StreamAllocated` event.
pub fn stream_allocated_topic() -> B256 {
    keccak256("StreamAllocated(string,address[],bytes32)".as_bytes())
}

/// Facade over the stream registry contract on one chain.
pub struct StreamRegistry {
    blockchain: Blockchain,
    contract: Arc<dyn BoundContract>,
    read_retries: RetryPolicy,
}

impl StreamRegistry {
    /// Bind the stream registry at the configured address.
    ///
    /// Fails with `BadConfig` on a version mismatch, an unresolvable address
    /// or a bind failure; a constructed facade is ready for calls.
    pub fn new(
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        expected_version: &str,
        settings: RegistrySettings,
    ) -> Result<Self> {
        let contract = bind_registry("StreamRegistry::new", blockchain, cfg, expected_version)?;
        Ok(Self {
            blockchain: blockchain.clone(),
            contract,
            read_retries: RetryPolicy::new(settings.read_retries),
        })
    }

    /// The address this facade is bound at.
    pub fn address(&self) -> Address {
        self.contract.address()
    }

    // ─── Writes ───────────────────────────────────────────────────────────────

    /// Register a new stream and block until the chain includes the
    /// transaction.
    ///
    /// Allocating a stream id that already exists fails with `AlreadyExists`;
    /// the registry never overwrites. Dropping the future cancels the wait,
    /// not the transaction.
    pub async fn allocate_stream(
        &self,
        stream_id: &str,
        nodes: &[Address],
        genesis_miniblock_hash: B256,
        genesis_miniblock: &[u8],
    ) -> Result<()> {
        const FUNC: &str = "AllocateStream";

        if stream_id.is_empty() {
            return Err(RegistryError::new(ErrorKind::BadArgument, FUNC, "empty stream id"));
        }
        if nodes.is_empty() {
            return Err(RegistryError::new(ErrorKind::BadArgument, FUNC, "no nodes for stream")
                .tag("streamId", stream_id));
        }

        let args = [
            DynSolValue::String(stream_id.to_owned()),
            DynSolValue::Array(nodes.iter().map(|n| DynSolValue::Address(*n)).collect()),
            DynSolValue::FixedBytes(genesis_miniblock_hash, 32),
            DynSolValue::Bytes(genesis_miniblock.to_vec()),
        ];
        debug!(
            chain = %self.blockchain.chain(),
            stream_id,
            nodes = nodes.len(),
            "submitting stream allocation"
        );

        let receipt = self
            .blockchain
            .runner()
            .submit_and_wait(self.contract.as_ref(), M_ALLOCATE_STREAM, &args)
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("streamId", stream_id))?;
        check_receipt(FUNC, self.address(), &receipt)
            .map_err(|e| e.tag("streamId", stream_id))?;

        debug!(
            stream_id,
            tx = %receipt.tx_hash,
            block = receipt.block_number,
            "stream allocation confirmed"
        );
        Ok(())
    }

    // ─── Reads ────────────────────────────────────────────────────────────────

    /// Fetch one stream by id. Unknown id ⇒ `NotFound`.
    pub async fn get_stream(&self, stream_id: &str) -> Result<StreamRecord> {
        const FUNC: &str = "GetStream";
        let out = self
            .contract
            .call(&CallOpts::default(), M_GET_STREAM, &[DynSolValue::String(stream_id.to_owned())])
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("streamId", stream_id))?;
        decode_stream(FUNC, &single(FUNC, out)?)
    }

    /// Number of registered streams.
    pub async fn get_stream_count(&self) -> Result<i64> {
        const FUNC: &str = "GetStreamCount";
        let out = self
            .contract
            .call(&CallOpts::default(), M_GET_STREAMS_LENGTH, &[])
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e))?;
        let (raw, _) = single(FUNC, out)?
            .as_uint()
            .ok_or_else(|| malformed(FUNC))?;
        i64::try_from(raw).map_err(|_| {
            RegistryError::new(ErrorKind::Internal, FUNC, "stream count exceeds i64")
                .tag("count", raw)
        })
    }

    /// Fetch the stream at a storage index. Index past the end ⇒ `OutOfBounds`.
    pub async fn get_stream_by_index(&self, index: u64) -> Result<StreamRecord> {
        const FUNC: &str = "GetStreamByIndex";
        let out = self
            .contract
            .call(
                &CallOpts::default(),
                M_GET_STREAM_BY_INDEX,
                &[DynSolValue::Uint(U256::from(index), 256)],
            )
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("index", index))?;
        decode_stream(FUNC, &single(FUNC, out)?)
    }

    /// Snapshot of every registered stream, in storage order, from a single
    /// round trip. Retries transient adapter failures per the configured
    /// backoff.
    pub async fn get_all_streams(&self) -> Result<Vec<StreamRecord>> {
        const FUNC: &str = "GetAllStreams";
        let mut attempt = 0u32;
        loop {
            let result = self
                .contract
                .call(&CallOpts::default(), M_GET_ALL_STREAMS, &[])
                .await;
            match result {
                Ok(out) => {
                    return single(FUNC, out)?
                        .as_array()
                        .ok_or_else(|| malformed(FUNC))?
                        .iter()
                        .map(|v| decode_stream(FUNC, v))
                        .collect();
                }
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    match self.read_retries.next_delay(attempt) {
                        Some(delay) => {
                            warn!(attempt, ?delay, error = %e, "retrying stream snapshot read");
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(map_binding_error(FUNC, self.address(), e)),
                    }
                }
                Err(e) => return Err(map_binding_error(FUNC, self.address(), e)),
            }
        }
    }

    // ─── Events ───────────────────────────────────────────────────────────────

    /// Fetch `StreamAllocated` events over a block range.
    pub async fn stream_allocated_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<StreamAllocated>> {
        const FUNC: &str = "StreamAllocatedEvents";
        let filter = LogFilter {
            from_block,
            to_block,
            address: Some(self.address()),
            topics: vec![stream_allocated_topic()],
        };
        let logs = self
            .contract
            .filter_logs(&filter)
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e))?;

        let schema = DynSolType::Tuple(vec![
            DynSolType::String,
            DynSolType::Array(Box::new(DynSolType::Address)),
            DynSolType::FixedBytes(32),
        ]);
        logs.iter()
            .map(|log| {
                let decoded = schema
                    .abi_decode_params(&log.data)
                    .map_err(|e| malformed(FUNC).tag("decode", e))?;
                let fields = decoded.as_tuple().ok_or_else(|| malformed(FUNC))?;
                let [id, nodes, genesis_hash] = fields else {
                    return Err(malformed(FUNC).tag("fields", fields.len()));
                };
                Ok(StreamAllocated {
                    stream_id: id.as_str().ok_or_else(|| malformed(FUNC))?.to_owned(),
                    nodes: nodes
                        .as_array()
                        .ok_or_else(|| malformed(FUNC))?
                        .iter()
                        .map(|v| v.as_address().ok_or_else(|| malformed(FUNC)))
                        .collect::<Result<_>>()?,
                    genesis_miniblock_hash: match genesis_hash.as_fixed_bytes() {
                        Some((bytes, 32)) => B256::from_slice(bytes),
                        _ => return Err(malformed(FUNC)),
                    },
                    block_number: log.block_number,
                    tx_hash: log.tx_hash,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("chain", self.blockchain.chain())
            .field("address", &self.contract.address())
            .finish_non_exhaustive()
    }
}
