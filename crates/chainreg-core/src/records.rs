//! Records exposed by the registry facades.

use alloy_primitives::{Address, B256};

/// One stream's authoritative on-chain record.
///
/// Created once by `allocate_stream`; `last_miniblock_hash`/`last_miniblock_num`
/// are advanced by on-chain state that this layer only reads, never writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub stream_id: String,
    /// Nodes responsible for the stream, in on-chain storage order.
    pub nodes: Vec<Address>,
    pub genesis_miniblock_hash: B256,
    /// The genesis miniblock payload, when the registry stores it.
    pub genesis_miniblock: Option<Vec<u8>>,
    pub last_miniblock_hash: B256,
    pub last_miniblock_num: u64,
}

impl StreamRecord {
    /// A freshly allocated stream: last miniblock is the genesis miniblock.
    pub fn allocated(
        stream_id: impl Into<String>,
        nodes: Vec<Address>,
        genesis_miniblock_hash: B256,
        genesis_miniblock: Option<Vec<u8>>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            nodes,
            genesis_miniblock_hash,
            genesis_miniblock,
            last_miniblock_hash: genesis_miniblock_hash,
            last_miniblock_num: 0,
        }
    }
}

/// A channel definition from the channel registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub channel_id: String,
    pub disabled: bool,
    pub metadata: String,
    pub role_ids: Vec<u64>,
}

/// A wallet linked to a root key in the wallet-link registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletLinkRecord {
    pub wallet: Address,
    pub root_key: Address,
}

/// A vault-to-delegate authorization from the delegation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationRecord {
    pub vault: Address,
    pub delegate: Address,
}
