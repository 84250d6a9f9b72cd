//! The channel registry facade. Point read plus a retried snapshot read,
//! mirroring the stream registry's read discipline.

use std::sync::Arc;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::Address;
use chainreg_core::binding::{BoundContract, CallOpts};
use chainreg_core::{ChannelRecord, ContractConfig, RegistrySettings, Result, RetryPolicy};
use tracing::warn;

use crate::blockchain::Blockchain;
use crate::facade::{bind_registry, decode_channel, malformed, map_binding_error, single};

const M_GET_CHANNEL: &str = "getChannel";
const M_GET_CHANNELS: &str = "getChannels";

/// Facade over the channel registry contract on one chain.
pub struct ChannelRegistry {
    blockchain: Blockchain,
    contract: Arc<dyn BoundContract>,
    read_retries: RetryPolicy,
}

impl ChannelRegistry {
    pub fn new(
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        expected_version: &str,
        settings: RegistrySettings,
    ) -> Result<Self> {
        let contract = bind_registry("ChannelRegistry::new", blockchain, cfg, expected_version)?;
        Ok(Self {
            blockchain: blockchain.clone(),
            contract,
            read_retries: RetryPolicy::new(settings.read_retries),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Fetch one channel by id. Unknown id ⇒ `NotFound`.
    pub async fn get_channel(&self, channel_id: &str) -> Result<ChannelRecord> {
        const FUNC: &str = "GetChannel";
        let out = self
            .contract
            .call(
                &CallOpts::default(),
                M_GET_CHANNEL,
                &[DynSolValue::String(channel_id.to_owned())],
            )
            .await
            .map_err(|e| {
                map_binding_error(FUNC, self.address(), e).tag("channelId", channel_id)
            })?;
        decode_channel(FUNC, &single(FUNC, out)?)
    }

    /// Snapshot of every channel, retried on transient adapter failures.
    pub async fn get_channels(&self) -> Result<Vec<ChannelRecord>> {
        const FUNC: &str = "GetChannels";
        let mut attempt = 0u32;
        loop {
            match self.contract.call(&CallOpts::default(), M_GET_CHANNELS, &[]).await {
                Ok(out) => {
                    return single(FUNC, out)?
                        .as_array()
                        .ok_or_else(|| malformed(FUNC))?
                        .iter()
                        .map(|v| decode_channel(FUNC, v))
                        .collect();
                }
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    match self.read_retries.next_delay(attempt) {
                        Some(delay) => {
                            warn!(attempt, ?delay, error = %e, "retrying channel snapshot read");
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(map_binding_error(FUNC, self.address(), e)),
                    }
                }
                Err(e) => return Err(map_binding_error(FUNC, self.address(), e)),
            }
        }
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("chain", self.blockchain.chain())
            .field("address", &self.contract.address())
            .finish_non_exhaustive()
    }
}
