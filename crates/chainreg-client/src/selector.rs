//! Chain selection: maps a chain id to a registry factory.
//!
//! The dispatch table is closed. Supporting a new chain means adding a row
//! here; nothing else in the workspace branches on chain ids.

use chainreg_core::{
    ChainIdentity, ContractConfig, ErrorKind, RegistryError, RegistrySettings, Result,
};
use tracing::{debug, error};

use crate::blockchain::Blockchain;
use crate::channels::ChannelRegistry;
use crate::delegation::DelegationRegistry;
use crate::stream::StreamRegistry;
use crate::wallet_link::WalletLinkRegistry;

/// Chains this build knows how to talk to, with the contract interface
/// version deployed on each.
pub const SUPPORTED_CHAINS: &[(ChainIdentity, &str)] = &[
    (ChainIdentity { chain_id: 31337, env: "localhost" }, "dev"),
    (ChainIdentity { chain_id: 5, env: "goerli" }, "v3"),
    (ChainIdentity { chain_id: 11_155_111, env: "sepolia" }, "v3"),
    (ChainIdentity { chain_id: 84_531, env: "base-goerli" }, "v3"),
];

/// Look up the factory for a chain id.
///
/// Pure function of the id. An unsupported id is a configuration error for
/// the caller to handle; it never terminates the process.
pub fn for_chain(chain_id: u64) -> Result<RegistryFactory> {
    match SUPPORTED_CHAINS.iter().find(|(chain, _)| chain.chain_id == chain_id) {
        Some(&(chain, version)) => {
            debug!(chain_id, env = chain.env, version, "selected registry factory");
            Ok(RegistryFactory { chain, version })
        }
        None => {
            error!(chain_id, "unsupported chain id");
            Err(RegistryError::new(ErrorKind::BadConfig, "for_chain", "unsupported chain id")
                .tag("chain_id", chain_id))
        }
    }
}

/// Constructs the registry facades for one supported chain.
///
/// Centralizes the chain-id → concrete-facade dispatch so callers never
/// branch on chain ids themselves.
#[derive(Debug, Clone, Copy)]
pub struct RegistryFactory {
    chain: ChainIdentity,
    version: &'static str,
}

impl RegistryFactory {
    pub fn chain(&self) -> &ChainIdentity {
        &self.chain
    }

    /// Contract interface version expected on this chain.
    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn stream_registry(
        &self,
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        settings: RegistrySettings,
    ) -> Result<StreamRegistry> {
        StreamRegistry::new(blockchain, cfg, self.version, settings)
    }

    pub fn wallet_link(
        &self,
        blockchain: &Blockchain,
        cfg: &ContractConfig,
    ) -> Result<WalletLinkRegistry> {
        WalletLinkRegistry::new(blockchain, cfg, self.version)
    }

    pub fn delegation(
        &self,
        blockchain: &Blockchain,
        cfg: &ContractConfig,
    ) -> Result<DelegationRegistry> {
        DelegationRegistry::new(blockchain, cfg, self.version)
    }

    pub fn channels(
        &self,
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        settings: RegistrySettings,
    ) -> Result<ChannelRegistry> {
        ChannelRegistry::new(blockchain, cfg, self.version, settings)
    }
}
