//! Handle to one chain: identity plus the capability objects the facades
//! need to reach it.

use std::sync::Arc;

use chainreg_core::{ChainIdentity, ContractProvider, TransactionRunner};

/// Everything a facade needs to talk to one chain.
///
/// Cheap to clone; the provider and runner are shared.
#[derive(Clone)]
pub struct Blockchain {
    chain: ChainIdentity,
    provider: Arc<dyn ContractProvider>,
    runner: Arc<dyn TransactionRunner>,
}

impl Blockchain {
    pub fn new(
        chain: ChainIdentity,
        provider: Arc<dyn ContractProvider>,
        runner: Arc<dyn TransactionRunner>,
    ) -> Self {
        Self { chain, provider, runner }
    }

    pub fn chain(&self) -> &ChainIdentity {
        &self.chain
    }

    pub fn chain_id(&self) -> u64 {
        self.chain.chain_id
    }

    pub fn provider(&self) -> &Arc<dyn ContractProvider> {
        &self.provider
    }

    pub fn runner(&self) -> &Arc<dyn TransactionRunner> {
        &self.runner
    }
}

impl std::fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blockchain").field("chain", &self.chain).finish_non_exhaustive()
    }
}
