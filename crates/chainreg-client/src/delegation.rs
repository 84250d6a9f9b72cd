//! The delegation registry facade. Read-only in this layer.

use std::sync::Arc;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::Address;
use chainreg_core::binding::{BoundContract, CallOpts};
use chainreg_core::{ContractConfig, DelegationRecord, Result};

use crate::blockchain::Blockchain;
use crate::facade::{bind_registry, malformed, map_binding_error, single};

const M_DELEGATIONS_BY_VAULT: &str = "getDelegatesForAll";
const M_CHECK_DELEGATION: &str = "checkDelegateForAll";

/// Facade over the delegation registry contract on one chain.
pub struct DelegationRegistry {
    blockchain: Blockchain,
    contract: Arc<dyn BoundContract>,
}

impl DelegationRegistry {
    pub fn new(
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        expected_version: &str,
    ) -> Result<Self> {
        let contract = bind_registry("DelegationRegistry::new", blockchain, cfg, expected_version)?;
        Ok(Self { blockchain: blockchain.clone(), contract })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Every delegate authorized by `vault`.
    pub async fn get_delegations_by_vault(&self, vault: Address) -> Result<Vec<DelegationRecord>> {
        const FUNC: &str = "GetDelegationsByVault";
        let out = self
            .contract
            .call(&CallOpts::default(), M_DELEGATIONS_BY_VAULT, &[DynSolValue::Address(vault)])
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("vault", vault))?;
        single(FUNC, out)?
            .as_array()
            .ok_or_else(|| malformed(FUNC))?
            .iter()
            .map(|v| {
                let delegate = v.as_address().ok_or_else(|| malformed(FUNC))?;
                Ok(DelegationRecord { vault, delegate })
            })
            .collect()
    }

    /// Whether `delegate` is authorized to act for `vault`.
    pub async fn check_delegation(&self, vault: Address, delegate: Address) -> Result<bool> {
        const FUNC: &str = "CheckDelegation";
        let args = [DynSolValue::Address(delegate), DynSolValue::Address(vault)];
        let out = self
            .contract
            .call(&CallOpts::default(), M_CHECK_DELEGATION, &args)
            .await
            .map_err(|e| {
                map_binding_error(FUNC, self.address(), e)
                    .tag("vault", vault)
                    .tag("delegate", delegate)
            })?;
        single(FUNC, out)?.as_bool().ok_or_else(|| malformed(FUNC))
    }
}

impl std::fmt::Debug for DelegationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegationRegistry")
            .field("chain", self.blockchain.chain())
            .field("address", &self.contract.address())
            .finish_non_exhaustive()
    }
}
