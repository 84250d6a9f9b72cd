//! The wallet-link registry facade.
//!
//! Maps wallets to the root key that owns them. Same construction and error
//! discipline as [`crate::stream::StreamRegistry`]; one write, three reads.

use std::sync::Arc;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::Address;
use chainreg_core::binding::{BoundContract, CallOpts};
use chainreg_core::{ContractConfig, Result};
use tracing::debug;

use crate::blockchain::Blockchain;
use crate::facade::{
    as_address_vec, bind_registry, check_receipt, malformed, map_binding_error, single,
};

const M_LINK_WALLET: &str = "linkWalletToRootKey";
const M_WALLETS_BY_ROOT_KEY: &str = "getWalletsByRootKey";
const M_ROOT_KEY_FOR_WALLET: &str = "getRootKeyForWallet";
const M_CHECK_IF_LINKED: &str = "checkIfLinked";

/// Facade over the wallet-link registry contract on one chain.
pub struct WalletLinkRegistry {
    blockchain: Blockchain,
    contract: Arc<dyn BoundContract>,
}

impl WalletLinkRegistry {
    pub fn new(
        blockchain: &Blockchain,
        cfg: &ContractConfig,
        expected_version: &str,
    ) -> Result<Self> {
        let contract = bind_registry("WalletLinkRegistry::new", blockchain, cfg, expected_version)?;
        Ok(Self { blockchain: blockchain.clone(), contract })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Link `wallet` to `root_key`, blocking until inclusion.
    ///
    /// A wallet already linked to any root key fails with `AlreadyExists`.
    pub async fn link_wallet_to_root_key(&self, wallet: Address, root_key: Address) -> Result<()> {
        const FUNC: &str = "LinkWalletToRootKey";
        let args = [DynSolValue::Address(wallet), DynSolValue::Address(root_key)];
        let receipt = self
            .blockchain
            .runner()
            .submit_and_wait(self.contract.as_ref(), M_LINK_WALLET, &args)
            .await
            .map_err(|e| {
                map_binding_error(FUNC, self.address(), e)
                    .tag("wallet", wallet)
                    .tag("rootKey", root_key)
            })?;
        check_receipt(FUNC, self.address(), &receipt)?;
        debug!(%wallet, %root_key, tx = %receipt.tx_hash, "wallet link confirmed");
        Ok(())
    }

    /// All wallets linked to `root_key`, in on-chain order.
    pub async fn get_wallets_by_root_key(&self, root_key: Address) -> Result<Vec<Address>> {
        const FUNC: &str = "GetWalletsByRootKey";
        let out = self
            .contract
            .call(&CallOpts::default(), M_WALLETS_BY_ROOT_KEY, &[DynSolValue::Address(root_key)])
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("rootKey", root_key))?;
        as_address_vec(FUNC, &single(FUNC, out)?)
    }

    /// The root key `wallet` is linked to, or `None` for an unlinked wallet
    /// (the contract returns the zero address).
    pub async fn get_root_key_for_wallet(&self, wallet: Address) -> Result<Option<Address>> {
        const FUNC: &str = "GetRootKeyForWallet";
        let out = self
            .contract
            .call(&CallOpts::default(), M_ROOT_KEY_FOR_WALLET, &[DynSolValue::Address(wallet)])
            .await
            .map_err(|e| map_binding_error(FUNC, self.address(), e).tag("wallet", wallet))?;
        let root_key = single(FUNC, out)?
            .as_address()
            .ok_or_else(|| malformed(FUNC))?;
        Ok((root_key != Address::ZERO).then_some(root_key))
    }

    /// Whether `wallet` is linked to `root_key` specifically.
    pub async fn check_if_linked(&self, wallet: Address, root_key: Address) -> Result<bool> {
        const FUNC: &str = "CheckIfLinked";
        let args = [DynSolValue::Address(root_key), DynSolValue::Address(wallet)];
        let out = self
            .contract
            .call(&CallOpts::default(), M_CHECK_IF_LINKED, &args)
            .await
            .map_err(|e| {
                map_binding_error(FUNC, self.address(), e)
                    .tag("wallet", wallet)
                    .tag("rootKey", root_key)
            })?;
        single(FUNC, out)?.as_bool().ok_or_else(|| malformed(FUNC))
    }
}

impl std::fmt::Debug for WalletLinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletLinkRegistry")
            .field("chain", self.blockchain.chain())
            .field("address", &self.contract.address())
            .finish_non_exhaustive()
    }
}
