//! Typed configuration handed to facade constructors.
//!
//! Config *loading* (files, env) is the host's job; this layer only consumes
//! plain structs.

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// A chain id paired with its environment label.
///
/// Selection of a facade implementation is a pure function of the chain id;
/// the label exists for logs and CLI output only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainIdentity {
    pub chain_id: u64,
    pub env: &'static str,
}

impl std::fmt::Display for ChainIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.env, self.chain_id)
    }
}

/// Where and which version of a registry contract to bind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Hex address, or a filesystem path to a JSON file `{ "address": "0x..." }`.
    pub address: String,
    /// Expected contract interface version (e.g. `"dev"`, `"v3"`). Each facade
    /// is hard-bound to one version; a mismatch is a configuration error.
    pub version: String,
}

/// Tunables for registry reads.
#[derive(Debug, Clone, Default)]
pub struct RegistrySettings {
    /// Backoff applied to snapshot reads (`get_all_streams`, `get_channels`)
    /// when the adapter reports a retryable failure. Point reads never retry
    /// internally.
    pub read_retries: RetryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_identity_display() {
        let chain = ChainIdentity { chain_id: 31337, env: "localhost" };
        assert_eq!(chain.to_string(), "localhost (31337)");
    }

    #[test]
    fn contract_config_deserializes() {
        let cfg: ContractConfig =
            serde_json::from_str(r#"{"address": "0xAAAA", "version": "dev"}"#).unwrap();
        assert_eq!(cfg.address, "0xAAAA");
        assert_eq!(cfg.version, "dev");
    }
}
