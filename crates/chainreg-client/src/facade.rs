//! Shared facade plumbing: binding-error normalization and output decoding.
//!
//! Every registry contract in this family signals its domain errors as
//! `Error(string)` reverts with a fixed reason constant; the mapping from
//! reason to [`ErrorKind`] lives here so all facades classify identically.

use std::sync::Arc;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use chainreg_core::binding::{BindingError, BoundContract, TransactionReceipt, TxStatus};
use chainreg_core::revert::decode_error_string;
use chainreg_core::{
    ChannelRecord, ContractConfig, ErrorKind, RegistryError, Result, StreamRecord,
};
use tracing::info;

use crate::blockchain::Blockchain;
use crate::resolver::resolve;

/// Revert reasons the registry contracts use for domain errors.
pub const REASON_NOT_FOUND: &str = "NOT_FOUND";
pub const REASON_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const REASON_OUT_OF_BOUNDS: &str = "OUT_OF_BOUNDS";

fn kind_for_reason(reason: &str) -> ErrorKind {
    match reason {
        REASON_NOT_FOUND => ErrorKind::NotFound,
        REASON_ALREADY_EXISTS => ErrorKind::AlreadyExists,
        REASON_OUT_OF_BOUNDS => ErrorKind::OutOfBounds,
        _ => ErrorKind::CannotCallContract,
    }
}

/// Wrap an adapter error exactly once, classifying known revert reasons.
pub(crate) fn map_binding_error(
    func: &'static str,
    address: Address,
    err: BindingError,
) -> RegistryError {
    if let BindingError::Reverted { data } = &err {
        if let Some(reason) = decode_error_string(data) {
            return RegistryError::new(kind_for_reason(&reason), func, "contract reverted")
                .tag("reason", reason)
                .tag("address", address);
        }
    }
    let kind = match err {
        BindingError::Cancelled => ErrorKind::Cancelled,
        _ => ErrorKind::CannotCallContract,
    };
    RegistryError::wrap(kind, func, "smart contract call failed", err).tag("address", address)
}

/// Turn a mined receipt into success or a classified error.
pub(crate) fn check_receipt(
    func: &'static str,
    address: Address,
    receipt: &TransactionReceipt,
) -> Result<()> {
    match receipt.status {
        TxStatus::Success => Ok(()),
        TxStatus::Failed => {
            let kind = receipt
                .revert_data
                .as_deref()
                .and_then(decode_error_string)
                .map(|r| kind_for_reason(&r))
                .unwrap_or(ErrorKind::CannotCallContract);
            Err(RegistryError::new(kind, func, "transaction failed")
                .tag("tx", receipt.tx_hash)
                .tag("address", address))
        }
    }
}

/// Shared facade construction: resolve the address, enforce the version the
/// chain expects, bind through the provider.
pub(crate) fn bind_registry(
    func: &'static str,
    blockchain: &Blockchain,
    cfg: &ContractConfig,
    expected_version: &str,
) -> Result<Arc<dyn BoundContract>> {
    if cfg.version != expected_version {
        return Err(RegistryError::new(ErrorKind::BadConfig, func, "contract version mismatch")
            .tag("configured", &cfg.version)
            .tag("expected", expected_version)
            .tag("address", &cfg.address));
    }
    let address = resolve(&cfg.address)?;
    let contract = blockchain
        .provider()
        .bind(address)
        .map_err(|e| {
            RegistryError::wrap(ErrorKind::BadConfig, func, "cannot bind contract", e)
                .tag("address", address)
        })?;
    info!(
        chain = %blockchain.chain(),
        %address,
        version = expected_version,
        "registry contract bound"
    );
    Ok(contract)
}

// ─── Output decoding ──────────────────────────────────────────────────────────

pub(crate) fn malformed(func: &'static str) -> RegistryError {
    RegistryError::new(ErrorKind::Internal, func, "malformed contract output")
}

/// Expect exactly one output value from a call.
pub(crate) fn single(func: &'static str, out: Vec<DynSolValue>) -> Result<DynSolValue> {
    let mut out = out;
    match out.len() {
        1 => Ok(out.remove(0)),
        _ => Err(malformed(func).tag("outputs", out.len())),
    }
}

pub(crate) fn as_string(func: &'static str, value: &DynSolValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| malformed(func))
}

pub(crate) fn as_b256(func: &'static str, value: &DynSolValue) -> Result<B256> {
    match value.as_fixed_bytes() {
        Some((bytes, 32)) => Ok(B256::from_slice(bytes)),
        _ => Err(malformed(func)),
    }
}

pub(crate) fn as_u64(func: &'static str, value: &DynSolValue) -> Result<u64> {
    let (raw, _) = value.as_uint().ok_or_else(|| malformed(func))?;
    u64::try_from(raw).map_err(|_| malformed(func).tag("value", raw))
}

pub(crate) fn as_bool(func: &'static str, value: &DynSolValue) -> Result<bool> {
    value.as_bool().ok_or_else(|| malformed(func))
}

pub(crate) fn as_address_vec(func: &'static str, value: &DynSolValue) -> Result<Vec<Address>> {
    value
        .as_array()
        .ok_or_else(|| malformed(func))?
        .iter()
        .map(|v| v.as_address().ok_or_else(|| malformed(func)))
        .collect()
}

/// Decode one stream tuple:
/// `(string streamId, address[] nodes, bytes32 genesisMiniblockHash,
///   bytes genesisMiniblock, bytes32 lastMiniblockHash, uint64 lastMiniblockNum)`.
pub(crate) fn decode_stream(func: &'static str, value: &DynSolValue) -> Result<StreamRecord> {
    let fields = value.as_tuple().ok_or_else(|| malformed(func))?;
    let [id, nodes, genesis_hash, genesis_block, last_hash, last_num] = fields else {
        return Err(malformed(func).tag("fields", fields.len()));
    };
    let genesis_miniblock = as_bytes_vec(func, genesis_block)?;
    Ok(StreamRecord {
        stream_id: as_string(func, id)?,
        nodes: as_address_vec(func, nodes)?,
        genesis_miniblock_hash: as_b256(func, genesis_hash)?,
        genesis_miniblock: if genesis_miniblock.is_empty() {
            None
        } else {
            Some(genesis_miniblock)
        },
        last_miniblock_hash: as_b256(func, last_hash)?,
        last_miniblock_num: as_u64(func, last_num)?,
    })
}

fn as_bytes_vec(func: &'static str, value: &DynSolValue) -> Result<Vec<u8>> {
    value
        .as_bytes()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| malformed(func))
}

/// Decode one channel tuple:
/// `(string channelId, bool disabled, string metadata, uint64[] roleIds)`.
pub(crate) fn decode_channel(func: &'static str, value: &DynSolValue) -> Result<ChannelRecord> {
    let fields = value.as_tuple().ok_or_else(|| malformed(func))?;
    let [id, disabled, metadata, role_ids] = fields else {
        return Err(malformed(func).tag("fields", fields.len()));
    };
    let role_ids = role_ids
        .as_array()
        .ok_or_else(|| malformed(func))?
        .iter()
        .map(|v| as_u64(func, v))
        .collect::<Result<Vec<u64>>>()?;
    Ok(ChannelRecord {
        channel_id: as_string(func, id)?,
        disabled: as_bool(func, disabled)?,
        metadata: as_string(func, metadata)?,
        role_ids,
    })
}
