//! Encode and decode `Error(string)` revert payloads.
//!
//! The EVM encodes `require(cond, "message")` as
//! `0x08c379a0` ++ ABI-encode(string), where the selector is
//! `keccak256("Error(string)")[..4]`. The registry contracts signal their
//! domain errors (`NOT_FOUND`, `ALREADY_EXISTS`, `OUT_OF_BOUNDS`) this way;
//! facades decode the reason to pick an `ErrorKind`, and the mock chain
//! encodes it.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};

/// The 4-byte selector for `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Try to decode revert data as an `Error(string)` payload.
///
/// Returns `None` when the data does not match the expected format.
pub fn decode_error_string(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    match DynSolType::String.abi_decode(&data[4..]) {
        Ok(DynSolValue::String(s)) => Some(s),
        _ => None,
    }
}

/// ABI-encode a revert reason the way `require(false, message)` would.
pub fn encode_error_string(message: &str) -> Vec<u8> {
    let mut out = ERROR_STRING_SELECTOR.to_vec();
    out.extend(DynSolValue::String(message.to_owned()).abi_encode());
    out
}
