//! Contract address resolution.
//!
//! A configured contract address is either a hex address or a path to a JSON
//! deployment artifact `{ "address": "0x..." }`. Resolution validates the
//! 20-byte form and rejects the zero address; the only side effect is one
//! file read.

use std::str::FromStr;

use alloy_primitives::Address;
use chainreg_core::{ErrorKind, RegistryError, Result};
use serde::Deserialize;

#[derive(Deserialize)]
struct AddressFile {
    address: String,
}

/// Resolve a hex address or an address-file path to a validated [`Address`].
///
/// Every failure is `BadConfig`, tagged with the offending input.
pub fn resolve(address_or_path: &str) -> Result<Address> {
    const FUNC: &str = "resolve";

    if address_or_path.is_empty() {
        return Err(RegistryError::new(ErrorKind::BadConfig, FUNC, "empty contract address"));
    }

    if looks_like_address(address_or_path) {
        return parse_address(FUNC, address_or_path);
    }

    let raw = std::fs::read_to_string(address_or_path).map_err(|e| {
        RegistryError::wrap(ErrorKind::BadConfig, FUNC, "cannot read address file", e)
            .tag("input", address_or_path)
    })?;
    let file: AddressFile = serde_json::from_str(&raw).map_err(|e| {
        RegistryError::wrap(ErrorKind::BadConfig, FUNC, "cannot parse address file", e)
            .tag("input", address_or_path)
    })?;
    parse_address(FUNC, &file.address)
}

fn looks_like_address(input: &str) -> bool {
    let hex_part = input.strip_prefix("0x").unwrap_or(input);
    hex_part.len() == 40 && hex_part.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_address(func: &'static str, input: &str) -> Result<Address> {
    let address = Address::from_str(input).map_err(|e| {
        RegistryError::wrap(ErrorKind::BadConfig, func, "malformed contract address", e)
            .tag("input", input)
    })?;
    if address == Address::ZERO {
        return Err(
            RegistryError::new(ErrorKind::BadConfig, func, "contract address is the zero address")
                .tag("input", input),
        );
    }
    Ok(address)
}
