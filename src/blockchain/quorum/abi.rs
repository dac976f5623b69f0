use ethers::types::{Address, U256};
use sha3::{Digest, Keccak256};

use crate::core::WalletError;

/// Compute the first 4 bytes (function selector) from a signature string, e.g. "transfer(address,uint256)".
pub fn selector_from_signature(signature: &str) -> [u8; 4] {
    let mut keccak = Keccak256::new();
    keccak.update(signature.as_bytes());
    let out = keccak.finalize();
    [out[0], out[1], out[2], out[3]]
}

/// Left-pads an address into a 32-byte ABI word.
pub fn abi_word_address(address: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    out
}

/// Big-endian 32-byte ABI word.
pub fn abi_word_uint256(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Pack a selector and ABI words contiguously into calldata.
pub fn abi_pack(selector: [u8; 4], words: &[[u8; 32]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 32 * words.len());
    out.extend_from_slice(&selector);
    for w in words {
        out.extend_from_slice(w);
    }
    out
}

/// Calldata of ERC-20 `balanceOf(owner)`.
pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    abi_pack(selector_from_signature("balanceOf(address)"), &[abi_word_address(owner)])
}

/// Calldata of ERC-20 `transfer(to, amount)`.
pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    abi_pack(
        selector_from_signature("transfer(address,uint256)"),
        &[abi_word_address(to), abi_word_uint256(amount)],
    )
}

/// Reads the first return word as a uint256.
pub fn decode_uint256(data: &[u8]) -> Result<U256, WalletError> {
    if data.len() < 32 {
        return Err(WalletError::BlockchainError(format!(
            "unexpected contract return data length {}",
            data.len()
        )));
    }
    Ok(U256::from_big_endian(&data[..32]))
}
