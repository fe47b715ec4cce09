//! Linear Poseidon hashing of contract bytecode.
//!
//! The state tree commits to contract code with an arithmetization-friendly
//! hash rather than Keccak-256: code is padded to 56-byte blocks and
//! absorbed through the Goldilocks Poseidon sponge, seven bytes per field
//! element. EXTCODEHASH and the state-tree collaborator must agree on this
//! routine bit for bit.

use alloy::primitives::{B256, U256};
use lazy_static::lazy_static;
use plonky2::field::goldilocks_field::GoldilocksField;
use plonky2::field::types::{Field, PrimeField64};
use plonky2::hash::poseidon::{self, Poseidon};

type F = GoldilocksField;

lazy_static! {
    /// Hash of the empty code blob. EXTCODEHASH never surfaces this (empty
    /// accounts read as zero); the state tree uses it for fresh accounts.
    pub static ref EMPTY_CODE_HASH: B256 = hash_bytecode(&[]);
}

/// Hashes contract bytecode with the linear Poseidon sponge used by the
/// state tree.
pub fn hash_bytecode(code: &[u8]) -> B256 {
    let mut padded = code.to_vec();
    pad_bytecode(&mut padded);

    let mut capacity = [F::ZERO; poseidon::SPONGE_CAPACITY];
    let mut arr = [F::ZERO; poseidon::SPONGE_WIDTH];
    for block in padded.chunks_exact(poseidon::SPONGE_RATE * 7) {
        for (i, limb) in block.chunks_exact(7).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..7].copy_from_slice(limb);
            arr[i] = F::from_canonical_u64(u64::from_le_bytes(bytes));
        }
        arr[poseidon::SPONGE_RATE..poseidon::SPONGE_WIDTH].copy_from_slice(&capacity);
        capacity = F::poseidon(arr)[..poseidon::SPONGE_CAPACITY]
            .try_into()
            .expect("impossible case: permutation output is at least the capacity width");
    }

    let limbs = capacity.map(|element| element.to_canonical_u64());
    B256::from(U256::from_limbs(limbs))
}

/// Pads code to a whole number of 56-byte sponge blocks: append 0x01, zero
/// fill, then set the top bit of the final byte.
fn pad_bytecode(bytes: &mut Vec<u8>) {
    bytes.push(0x01);
    while bytes.len() % 56 != 0 {
        bytes.push(0x00);
    }
    *bytes.last_mut().expect("impossible case: padding pushed at least one byte") |= 0x80;
}
