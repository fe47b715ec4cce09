use alloy::primitives::{keccak256, U256};

use crate::core::{counters::Counter, trap::Trap};

use super::super::core::VM;

/// SHA3 - Compute Keccak-256 hash of a memory slice
pub fn sha3(vm: &mut VM) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;

    let offset = VM::word_to_usize(offset)?;
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpSha3, size);

    // consume dynamic gas
    let keccak_word = vm.spec.gas.keccak_word as u128;
    let minimum_word_size = size.div_ceil(32) as u128;
    let gas_cost = keccak_word * minimum_word_size + vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "sha3")?;
    vm.memory.extend(offset as u128, size as u128);

    let data = vm.memory.read(offset, size);
    vm.stack.push(U256::from_be_bytes(keccak256(data).0))
}
