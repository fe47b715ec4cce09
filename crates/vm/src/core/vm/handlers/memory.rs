use alloy::primitives::U256;

use crate::core::{counters::Counter, trap::Trap};

use super::super::core::VM;

/// MLOAD - Load word from memory
pub fn mload(vm: &mut VM) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let offset = VM::word_to_usize(offset)?;
    vm.counters.record(Counter::OpMload);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, 32);
    vm.consume_gas(gas_cost, "mload")?;
    vm.memory.extend(offset as u128, 32);

    let value = U256::from_be_slice(vm.memory.read(offset, 32).as_slice());
    vm.stack.push(value)
}

/// MSTORE - Save word to memory
pub fn mstore(vm: &mut VM) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    let offset = VM::word_to_usize(offset)?;
    vm.counters.record(Counter::OpMstore);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, 32);
    vm.consume_gas(gas_cost, "mstore")?;

    vm.memory.store(offset, 32, &value.to_be_bytes_vec());
    Ok(())
}

/// MSTORE8 - Save byte to memory
pub fn mstore8(vm: &mut VM) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    let offset = VM::word_to_usize(offset)?;
    vm.counters.record(Counter::OpMstore8);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, 1);
    vm.consume_gas(gas_cost, "mstore8")?;

    vm.memory.store(offset, 1, &[value.to_be_bytes::<32>()[31]]);
    Ok(())
}

/// MSIZE - Get the size of touched memory in bytes
pub fn msize(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpMsize);
    let size = U256::from(vm.memory.word_count() * 32);
    vm.stack.push(size)
}
