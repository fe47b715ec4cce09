use alloy::primitives::U256;

use crate::core::{counters::Counter, opcodes, trap::Trap};

use super::super::core::VM;

/// POP - Remove item from stack
pub fn pop(vm: &mut VM) -> Result<(), Trap> {
    vm.stack.pop()?;
    vm.counters.record(Counter::OpPop);
    Ok(())
}

/// PUSH1-PUSH32 - Push N bytes onto stack
pub fn push_n(vm: &mut VM, opcode: u8) -> Result<(), Trap> {
    // Get the number of bytes to push
    let num_bytes = (opcode - opcodes::PUSH1 + 1) as usize;
    vm.counters.record_push(num_bytes);

    // Get the bytes to push from bytecode; an immediate running past the end
    // of code reads as zero
    let start = vm.pc.min(vm.bytecode.len());
    let end = vm.pc.saturating_add(num_bytes).min(vm.bytecode.len());
    let mut bytes = vm.bytecode[start..end].to_vec();
    bytes.resize(num_bytes, 0);
    vm.pc += num_bytes;

    vm.stack.push(U256::from_be_slice(&bytes))
}

/// DUP1-DUP16 - Duplicate Nth stack item
pub fn dup_n(vm: &mut VM, opcode: u8) -> Result<(), Trap> {
    let index = (opcode - opcodes::DUP1 + 1) as usize;
    vm.counters.record(Counter::OpDup);
    vm.stack.dup(index)
}

/// SWAP1-SWAP16 - Exchange 1st and Nth stack items
pub fn swap_n(vm: &mut VM, opcode: u8) -> Result<(), Trap> {
    let index = (opcode - opcodes::SWAP1 + 1) as usize;
    vm.counters.record(Counter::OpSwap);
    vm.stack.swap(index)
}
