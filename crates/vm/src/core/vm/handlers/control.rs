use alloy::primitives::U256;

use crate::core::{counters::Counter, env::Environment, trap::Trap};

use super::super::core::VM;

/// STOP - Halt execution with empty output
pub fn stop(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record_termination(Counter::OpStop, 0);
    env.finish(Vec::new());
    Err(Trap::Stop)
}

/// JUMP - Alter the program counter to a JUMPDEST
pub fn jump(vm: &mut VM) -> Result<(), Trap> {
    let dest = vm.stack.pop()?;
    vm.counters.record(Counter::OpJump);

    let dest: usize = dest.try_into().map_err(|_| Trap::InvalidJump)?;
    if dest >= vm.bytecode.len() || !vm.jumpmap.is_jumpdest(dest) {
        return Err(Trap::InvalidJump);
    }

    vm.pc = dest;
    Ok(())
}

/// JUMPI - Conditionally alter the program counter
pub fn jumpi(vm: &mut VM) -> Result<(), Trap> {
    let dest = vm.stack.pop()?;
    let condition = vm.stack.pop()?;
    vm.counters.record(Counter::OpJumpi);

    if condition.is_zero() {
        return Ok(());
    }

    let dest: usize = dest.try_into().map_err(|_| Trap::InvalidJump)?;
    if dest >= vm.bytecode.len() || !vm.jumpmap.is_jumpdest(dest) {
        return Err(Trap::InvalidJump);
    }

    vm.pc = dest;
    Ok(())
}

/// JUMPDEST - Mark a valid destination for jumps (no-op)
pub fn jumpdest(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpJumpDest);
    Ok(())
}

/// PC - Get the value of the program counter prior to the increment
pub fn pc(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpPc);
    let value = U256::from(vm.pc - 1);
    vm.stack.push(value)
}

/// GAS - Get the amount of available gas
pub fn gas(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpGas);
    let remaining = U256::from(vm.gas_remaining);
    vm.stack.push(remaining)
}

/// BEGINSUB - A subroutine entry reached by fall-through is invalid
pub fn beginsub(_vm: &mut VM) -> Result<(), Trap> {
    Err(Trap::InvalidBeginSub)
}

/// JUMPSUB - Jump into a subroutine, pushing the return program counter
pub fn jumpsub(vm: &mut VM) -> Result<(), Trap> {
    let dest = vm.stack.pop()?;
    vm.counters.record(Counter::OpJumpSub);

    let dest_offset: usize = dest.try_into().map_err(|_| Trap::InvalidJumpSub)?;
    if dest_offset >= vm.bytecode.len() || !vm.jumpmap.is_beginsub(dest_offset) {
        return Err(Trap::InvalidJumpSub);
    }

    vm.returnstack.push(U256::from(vm.pc))?;
    // resume past the BEGINSUB marker
    vm.pc = dest_offset + 1;
    Ok(())
}

/// RETURNSUB - Return from a subroutine, restoring the program counter
pub fn returnsub(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpReturnSub);
    let pc = vm.returnstack.pop()?;
    vm.pc = pc.try_into().map_err(|_| Trap::OutOfRange)?;
    Ok(())
}
