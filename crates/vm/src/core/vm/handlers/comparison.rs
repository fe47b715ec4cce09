use zkevm_common::utils::strings::sign_uint;

use crate::core::{counters::Counter, trap::Trap};

use super::super::core::VM;

/// LT - Less than comparison
pub fn lt(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpLt);
    vm.push_boolean(a.lt(&b))
}

/// GT - Greater than comparison
pub fn gt(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpGt);
    vm.push_boolean(a.gt(&b))
}

/// SLT - Signed less than comparison
pub fn slt(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpSlt);
    vm.push_boolean(sign_uint(a).lt(&sign_uint(b)))
}

/// SGT - Signed greater than comparison
pub fn sgt(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpSgt);
    vm.push_boolean(sign_uint(a).gt(&sign_uint(b)))
}

/// EQ - Equality comparison
pub fn eq(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpEq);
    vm.push_boolean(a.eq(&b))
}

/// ISZERO - Check if zero
pub fn iszero(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    vm.counters.record(Counter::OpIsZero);
    vm.push_boolean(a.is_zero())
}
