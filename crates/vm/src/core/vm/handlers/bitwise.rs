use std::ops::{Shl, Shr};

use alloy::primitives::{I256, U256};
use zkevm_common::utils::strings::sign_uint;

use crate::core::{counters::Counter, trap::Trap};

use super::super::core::VM;

/// AND - Bitwise AND operation
pub fn and(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpAnd);
    vm.stack.push(a & b)
}

/// OR - Bitwise OR operation
pub fn or(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpOr);
    vm.stack.push(a | b)
}

/// XOR - Bitwise XOR operation
pub fn xor(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpXor);
    vm.stack.push(a ^ b)
}

/// NOT - Bitwise NOT operation
pub fn not(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    vm.counters.record(Counter::OpNot);
    vm.stack.push(!a)
}

/// BYTE - Retrieve a single byte from a word, counting from the most
/// significant end
pub fn byte(vm: &mut VM) -> Result<(), Trap> {
    let position = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpByte);
    let result = if position >= U256::from(32u32) {
        U256::ZERO
    } else {
        value / (U256::from(256u32).pow(U256::from(31u32) - position)) % U256::from(256u32)
    };
    vm.stack.push(result)
}

/// SHL - Shift left operation; shifts of 256 or more yield zero
pub fn shl(vm: &mut VM) -> Result<(), Trap> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpShl);
    let result = if shift > U256::from(255u8) { U256::ZERO } else { value.shl(shift) };
    vm.stack.push(result)
}

/// SHR - Logical shift right operation; shifts of 256 or more yield zero
pub fn shr(vm: &mut VM) -> Result<(), Trap> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpShr);
    let result = if shift > U256::from(255u8) { U256::ZERO } else { value.shr(shift) };
    vm.stack.push(result)
}

/// SAR - Arithmetic shift right operation; shifts of 256 or more saturate to
/// the sign
pub fn sar(vm: &mut VM) -> Result<(), Trap> {
    let shift = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpSar);

    let signed = sign_uint(value);
    let result = if shift > U256::from(255u8) {
        if signed.is_negative() {
            I256::MINUS_ONE
        } else {
            I256::ZERO
        }
    } else {
        signed.asr(shift.to::<usize>())
    };
    vm.stack.push(result.into_raw())
}
