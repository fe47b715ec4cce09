use std::ops::{Div, Rem};

use alloy::primitives::{I256, U256};
use zkevm_common::utils::strings::sign_uint;

use crate::core::{counters::Counter, trap::Trap};

use super::super::core::VM;

/// ADD - Addition operation
pub fn add(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpAdd);
    vm.stack.push(a.overflowing_add(b).0)
}

/// MUL - Multiplication operation
pub fn mul(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpMul);
    vm.stack.push(a.overflowing_mul(b).0)
}

/// SUB - Subtraction operation
pub fn sub(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    vm.counters.record(Counter::OpSub);
    vm.stack.push(a.overflowing_sub(b).0)
}

/// DIV - Integer division operation; division by zero yields zero
pub fn div(vm: &mut VM) -> Result<(), Trap> {
    let numerator = vm.stack.pop()?;
    let denominator = vm.stack.pop()?;
    vm.counters.record(Counter::OpDiv);
    let result = if !denominator.is_zero() { numerator.div(denominator) } else { U256::ZERO };
    vm.stack.push(result)
}

/// SDIV - Signed integer division operation
pub fn sdiv(vm: &mut VM) -> Result<(), Trap> {
    let numerator = vm.stack.pop()?;
    let denominator = vm.stack.pop()?;
    vm.counters.record(Counter::OpSdiv);
    let result = if denominator.is_zero() {
        U256::ZERO
    } else {
        let n = sign_uint(numerator);
        let d = sign_uint(denominator);
        if n == I256::MIN && d == I256::MINUS_ONE {
            // the one overflowing case fixes to MIN under mod 2^256
            I256::MIN.into_raw()
        } else {
            (n / d).into_raw()
        }
    };
    vm.stack.push(result)
}

/// MOD - Modulo operation; modulus zero yields zero
pub fn modulo(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let modulus = vm.stack.pop()?;
    vm.counters.record(Counter::OpMod);
    let result = if !modulus.is_zero() { a.rem(modulus) } else { U256::ZERO };
    vm.stack.push(result)
}

/// SMOD - Signed modulo operation; the result keeps the dividend's sign
pub fn smod(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let modulus = vm.stack.pop()?;
    vm.counters.record(Counter::OpSmod);
    let result = if modulus.is_zero() {
        U256::ZERO
    } else {
        sign_uint(a).checked_rem(sign_uint(modulus)).unwrap_or(I256::ZERO).into_raw()
    };
    vm.stack.push(result)
}

/// ADDMOD - Addition modulo operation
pub fn addmod(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    let modulus = vm.stack.pop()?;
    vm.counters.record(Counter::OpAddMod);
    let result = if !modulus.is_zero() { a.add_mod(b, modulus) } else { U256::ZERO };
    vm.stack.push(result)
}

/// MULMOD - Multiplication modulo operation
pub fn mulmod(vm: &mut VM) -> Result<(), Trap> {
    let a = vm.stack.pop()?;
    let b = vm.stack.pop()?;
    let modulus = vm.stack.pop()?;
    vm.counters.record(Counter::OpMulMod);
    let result = if !modulus.is_zero() { a.mul_mod(b, modulus) } else { U256::ZERO };
    vm.stack.push(result)
}

/// EXP - Exponential operation
pub fn exp(vm: &mut VM) -> Result<(), Trap> {
    let base = vm.stack.pop()?;
    let exponent = vm.stack.pop()?;

    // the counter sees the exponent width even when the result is trivial
    let exponent_bytes = exponent.byte_len();
    vm.counters.record_exp(exponent_bytes);

    let result = if exponent.is_zero() {
        U256::from(1u8)
    } else if base.is_zero() {
        U256::ZERO
    } else {
        base.overflowing_pow(exponent).0
    };

    // consume dynamic gas
    let exp_byte = vm.spec.gas.exp_byte as u128;
    vm.consume_gas(exp_byte * exponent_bytes as u128, "exp")?;

    vm.stack.push(result)
}

/// SIGNEXTEND - Extend length of two's complement signed integer
pub fn signextend(vm: &mut VM) -> Result<(), Trap> {
    let k = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpSignExtend);

    // a byte index past the top of the word leaves it unchanged
    let result = if k >= U256::from(31u32) {
        value
    } else {
        let t = k * U256::from(8u32) + U256::from(7u32);
        let sign_bit = U256::from(1u32) << t;

        // (value & sign_bit - 1) - (value & sign_bit)
        (value & (sign_bit.overflowing_sub(U256::from(1u32)).0))
            .overflowing_sub(value & sign_bit)
            .0
    };

    vm.stack.push(result)
}
