use alloy::primitives::{Address, B256, U256};

use crate::core::{
    counters::Counter,
    env::{CallOutcome, Environment},
    trap::Trap,
};

use super::super::{core::VM, execution::HaltReason};

/// Settles a completed sub-call against the caller frame: charge the gas the
/// sub-frame consumed, write its output into memory (truncated to the out
/// region), expose the return buffer, and push the status word last.
fn finish_call(
    vm: &mut VM,
    outcome: CallOutcome,
    out_offset: usize,
    out_size: usize,
    forwarded: u128,
) -> Result<(), Trap> {
    vm.consume_gas(outcome.gas_used.min(forwarded), "message gas")?;

    let copied = out_size.min(outcome.returndata.len());
    if copied > 0 {
        vm.memory.store(out_offset, copied, &outcome.returndata[..copied]);
    }

    let return_code = outcome.return_code;
    vm.returndata = outcome.returndata;
    vm.stack.push(U256::from(return_code))
}

/// Settles a completed creation: charge the sub-frame's gas, push the new
/// address on success or zero on failure. Only a failed creation leaves its
/// payload in the return buffer.
fn finish_create(vm: &mut VM, outcome: CallOutcome, forwarded: u128) -> Result<(), Trap> {
    vm.consume_gas(outcome.gas_used.min(forwarded), "message gas")?;

    if outcome.success() {
        let address = if outcome.returndata.len() >= 20 {
            Address::from_slice(&outcome.returndata[outcome.returndata.len() - 20..])
        } else {
            Address::ZERO
        };
        vm.returndata.clear();
        vm.stack.push(VM::address_to_word(&address))
    } else {
        vm.returndata = outcome.returndata;
        vm.stack.push(U256::ZERO)
    }
}

/// CREATE - Create a new account with associated code
pub fn create(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let value = vm.stack.pop()?;
    let offset = VM::word_to_usize(vm.stack.pop()?)?;
    let size = VM::word_to_usize(vm.stack.pop()?)?;

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "create")?;
    vm.memory.extend(offset as u128, size as u128);

    let init_code = vm.memory.read(offset, size);
    vm.counters.record_contract_call(Counter::OpCreate, init_code.len());

    let forwarded = reserved.min(vm.gas_remaining);
    let outcome = env.create(forwarded, value, init_code);
    finish_create(vm, outcome, forwarded)
}

/// CREATE2 - Create a new account with associated code at a salt-derived
/// address
pub fn create2(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let value = vm.stack.pop()?;
    let offset = VM::word_to_usize(vm.stack.pop()?)?;
    let size = VM::word_to_usize(vm.stack.pop()?)?;
    let salt = B256::from(vm.stack.pop()?);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "create2")?;
    vm.memory.extend(offset as u128, size as u128);

    let init_code = vm.memory.read(offset, size);
    vm.counters.record_contract_call(Counter::OpCreate2, init_code.len());

    let forwarded = reserved.min(vm.gas_remaining);
    let outcome = env.create2(forwarded, value, init_code, salt);
    finish_create(vm, outcome, forwarded)
}

/// CALL - Message-call into an account
pub fn call(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let gas = vm.stack.pop()?;
    let to = VM::word_to_address(vm.stack.pop()?);
    let value = vm.stack.pop()?;
    let in_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let in_size = VM::word_to_usize(vm.stack.pop()?)?;
    let out_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let out_size = VM::word_to_usize(vm.stack.pop()?)?;

    // transferring value is a state change
    if vm.env.is_static && !value.is_zero() {
        return Err(Trap::StaticStateChange);
    }

    // consume dynamic gas
    let mut gas_cost = vm.account_access_cost(to);
    if !value.is_zero() {
        gas_cost += vm.spec.gas.call_value_transfer as u128;
    }
    gas_cost += vm.memory.expansion_cost(in_offset, in_size);
    vm.consume_gas(gas_cost, "call")?;
    vm.memory.extend(in_offset as u128, in_size as u128);
    let out_expansion = vm.memory.expansion_cost(out_offset, out_size);
    vm.consume_gas(out_expansion, "call")?;
    vm.memory.extend(out_offset as u128, out_size as u128);

    let bytecode_len = env.external_code_size(to);
    vm.counters.record_contract_call(Counter::OpCall, bytecode_len);

    let requested: u128 = gas.try_into().unwrap_or(u128::MAX);
    let forwarded = requested.min(reserved).min(vm.gas_remaining);
    let input = vm.memory.read(in_offset, in_size);
    let outcome = env.call(forwarded, to, value, input);
    finish_call(vm, outcome, out_offset, out_size, forwarded)
}

/// CALLCODE - Message-call into this account with an alternative account's
/// code, taking its own value
pub fn callcode(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let gas = vm.stack.pop()?;
    let to = VM::word_to_address(vm.stack.pop()?);
    let value = vm.stack.pop()?;
    let in_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let in_size = VM::word_to_usize(vm.stack.pop()?)?;
    let out_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let out_size = VM::word_to_usize(vm.stack.pop()?)?;

    // consume dynamic gas
    let mut gas_cost = vm.account_access_cost(to);
    if !value.is_zero() {
        gas_cost += vm.spec.gas.call_value_transfer as u128;
    }
    gas_cost += vm.memory.expansion_cost(in_offset, in_size);
    vm.consume_gas(gas_cost, "callcode")?;
    vm.memory.extend(in_offset as u128, in_size as u128);
    let out_expansion = vm.memory.expansion_cost(out_offset, out_size);
    vm.consume_gas(out_expansion, "callcode")?;
    vm.memory.extend(out_offset as u128, out_size as u128);

    let bytecode_len = env.external_code_size(to);
    vm.counters.record_contract_call(Counter::OpCallCode, bytecode_len);

    let requested: u128 = gas.try_into().unwrap_or(u128::MAX);
    let forwarded = requested.min(reserved).min(vm.gas_remaining);
    let input = vm.memory.read(in_offset, in_size);
    let outcome = env.call_code(forwarded, to, value, input);
    finish_call(vm, outcome, out_offset, out_size, forwarded)
}

/// DELEGATECALL - Message-call into this account with an alternative
/// account's code, preserving sender and value
pub fn delegatecall(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let gas = vm.stack.pop()?;
    let to = VM::word_to_address(vm.stack.pop()?);
    let in_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let in_size = VM::word_to_usize(vm.stack.pop()?)?;
    let out_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let out_size = VM::word_to_usize(vm.stack.pop()?)?;

    // consume dynamic gas
    let gas_cost = vm.account_access_cost(to) + vm.memory.expansion_cost(in_offset, in_size);
    vm.consume_gas(gas_cost, "delegatecall")?;
    vm.memory.extend(in_offset as u128, in_size as u128);
    let out_expansion = vm.memory.expansion_cost(out_offset, out_size);
    vm.consume_gas(out_expansion, "delegatecall")?;
    vm.memory.extend(out_offset as u128, out_size as u128);

    let bytecode_len = env.external_code_size(to);
    vm.counters.record_contract_call(Counter::OpDelegateCall, bytecode_len);

    let requested: u128 = gas.try_into().unwrap_or(u128::MAX);
    let forwarded = requested.min(reserved).min(vm.gas_remaining);
    let input = vm.memory.read(in_offset, in_size);
    let outcome = env.call_delegate(forwarded, to, input);
    finish_call(vm, outcome, out_offset, out_size, forwarded)
}

/// STATICCALL - Message-call into an account with zero value, entering a
/// static sub-context
pub fn staticcall(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let reserved = vm.take_message_gas()?;
    let gas = vm.stack.pop()?;
    let to = VM::word_to_address(vm.stack.pop()?);
    let in_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let in_size = VM::word_to_usize(vm.stack.pop()?)?;
    let out_offset = VM::word_to_usize(vm.stack.pop()?)?;
    let out_size = VM::word_to_usize(vm.stack.pop()?)?;

    // consume dynamic gas
    let gas_cost = vm.account_access_cost(to) + vm.memory.expansion_cost(in_offset, in_size);
    vm.consume_gas(gas_cost, "staticcall")?;
    vm.memory.extend(in_offset as u128, in_size as u128);
    let out_expansion = vm.memory.expansion_cost(out_offset, out_size);
    vm.consume_gas(out_expansion, "staticcall")?;
    vm.memory.extend(out_offset as u128, out_size as u128);

    let bytecode_len = env.external_code_size(to);
    vm.counters.record_contract_call(Counter::OpStaticCall, bytecode_len);

    let requested: u128 = gas.try_into().unwrap_or(u128::MAX);
    let forwarded = requested.min(reserved).min(vm.gas_remaining);
    let input = vm.memory.read(in_offset, in_size);
    let outcome = env.call_static(forwarded, to, input);
    finish_call(vm, outcome, out_offset, out_size, forwarded)
}

/// RETURN - Halt execution returning output data
pub fn op_return(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;
    let offset = VM::word_to_usize(offset)?;
    let size = VM::word_to_usize(size)?;
    vm.counters.record_termination(Counter::OpReturn, size);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "return")?;
    vm.memory.extend(offset as u128, size as u128);

    let data = vm.memory.read(offset, size);
    env.finish(data.clone());
    vm.exit(HaltReason::Return, data);
    Ok(())
}

/// REVERT - Halt execution reverting state changes, preserving output and
/// unused gas
pub fn revert(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;
    let offset = VM::word_to_usize(offset)?;
    let size = VM::word_to_usize(size)?;
    vm.counters.record_termination(Counter::OpRevert, size);

    // consume dynamic gas
    let gas_cost = vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "revert")?;
    vm.memory.extend(offset as u128, size as u128);

    let data = vm.memory.read(offset, size);
    env.revert(data.clone());
    vm.exit(HaltReason::Revert, data);
    Ok(())
}

/// SELFDESTRUCT - Queue the beneficiary transfer, mark the contract for
/// deletion at transaction end, and halt the frame
pub fn selfdestruct(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let beneficiary = VM::word_to_address(vm.stack.pop()?);
    vm.counters.record_termination(Counter::OpSelfDestruct, 0);

    // consume dynamic gas; only a cold beneficiary carries a surcharge
    if !vm.warm_addresses.contains(&beneficiary) {
        vm.warm_addresses.insert(beneficiary);
        let cold = vm.spec.gas.cold_account_access as u128;
        vm.consume_gas(cold, "selfdestruct")?;
    }

    env.self_destruct(beneficiary);
    vm.exit(HaltReason::SelfDestruct, Vec::new());
    Ok(())
}
