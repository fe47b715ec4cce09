use alloy::primitives::U256;

use crate::core::{codehash, counters::Counter, env::Environment, trap::Trap};

use super::super::core::VM;

/// ADDRESS - Get address of currently executing account
pub fn address(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpAddress);
    let word = VM::address_to_word(&vm.env.address);
    vm.stack.push(word)
}

/// BALANCE - Get balance of the given account
pub fn balance(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let address = VM::word_to_address(vm.stack.pop()?);
    vm.counters.record(Counter::OpBalance);

    // consume dynamic gas
    let gas_cost = vm.account_access_cost(address);
    vm.consume_gas(gas_cost, "balance")?;

    let balance = env.external_balance(address);
    vm.stack.push(balance)
}

/// ORIGIN - Get execution origination address
pub fn origin(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpOrigin);
    let word = VM::address_to_word(&vm.env.origin);
    vm.stack.push(word)
}

/// CALLER - Get caller address
pub fn caller(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpCaller);
    let word = VM::address_to_word(&vm.env.caller);
    vm.stack.push(word)
}

/// CALLVALUE - Get deposited value by the instruction/transaction responsible
/// for this execution
pub fn callvalue(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpCallValue);
    let value = vm.env.value;
    vm.stack.push(value)
}

/// CALLDATALOAD - Get a word of input data of the current environment
pub fn calldataload(vm: &mut VM) -> Result<(), Trap> {
    let i = vm.stack.pop()?;
    vm.counters.record(Counter::OpCallDataLoad);

    let i: usize = i.try_into().unwrap_or(usize::MAX);
    let calldata = &vm.env.calldata;
    let end = i.saturating_add(32).min(calldata.len());
    let mut value: Vec<u8> = if i < calldata.len() { calldata[i..end].to_vec() } else { Vec::new() };

    // a load at or past the end of call data takes the empty slice, one
    // explicit zero byte, and then the 32-byte right-pad
    if value.is_empty() {
        value.push(0);
    }
    value.resize(32, 0);

    vm.stack.push(U256::from_be_slice(&value))
}

/// CALLDATASIZE - Get size of input data in current environment
pub fn calldatasize(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpCallDataSize);
    let size = U256::from(vm.env.calldata.len());
    vm.stack.push(size)
}

/// CALLDATACOPY - Copy input data in current environment to memory
pub fn calldatacopy(vm: &mut VM) -> Result<(), Trap> {
    let dest_offset = vm.stack.pop()?;
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;

    let dest_offset = VM::word_to_usize(dest_offset)?;
    let offset: usize = offset.try_into().unwrap_or(usize::MAX);
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpCallDataCopy, size);

    let value = VM::safe_copy_data(&vm.env.calldata, offset, size);

    // consume dynamic gas
    let copy_word = vm.spec.gas.copy_word as u128;
    let minimum_word_size = size.div_ceil(32) as u128;
    let gas_cost = copy_word * minimum_word_size + vm.memory.expansion_cost(dest_offset, size);
    vm.consume_gas(gas_cost, "calldatacopy")?;

    vm.memory.store(dest_offset, size, &value);
    Ok(())
}

/// CODESIZE - Get size of code running in current environment
pub fn codesize(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpCodeSize);
    let size = U256::from(vm.bytecode.len());
    vm.stack.push(size)
}

/// CODECOPY - Copy code running in current environment to memory
pub fn codecopy(vm: &mut VM) -> Result<(), Trap> {
    let dest_offset = vm.stack.pop()?;
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;

    let dest_offset = VM::word_to_usize(dest_offset)?;
    let offset: usize = offset.try_into().unwrap_or(usize::MAX);
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpCodeCopy, size);

    let value = VM::safe_copy_data(&vm.bytecode, offset, size);

    // consume dynamic gas
    let copy_word = vm.spec.gas.copy_word as u128;
    let minimum_word_size = size.div_ceil(32) as u128;
    let gas_cost = copy_word * minimum_word_size + vm.memory.expansion_cost(dest_offset, size);
    vm.consume_gas(gas_cost, "codecopy")?;

    vm.memory.store(dest_offset, size, &value);
    Ok(())
}

/// GASPRICE - Get price of gas in current environment
pub fn gasprice(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpGasPrice);
    let price = vm.env.gas_price;
    vm.stack.push(price)
}

/// EXTCODESIZE - Get size of an account's code
pub fn extcodesize(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let address = VM::word_to_address(vm.stack.pop()?);
    vm.counters.record(Counter::OpExtCodeSize);

    // consume dynamic gas
    let gas_cost = vm.account_access_cost(address);
    vm.consume_gas(gas_cost, "extcodesize")?;

    let size = U256::from(env.external_code_size(address));
    vm.stack.push(size)
}

/// EXTCODECOPY - Copy an account's code to memory
pub fn extcodecopy(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let address = VM::word_to_address(vm.stack.pop()?);
    let dest_offset = vm.stack.pop()?;
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;

    let dest_offset = VM::word_to_usize(dest_offset)?;
    let offset: usize = offset.try_into().unwrap_or(usize::MAX);
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpExtCodeCopy, size);

    // consume dynamic gas
    let copy_word = vm.spec.gas.copy_word as u128;
    let minimum_word_size = size.div_ceil(32) as u128;
    let gas_cost = copy_word * minimum_word_size +
        vm.memory.expansion_cost(dest_offset, size) +
        vm.account_access_cost(address);
    vm.consume_gas(gas_cost, "extcodecopy")?;

    let code = env.external_code(address);
    let value = VM::safe_copy_data(&code, offset, size);
    vm.memory.store(dest_offset, size, &value);
    Ok(())
}

/// RETURNDATASIZE - Get size of output data from the previous call
pub fn returndatasize(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpReturnDataSize);
    let size = U256::from(vm.returndata.len());
    vm.stack.push(size)
}

/// RETURNDATACOPY - Copy output data from the previous call to memory.
/// Reading past the end of the return buffer is a hard trap, unlike the
/// zero-filling copies.
pub fn returndatacopy(vm: &mut VM) -> Result<(), Trap> {
    let dest_offset = vm.stack.pop()?;
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;

    let dest_offset = VM::word_to_usize(dest_offset)?;
    let offset = VM::word_to_usize(offset)?;
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpReturnDataCopy, size);

    if offset.saturating_add(size) > vm.returndata.len() {
        return Err(Trap::OutOfRange);
    }

    // consume dynamic gas
    let copy_word = vm.spec.gas.copy_word as u128;
    let minimum_word_size = size.div_ceil(32) as u128;
    let gas_cost = copy_word * minimum_word_size + vm.memory.expansion_cost(dest_offset, size);
    vm.consume_gas(gas_cost, "returndatacopy")?;

    let value = vm.returndata[offset..offset + size].to_vec();
    vm.memory.store(dest_offset, size, &value);
    Ok(())
}

/// EXTCODEHASH - Get the code hash of an account: zero for empty code,
/// otherwise the linear Poseidon hash the state tree commits to
pub fn extcodehash(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let address = VM::word_to_address(vm.stack.pop()?);
    vm.counters.record(Counter::OpExtCodeHash);

    // consume dynamic gas
    let gas_cost = vm.account_access_cost(address);
    vm.consume_gas(gas_cost, "extcodehash")?;

    let code = env.external_code(address);
    let hash = if code.is_empty() {
        U256::ZERO
    } else {
        U256::from_be_bytes(codehash::hash_bytecode(&code).0)
    };
    vm.stack.push(hash)
}

/// BLOCKHASH - Get the hash of a previous batch
pub fn blockhash(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let number = vm.stack.pop()?;
    vm.counters.record(Counter::OpBlockHash);

    let hash = match u64::try_from(number) {
        Ok(number) => U256::from_be_bytes(env.batch_hash(number).0),
        Err(_) => U256::ZERO,
    };
    vm.stack.push(hash)
}
