use alloy::primitives::U256;

use crate::core::{counters::Counter, env::Environment, trap::Trap};

use super::super::core::VM;

/// COINBASE - Get the block's beneficiary address
pub fn coinbase(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpCoinbase);
    let word = VM::address_to_word(&env.block_coinbase());
    vm.stack.push(word)
}

/// TIMESTAMP - Get the block's timestamp
pub fn timestamp(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpTimestamp);
    let timestamp = U256::from(env.block_timestamp());
    vm.stack.push(timestamp)
}

/// NUMBER - Get the current block number
pub fn number(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpNumber);
    let number = U256::from(env.block_number());
    vm.stack.push(number)
}

/// DIFFICULTY - Get the block's difficulty
pub fn difficulty(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpDifficulty);
    let difficulty = env.block_difficulty();
    vm.stack.push(difficulty)
}

/// GASLIMIT - Get the block's gas limit
pub fn gaslimit(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpGasLimit);
    let limit = U256::from(env.block_gas_limit());
    vm.stack.push(limit)
}

/// CHAINID - Get the chain identifier
pub fn chainid(vm: &mut VM) -> Result<(), Trap> {
    vm.counters.record(Counter::OpChainId);
    let chain_id = U256::from(vm.spec.chain_id);
    vm.stack.push(chain_id)
}

/// SELFBALANCE - Get the balance of the executing contract
pub fn selfbalance(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpSelfBalance);
    let balance = env.self_balance();
    vm.stack.push(balance)
}

/// BASEFEE - Get the block's base fee
pub fn basefee(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    vm.counters.record(Counter::OpBaseFee);
    let base_fee = env.block_base_fee();
    vm.stack.push(base_fee)
}
