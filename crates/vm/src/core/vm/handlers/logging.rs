use crate::core::{counters::Counter, env::Environment, log::Log, opcodes, trap::Trap};

use super::super::core::VM;

/// LOG0-LOG4 - Append a log record with N topics
pub fn log_n(vm: &mut VM, env: &mut dyn Environment, opcode: u8) -> Result<(), Trap> {
    let topic_count = (opcode - opcodes::LOG0) as usize;
    let offset = vm.stack.pop()?;
    let size = vm.stack.pop()?;
    let topics = vm.stack.pop_n(topic_count)?;

    let offset = VM::word_to_usize(offset)?;
    let size = VM::word_to_usize(size)?;
    vm.counters.record_input(Counter::OpLog, size);

    // consume dynamic gas
    let log_topic = vm.spec.gas.log_topic as u128;
    let log_data_byte = vm.spec.gas.log_data_byte as u128;
    let gas_cost = log_topic * topic_count as u128 +
        log_data_byte * size as u128 +
        vm.memory.expansion_cost(offset, size);
    vm.consume_gas(gas_cost, "log")?;
    vm.memory.extend(offset as u128, size as u128);

    let data = vm.memory.read(offset, size);
    env.log(Log::new(topics, &data));
    Ok(())
}
