use alloy::primitives::{B256, U256};

use crate::core::{counters::Counter, env::Environment, trap::Trap};

use super::super::core::VM;

/// SLOAD - Load word from storage
pub fn sload(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let key = vm.stack.pop()?;
    vm.counters.record(Counter::OpSload);

    // consume dynamic gas
    let key = B256::from(key);
    let gas_cost = vm.storage_access_cost(key);
    vm.consume_gas(gas_cost, "sload")?;

    // the state tree hands values back in shortest big-endian form; an
    // empty result reads as zero
    let raw = env.storage_load(key);
    let value = if raw.is_empty() { U256::ZERO } else { U256::from_be_slice(&raw) };
    vm.stack.push(value)
}

/// SSTORE - Save word to storage in shortest big-endian form
pub fn sstore(vm: &mut VM, env: &mut dyn Environment) -> Result<(), Trap> {
    let key = vm.stack.pop()?;
    let value = vm.stack.pop()?;
    vm.counters.record(Counter::OpSstore);

    // consume dynamic gas
    let key = B256::from(key);
    let current = env.storage_load(key);
    let base = if current.is_empty() && !value.is_zero() {
        vm.spec.gas.sstore_set as u128
    } else {
        vm.spec.gas.sstore_reset as u128
    };
    let gas_cost = base + vm.storage_access_cost(key);
    vm.consume_gas(gas_cost, "sstore")?;

    env.storage_store(key, to_shortest_be(value));
    Ok(())
}

/// Shortest big-endian encoding of a word: no leading zeros, and zero is the
/// empty byte string. The state tree hashes storage values in this form.
pub(crate) fn to_shortest_be(value: U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    bytes[32 - value.byte_len()..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_be_zero_is_empty() {
        assert_eq!(to_shortest_be(U256::ZERO), Vec::<u8>::new());
    }

    #[test]
    fn test_shortest_be_strips_leading_zeros() {
        assert_eq!(to_shortest_be(U256::from(1)), vec![0x01]);
        assert_eq!(to_shortest_be(U256::from(0x0100)), vec![0x01, 0x00]);
        assert_eq!(to_shortest_be(U256::from(0xffffff)), vec![0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_shortest_be_full_width() {
        assert_eq!(to_shortest_be(U256::MAX), vec![0xff; 32]);
    }
}
