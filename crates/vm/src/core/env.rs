//! The environment interface: everything a call frame needs from the world
//! outside it.

use alloy::primitives::{Address, B256, U256};

use super::log::Log;

/// Outcome of a sub-call or contract creation run by the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutcome {
    /// 1 on success, 0 on failure. A trap inside the sub-frame surfaces here
    /// as 0, never as a trap in the caller.
    pub return_code: u32,
    /// The callee's output. For creations: the new address on success, the
    /// revert payload on failure.
    pub returndata: Vec<u8>,
    /// Gas the sub-frame consumed, settled against the caller's forwarded
    /// allowance.
    pub gas_used: u128,
}

impl CallOutcome {
    /// Whether the sub-frame completed successfully.
    pub fn success(&self) -> bool {
        self.return_code == 1
    }
}

/// World-state and block-context collaborator behind a call frame.
///
/// Calls into this trait are the interpreter's only suspension points. The
/// implementation may journal, cache, or recurse into nested frames, but it
/// must appear linearizable within a transaction and must never touch the
/// calling frame's stack or memory.
pub trait Environment {
    /// Beneficiary address of the current block.
    fn block_coinbase(&self) -> Address;

    /// Timestamp of the current block.
    fn block_timestamp(&self) -> u64;

    /// Difficulty of the current block.
    fn block_difficulty(&self) -> U256;

    /// Gas limit of the current block.
    fn block_gas_limit(&self) -> u64;

    /// Base fee of the current block.
    fn block_base_fee(&self) -> U256;

    /// Current block number. May hit the state collaborator.
    fn block_number(&mut self) -> u64;

    /// Hash of a sealed batch; zero when outside the visible window.
    fn batch_hash(&mut self, number: u64) -> B256;

    /// Balance of the executing contract.
    fn self_balance(&mut self) -> U256;

    /// Balance of an arbitrary account.
    fn external_balance(&mut self, address: Address) -> U256;

    /// Bytecode of an arbitrary account; empty for non-contract accounts.
    fn external_code(&mut self, address: Address) -> Vec<u8>;

    /// Bytecode length of an arbitrary account.
    fn external_code_size(&mut self, address: Address) -> usize;

    /// Reads a storage slot. Values travel in shortest big-endian form: the
    /// result has no leading zeros, is at most 32 bytes, and an empty result
    /// reads as zero.
    fn storage_load(&mut self, key: B256) -> Vec<u8>;

    /// Writes a storage slot. `value` is in shortest big-endian form; zero
    /// is the empty byte string.
    fn storage_store(&mut self, key: B256, value: Vec<u8>);

    /// Appends a log record to the transaction receipt.
    fn log(&mut self, log: Log);

    /// Accepts the frame's success output (STOP, RETURN).
    fn finish(&mut self, data: Vec<u8>);

    /// Accepts the frame's failure output (REVERT).
    fn revert(&mut self, data: Vec<u8>);

    /// Queues the beneficiary balance transfer and marks the executing
    /// contract for deletion at transaction end.
    fn self_destruct(&mut self, beneficiary: Address);

    /// Runs constructor code in a fresh sub-frame.
    fn create(&mut self, gas: u128, value: U256, init_code: Vec<u8>) -> CallOutcome;

    /// Runs constructor code at a salt-derived address.
    fn create2(&mut self, gas: u128, value: U256, init_code: Vec<u8>, salt: B256) -> CallOutcome;

    /// Message-call into an account.
    fn call(&mut self, gas: u128, to: Address, value: U256, data: Vec<u8>) -> CallOutcome;

    /// Message-call running the callee's code against the caller's state.
    fn call_code(&mut self, gas: u128, to: Address, value: U256, data: Vec<u8>) -> CallOutcome;

    /// Message-call preserving the caller's sender, value, and address.
    fn call_delegate(&mut self, gas: u128, to: Address, data: Vec<u8>) -> CallOutcome;

    /// Message-call in a static sub-context with zero value.
    fn call_static(&mut self, gas: u128, to: Address, data: Vec<u8>) -> CallOutcome;
}
